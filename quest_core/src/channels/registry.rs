//! Process-wide registry of event channels, keyed by channel name.

use std::collections::HashMap;

use quest_rules::ChannelId;
use tracing::trace;

use super::{EventChannel, EventTarget};
use crate::events::QuestSignal;
use crate::goals::GoalRef;

/// Every channel known to a session, plus the current run epoch.
///
/// Channels are created on first use. Subscribers belong to a single run;
/// [`ChannelRegistry::begin_run`] starts a new one so that stale entries from
/// an earlier run are dropped the first time each channel is reset in it.
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    channels: HashMap<ChannelId, EventChannel>,
    run: u64,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run and return its epoch.
    pub fn begin_run(&mut self) -> u64 {
        self.run += 1;
        self.run
    }

    pub fn run(&self) -> u64 {
        self.run
    }

    pub fn channel(&self, id: &ChannelId) -> Option<&EventChannel> {
        self.channels.get(id)
    }

    /// Get a channel, creating it if needed.
    pub fn channel_mut(&mut self, id: &ChannelId) -> &mut EventChannel {
        self.channels
            .entry(id.clone())
            .or_insert_with(|| EventChannel::new(id.clone()))
    }

    /// Reset a channel unless it was already reset during the current run.
    pub fn reset_for_run(&mut self, id: &ChannelId) -> bool {
        let run = self.run;
        self.channel_mut(id).reset_for_run(run)
    }

    /// Drop every subscriber on every channel.
    pub fn reset_all(&mut self) {
        for channel in self.channels.values_mut() {
            channel.reset();
        }
    }

    pub fn subscribe(&mut self, id: &ChannelId, goal: GoalRef) -> bool {
        self.channel_mut(id).subscribe(goal)
    }

    pub fn unsubscribe(&mut self, id: &ChannelId, goal: GoalRef) -> bool {
        match self.channels.get_mut(id) {
            Some(channel) => channel.unsubscribe(goal),
            None => false,
        }
    }

    pub fn is_subscribed(&self, id: &ChannelId, goal: GoalRef) -> bool {
        self.channels
            .get(id)
            .map(|channel| channel.is_subscribed(goal))
            .unwrap_or(false)
    }

    /// Total number of subscriptions across all channels.
    pub fn subscription_count(&self) -> usize {
        self.channels.values().map(EventChannel::len).sum()
    }

    /// Deliver a payload to every goal subscribed to `id`.
    ///
    /// Delivery walks a snapshot taken before the first goal is notified,
    /// newest subscriber first. Goals that unsubscribe before their turn are
    /// skipped; goals that subscribe during delivery wait for the next
    /// broadcast. Returns how many goals received the payload.
    pub fn broadcast<T>(
        &mut self,
        id: &ChannelId,
        payload: &str,
        target: &mut T,
        outbox: &mut Vec<QuestSignal>,
    ) -> usize
    where
        T: EventTarget + ?Sized,
    {
        let order = match self.channels.get(id) {
            Some(channel) => channel.delivery_order(),
            None => return 0,
        };

        let mut delivered = 0;
        for goal in order {
            if !self.is_subscribed(id, goal) {
                continue;
            }
            target.deliver(goal, payload, self, outbox);
            delivered += 1;
        }

        trace!(channel = %id, payload, delivered, "broadcast");
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::{GoalId, GoalUpdate};
    use crate::story_block::StoryBlockId;

    /// Records deliveries and unsubscribes the goals listed in `drop_on_delivery`.
    #[derive(Default)]
    struct Recorder {
        channel: Option<ChannelId>,
        received: Vec<GoalRef>,
        drop_on_delivery: Vec<(GoalRef, GoalRef)>,
        late: Option<GoalRef>,
    }

    impl EventTarget for Recorder {
        fn deliver(
            &mut self,
            goal: GoalRef,
            _payload: &str,
            channels: &mut ChannelRegistry,
            _outbox: &mut Vec<QuestSignal>,
        ) -> GoalUpdate {
            self.received.push(goal);
            if let Some(channel) = self.channel.clone() {
                for (trigger, victim) in &self.drop_on_delivery {
                    if *trigger == goal {
                        channels.unsubscribe(&channel, *victim);
                    }
                }
                if let Some(late) = self.late.take() {
                    channels.subscribe(&channel, late);
                }
            }
            GoalUpdate::Ignored
        }
    }

    fn goal_ref() -> GoalRef {
        GoalRef::new(StoryBlockId::new(), GoalId::new())
    }

    #[test]
    fn test_broadcast_unknown_channel() {
        let mut registry = ChannelRegistry::new();
        let mut recorder = Recorder::default();
        let mut outbox = Vec::new();

        let delivered =
            registry.broadcast(&ChannelId::new("nowhere"), "x", &mut recorder, &mut outbox);

        assert_eq!(delivered, 0);
        assert!(recorder.received.is_empty());
    }

    #[test]
    fn test_broadcast_reverse_order() {
        let mut registry = ChannelRegistry::new();
        let kills = ChannelId::new("kills");
        let a = goal_ref();
        let b = goal_ref();
        registry.subscribe(&kills, a);
        registry.subscribe(&kills, b);

        let mut recorder = Recorder::default();
        let mut outbox = Vec::new();
        registry.broadcast(&kills, "Wolf", &mut recorder, &mut outbox);

        assert_eq!(recorder.received, vec![b, a]);
    }

    #[test]
    fn test_unsubscribed_during_delivery_is_skipped() {
        let mut registry = ChannelRegistry::new();
        let kills = ChannelId::new("kills");
        let a = goal_ref();
        let b = goal_ref();
        let c = goal_ref();
        registry.subscribe(&kills, a);
        registry.subscribe(&kills, b);
        registry.subscribe(&kills, c);

        // c is delivered first and knocks a out before its turn.
        let mut recorder = Recorder {
            channel: Some(kills.clone()),
            drop_on_delivery: vec![(c, a)],
            ..Default::default()
        };
        let mut outbox = Vec::new();
        let delivered = registry.broadcast(&kills, "Wolf", &mut recorder, &mut outbox);

        assert_eq!(delivered, 2);
        assert_eq!(recorder.received, vec![c, b]);
    }

    #[test]
    fn test_subscribed_during_delivery_waits() {
        let mut registry = ChannelRegistry::new();
        let kills = ChannelId::new("kills");
        let a = goal_ref();
        let late = goal_ref();
        registry.subscribe(&kills, a);

        let mut recorder = Recorder {
            channel: Some(kills.clone()),
            late: Some(late),
            ..Default::default()
        };
        let mut outbox = Vec::new();
        registry.broadcast(&kills, "Wolf", &mut recorder, &mut outbox);

        assert_eq!(recorder.received, vec![a]);
        assert!(registry.is_subscribed(&kills, late));
    }

    #[test]
    fn test_run_scoped_reset() {
        let mut registry = ChannelRegistry::new();
        let kills = ChannelId::new("kills");
        registry.subscribe(&kills, goal_ref());

        registry.begin_run();
        assert!(registry.reset_for_run(&kills));
        assert_eq!(registry.subscription_count(), 0);

        registry.subscribe(&kills, goal_ref());
        assert!(!registry.reset_for_run(&kills));
        assert_eq!(registry.subscription_count(), 1);
    }

    #[test]
    fn test_reset_all() {
        let mut registry = ChannelRegistry::new();
        registry.subscribe(&ChannelId::new("kills"), goal_ref());
        registry.subscribe(&ChannelId::new("items"), goal_ref());

        registry.reset_all();

        assert_eq!(registry.subscription_count(), 0);
    }
}
