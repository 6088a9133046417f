//! Goal instances - single trackable objectives with a numeric target.
//!
//! A goal moves through `Inactive -> Active -> Complete`, or is forced from
//! `Active` to `Failed` when its story block fails. While active it is
//! subscribed to its event channel; every terminal transition unsubscribes it.

mod behavior;

pub use behavior::*;

use quest_rules::{ChannelId, GoalTemplate};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use crate::channels::ChannelRegistry;
use crate::error::QuestError;
use crate::events::QuestSignal;
use crate::story_block::StoryBlockId;

/// Unique identifier for a goal instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalId(pub Uuid);

impl GoalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GoalId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GoalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle a channel keeps for each subscriber: which goal in which block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalRef {
    pub block: StoryBlockId,
    pub goal: GoalId,
}

impl GoalRef {
    pub fn new(block: StoryBlockId, goal: GoalId) -> Self {
        Self { block, goal }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GoalState {
    #[default]
    Inactive,
    Active,
    Complete,
    Failed,
}

impl GoalState {
    /// Complete and Failed are final; a goal never leaves them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GoalState::Complete | GoalState::Failed)
    }
}

/// What a delivered payload did to a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalUpdate {
    /// Not active, not a match, or not delivered at all.
    Ignored,
    /// Progress recorded, target not reached yet.
    Progressed,
    /// Target reached on this payload.
    Completed,
}

/// A runtime goal, owned by exactly one story block.
#[derive(Debug)]
pub struct Goal {
    id: GoalId,
    name: String,
    target: u32,
    current: u32,
    channel: Option<ChannelId>,
    state: GoalState,
    /// Back-reference to the owning story block, set on activation.
    owner: Option<StoryBlockId>,
    behavior: Box<dyn GoalBehavior>,
}

impl Goal {
    /// Derive a fresh instance from a template, using the template's behavior.
    pub fn from_template(template: &GoalTemplate) -> Self {
        Self::with_behavior(template, behavior_for(&template.kind))
    }

    /// Derive a fresh instance with a custom behavior.
    pub fn with_behavior(template: &GoalTemplate, behavior: Box<dyn GoalBehavior>) -> Self {
        Self {
            id: GoalId::new(),
            name: template.name.clone(),
            target: template.target,
            current: 0,
            channel: template.channel.clone(),
            state: GoalState::Inactive,
            owner: None,
            behavior,
        }
    }

    pub fn id(&self) -> GoalId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn state(&self) -> GoalState {
        self.state
    }

    pub fn channel(&self) -> Option<&ChannelId> {
        self.channel.as_ref()
    }

    pub fn owner(&self) -> Option<StoryBlockId> {
        self.owner
    }

    pub fn describe(&self) -> String {
        self.behavior.describe()
    }

    /// Handle this goal is registered under, once it has an owner.
    pub fn goal_ref(&self) -> Option<GoalRef> {
        self.owner.map(|block| GoalRef::new(block, self.id))
    }

    /// Reset the goal's channel for the current run.
    ///
    /// Only the first reset of a channel in a run clears it, so goals
    /// activated earlier in the same run stay subscribed.
    pub fn init(&self, channels: &mut ChannelRegistry) {
        if let Some(channel) = &self.channel {
            if channels.reset_for_run(channel) {
                debug!(channel = %channel, "channel reset for new run");
            }
        }
    }

    /// Start listening. Only valid from `Inactive`.
    ///
    /// A goal without a channel is a configuration error: it is logged,
    /// reported, and the goal stays inactive.
    pub fn activate(
        &mut self,
        owner: StoryBlockId,
        channels: &mut ChannelRegistry,
    ) -> Result<(), QuestError> {
        if self.state != GoalState::Inactive {
            return Err(QuestError::InvalidTransition {
                goal: self.id,
                from: self.state,
            });
        }

        let Some(channel) = &self.channel else {
            error!(
                goal = %self.id,
                name = %self.name,
                "no event channel configured, goal cannot be activated"
            );
            return Err(QuestError::MissingChannel {
                goal: self.id,
                name: self.name.clone(),
            });
        };

        self.state = GoalState::Active;
        self.owner = Some(owner);
        channels.subscribe(channel, GoalRef::new(owner, self.id));

        debug!(goal = %self.id, block = %owner, channel = %channel, "goal activated");
        Ok(())
    }

    /// React to a payload broadcast on this goal's channel.
    ///
    /// Inactive and terminal goals ignore everything. On a match the progress
    /// is applied and completion is checked straight away.
    pub fn handle_event(
        &mut self,
        payload: &str,
        channels: &mut ChannelRegistry,
        outbox: &mut Vec<QuestSignal>,
    ) -> GoalUpdate {
        if self.state != GoalState::Active {
            return GoalUpdate::Ignored;
        }
        let Some(block) = self.owner else {
            return GoalUpdate::Ignored;
        };

        let delta = self.behavior.evaluate(payload);
        if delta == 0 {
            return GoalUpdate::Ignored;
        }

        outbox.push(QuestSignal::GoalResponded {
            block,
            goal: self.id,
            payload: payload.to_string(),
        });

        self.current = self.current.saturating_add(delta);
        outbox.push(QuestSignal::GoalProgressed {
            block,
            goal: self.id,
            current: self.current,
            target: self.target,
        });

        if self.check_completion(channels) {
            outbox.push(QuestSignal::GoalCompleted {
                block,
                goal: self.id,
            });
            GoalUpdate::Completed
        } else {
            GoalUpdate::Progressed
        }
    }

    /// Move to `Complete` once progress reaches the target.
    ///
    /// Unsubscribes on the transition. Returns `true` only on the call that
    /// completes the goal. Only reached through `handle_event`, whose
    /// `Completed` result the owning block turns into `success`.
    fn check_completion(&mut self, channels: &mut ChannelRegistry) -> bool {
        if self.state != GoalState::Active || self.current < self.target {
            return false;
        }

        self.state = GoalState::Complete;
        self.unsubscribe(channels);
        debug!(goal = %self.id, progress = self.current, "goal complete");
        true
    }

    /// Force an active goal to `Failed`. Used when the owning block fails.
    pub(crate) fn fail(&mut self, channels: &mut ChannelRegistry) -> bool {
        if self.state != GoalState::Active {
            return false;
        }

        self.state = GoalState::Failed;
        self.unsubscribe(channels);
        debug!(goal = %self.id, "goal failed");
        true
    }

    /// Drop the subscription of a goal that is about to be destroyed.
    pub(crate) fn detach(&mut self, channels: &mut ChannelRegistry) {
        if self.state == GoalState::Active {
            self.unsubscribe(channels);
        }
    }

    fn unsubscribe(&self, channels: &mut ChannelRegistry) {
        if let (Some(channel), Some(goal_ref)) = (&self.channel, self.goal_ref()) {
            channels.unsubscribe(channel, goal_ref);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kills() -> ChannelId {
        ChannelId::new("enemy_killed")
    }

    fn bandit_goal(target: u32) -> Goal {
        Goal::from_template(&GoalTemplate::kill("Bandit", target).on_channel(kills()))
    }

    fn is_subscribed(goal: &Goal, channels: &ChannelRegistry) -> bool {
        match (goal.channel(), goal.goal_ref()) {
            (Some(channel), Some(goal_ref)) => channels.is_subscribed(channel, goal_ref),
            _ => false,
        }
    }

    #[test]
    fn test_new_goal_is_inactive() {
        let goal = bandit_goal(3);
        assert_eq!(goal.state(), GoalState::Inactive);
        assert_eq!(goal.current(), 0);
        assert_eq!(goal.target(), 3);
        assert!(goal.owner().is_none());
    }

    #[test]
    fn test_activate_subscribes() {
        let mut channels = ChannelRegistry::new();
        let mut goal = bandit_goal(3);
        let owner = StoryBlockId::new();

        goal.activate(owner, &mut channels).unwrap();

        assert_eq!(goal.state(), GoalState::Active);
        assert_eq!(goal.owner(), Some(owner));
        assert!(is_subscribed(&goal, &channels));
    }

    #[test]
    fn test_activate_twice_is_rejected() {
        let mut channels = ChannelRegistry::new();
        let mut goal = bandit_goal(3);
        let owner = StoryBlockId::new();
        goal.activate(owner, &mut channels).unwrap();

        let err = goal.activate(owner, &mut channels).unwrap_err();
        assert!(matches!(
            err,
            QuestError::InvalidTransition {
                from: GoalState::Active,
                ..
            }
        ));
        assert_eq!(channels.subscription_count(), 1);
    }

    #[test]
    fn test_missing_channel_leaves_goal_inactive() {
        let mut channels = ChannelRegistry::new();
        let mut goal = Goal::from_template(&GoalTemplate::kill("Bandit", 1));

        let err = goal.activate(StoryBlockId::new(), &mut channels).unwrap_err();

        assert!(matches!(err, QuestError::MissingChannel { .. }));
        assert_eq!(goal.state(), GoalState::Inactive);
        assert_eq!(channels.subscription_count(), 0);
    }

    #[test]
    fn test_inactive_goal_ignores_events() {
        let mut channels = ChannelRegistry::new();
        let mut outbox = Vec::new();
        let mut goal = bandit_goal(1);

        let update = goal.handle_event("Bandit", &mut channels, &mut outbox);

        assert_eq!(update, GoalUpdate::Ignored);
        assert_eq!(goal.current(), 0);
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_progress_then_complete() {
        let mut channels = ChannelRegistry::new();
        let mut outbox = Vec::new();
        let mut goal = bandit_goal(2);
        goal.activate(StoryBlockId::new(), &mut channels).unwrap();

        assert_eq!(
            goal.handle_event("Wolf", &mut channels, &mut outbox),
            GoalUpdate::Ignored
        );
        assert_eq!(
            goal.handle_event("Bandit", &mut channels, &mut outbox),
            GoalUpdate::Progressed
        );
        assert_eq!(goal.current(), 1);
        assert!(is_subscribed(&goal, &channels));

        assert_eq!(
            goal.handle_event("Bandit", &mut channels, &mut outbox),
            GoalUpdate::Completed
        );
        assert_eq!(goal.state(), GoalState::Complete);
        assert!(!is_subscribed(&goal, &channels));

        // Terminal: no more progress, no more signals.
        let signals_before = outbox.len();
        assert_eq!(
            goal.handle_event("Bandit", &mut channels, &mut outbox),
            GoalUpdate::Ignored
        );
        assert_eq!(goal.current(), 2);
        assert_eq!(outbox.len(), signals_before);

        let completions = outbox
            .iter()
            .filter(|s| matches!(s, QuestSignal::GoalCompleted { .. }))
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_response_signal_carries_payload() {
        let mut channels = ChannelRegistry::new();
        let mut outbox = Vec::new();
        let mut goal = bandit_goal(5);
        let owner = StoryBlockId::new();
        goal.activate(owner, &mut channels).unwrap();

        goal.handle_event("Bandit", &mut channels, &mut outbox);

        assert_eq!(
            outbox[0],
            QuestSignal::GoalResponded {
                block: owner,
                goal: goal.id(),
                payload: "Bandit".to_string(),
            }
        );
    }

    #[test]
    fn test_completed_goal_cannot_reactivate() {
        let mut channels = ChannelRegistry::new();
        let mut outbox = Vec::new();
        let mut goal = bandit_goal(1);
        let owner = StoryBlockId::new();
        goal.activate(owner, &mut channels).unwrap();
        goal.handle_event("Bandit", &mut channels, &mut outbox);

        assert!(goal.activate(owner, &mut channels).is_err());
        assert_eq!(goal.state(), GoalState::Complete);
        assert!(!is_subscribed(&goal, &channels));
    }

    #[test]
    fn test_fail_unsubscribes() {
        let mut channels = ChannelRegistry::new();
        let mut goal = bandit_goal(3);
        goal.activate(StoryBlockId::new(), &mut channels).unwrap();

        assert!(goal.fail(&mut channels));
        assert_eq!(goal.state(), GoalState::Failed);
        assert!(!is_subscribed(&goal, &channels));
        assert!(!goal.fail(&mut channels));
    }

    #[test]
    fn test_init_resets_channel_once_per_run() {
        let mut channels = ChannelRegistry::new();
        let stale = GoalRef::new(StoryBlockId::new(), GoalId::new());
        channels.subscribe(&kills(), stale);
        channels.begin_run();

        let first = bandit_goal(1);
        first.init(&mut channels);
        assert!(!channels.is_subscribed(&kills(), stale));

        let mut active = bandit_goal(1);
        active.activate(StoryBlockId::new(), &mut channels).unwrap();

        let second = bandit_goal(1);
        second.init(&mut channels);
        assert!(is_subscribed(&active, &channels));
    }
}
