//! Event channels - named broadcast buses that route world notifications to
//! the goals currently listening for them.
//!
//! A channel only stores [`GoalRef`] handles. Goals live inside their story
//! blocks, so delivery goes through an [`EventTarget`] that can resolve a
//! handle back to the goal.

mod registry;

pub use registry::*;

use quest_rules::ChannelId;

use crate::events::QuestSignal;
use crate::goals::{GoalRef, GoalUpdate};

/// The set of goals subscribed to one channel, in subscription order.
#[derive(Debug, Clone)]
pub struct EventChannel {
    id: ChannelId,
    subscribers: Vec<GoalRef>,
    /// Run in which the subscriber set was last reset.
    reset_run: Option<u64>,
}

impl EventChannel {
    pub fn new(id: ChannelId) -> Self {
        Self {
            id,
            subscribers: Vec::new(),
            reset_run: None,
        }
    }

    pub fn id(&self) -> &ChannelId {
        &self.id
    }

    /// Drop every subscriber.
    pub fn reset(&mut self) {
        self.subscribers.clear();
    }

    /// Reset once per run. Returns `true` if this call did the reset.
    pub fn reset_for_run(&mut self, run: u64) -> bool {
        if self.reset_run == Some(run) {
            return false;
        }
        self.reset();
        self.reset_run = Some(run);
        true
    }

    /// Add a subscriber. No-op if it is already present.
    pub fn subscribe(&mut self, goal: GoalRef) -> bool {
        if self.is_subscribed(goal) {
            return false;
        }
        self.subscribers.push(goal);
        true
    }

    /// Remove a subscriber. No-op if it is absent.
    pub fn unsubscribe(&mut self, goal: GoalRef) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| *s != goal);
        self.subscribers.len() != before
    }

    pub fn is_subscribed(&self, goal: GoalRef) -> bool {
        self.subscribers.contains(&goal)
    }

    /// Subscribers in insertion order.
    pub fn subscribers(&self) -> &[GoalRef] {
        &self.subscribers
    }

    /// Snapshot of the subscribers in delivery order (newest first).
    pub fn delivery_order(&self) -> Vec<GoalRef> {
        self.subscribers.iter().rev().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

/// Something that owns goals and can hand them a broadcast payload.
pub trait EventTarget {
    fn deliver(
        &mut self,
        goal: GoalRef,
        payload: &str,
        channels: &mut ChannelRegistry,
        outbox: &mut Vec<QuestSignal>,
    ) -> GoalUpdate;
}
