//! Goal templates.

use serde::{Deserialize, Serialize};

use super::ChannelId;
use crate::error::RulesError;

/// What kind of world event a goal counts, and how it matches a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GoalKind {
    /// Counts kills of one named enemy. The payload is the enemy name.
    Kill { enemy: String },

    /// Counts pickups of one named item. The payload is `item` or `item:amount`.
    Collect { item: String },
}

/// Authored definition of a single trackable objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalTemplate {
    /// Display name shown by the presentation layer.
    #[serde(default)]
    pub name: String,

    /// How much progress is needed to complete the goal.
    pub target: u32,

    /// Channel the goal listens on while active.
    /// A goal without a channel can never be activated.
    #[serde(default)]
    pub channel: Option<ChannelId>,

    pub kind: GoalKind,
}

impl GoalTemplate {
    /// Create a goal template with the given target and behavior, bound to no channel.
    pub fn new(kind: GoalKind, target: u32) -> Self {
        Self {
            name: String::new(),
            target,
            channel: None,
            kind,
        }
    }

    /// Shorthand for a kill goal.
    pub fn kill(enemy: impl Into<String>, target: u32) -> Self {
        Self::new(
            GoalKind::Kill {
                enemy: enemy.into(),
            },
            target,
        )
    }

    /// Shorthand for a collect goal.
    pub fn collect(item: impl Into<String>, target: u32) -> Self {
        Self::new(GoalKind::Collect { item: item.into() }, target)
    }

    /// Bind the goal to a channel.
    pub fn on_channel(mut self, channel: ChannelId) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Check the template can produce a working goal.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.target == 0 {
            return Err(RulesError::invalid_goal(
                &self.name,
                "target must be at least 1",
            ));
        }
        Ok(())
    }
}
