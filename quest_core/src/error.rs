//! Runtime errors.

use quest_rules::{BlockType, RulesError, Theme};
use thiserror::Error;

use crate::goals::{GoalId, GoalState};
use crate::story_block::StoryBlockId;

#[derive(Debug, Error)]
pub enum QuestError {
    /// The goal's template names no event channel, so it can never be activated.
    #[error("goal {goal} ('{name}') has no event channel configured")]
    MissingChannel { goal: GoalId, name: String },

    /// Goals only move Inactive -> Active -> Complete/Failed.
    #[error("goal {goal} cannot be activated from state {from:?}")]
    InvalidTransition { goal: GoalId, from: GoalState },

    /// No template in the pool fits the requested world state.
    #[error("no {block_type} story block available for theme {theme}")]
    NoCandidates { theme: Theme, block_type: BlockType },

    #[error("story block not found: {0}")]
    UnknownBlock(StoryBlockId),

    #[error(transparent)]
    Rules(#[from] RulesError),
}
