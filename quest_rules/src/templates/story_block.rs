//! Story block templates.

use serde::{Deserialize, Serialize};

use super::{GoalTemplate, TemplateId};
use crate::error::RulesError;
use crate::mechanics::{BlockType, Theme};

/// Authored definition of one narrative unit: a success sequence, a failure
/// sequence and the metadata used to select it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryBlockTemplate {
    pub id: TemplateId,

    #[serde(default)]
    pub title: String,

    pub block_type: BlockType,

    /// Themes this block belongs to. Order matters: the first entry is the
    /// block's primary theme.
    pub themes: Vec<Theme>,

    /// Goals completed in order to finish the block.
    pub success_goals: Vec<GoalTemplate>,

    /// Goals completed in order to fail the block.
    #[serde(default)]
    pub fail_goals: Vec<GoalTemplate>,
}

impl StoryBlockTemplate {
    /// Create an empty template of the given type.
    pub fn new(id: impl Into<String>, block_type: BlockType) -> Self {
        Self {
            id: TemplateId::new(id),
            title: String::new(),
            block_type,
            themes: Vec::new(),
            success_goals: Vec::new(),
            fail_goals: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.themes.push(theme);
        self
    }

    pub fn with_themes(mut self, themes: impl IntoIterator<Item = Theme>) -> Self {
        self.themes.extend(themes);
        self
    }

    pub fn with_success_goal(mut self, goal: GoalTemplate) -> Self {
        self.success_goals.push(goal);
        self
    }

    pub fn with_fail_goal(mut self, goal: GoalTemplate) -> Self {
        self.fail_goals.push(goal);
        self
    }

    /// The first theme in the set.
    pub fn primary_theme(&self) -> Option<Theme> {
        self.themes.first().copied()
    }

    /// Whether the theme appears anywhere in the set.
    pub fn has_theme(&self, theme: Theme) -> bool {
        self.themes.contains(&theme)
    }

    /// Refinement predicate: the type must match exactly. Regular blocks match
    /// on any of their themes, the others on their single theme.
    pub fn matches(&self, theme: Theme, block_type: BlockType) -> bool {
        if self.block_type != block_type {
            return false;
        }

        if self.block_type.allows_multiple_themes() {
            self.has_theme(theme)
        } else {
            self.primary_theme() == Some(theme)
        }
    }

    /// Reject templates that could never run correctly.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.themes.is_empty() {
            return Err(RulesError::invalid_block(&self.id, "no themes"));
        }
        if !self.block_type.allows_multiple_themes() && self.themes.len() > 1 {
            return Err(RulesError::invalid_block(
                &self.id,
                format!("{} blocks take exactly one theme", self.block_type),
            ));
        }
        if self.success_goals.is_empty() {
            return Err(RulesError::invalid_block(&self.id, "no success goals"));
        }

        for goal in self.success_goals.iter().chain(&self.fail_goals) {
            goal.validate().map_err(|e| match e {
                RulesError::InvalidTemplate { reason, .. } => {
                    RulesError::invalid_block(&self.id, reason)
                }
                other => other,
            })?;
        }

        Ok(())
    }
}
