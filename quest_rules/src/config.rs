//! Loading authored quest content from TOML.
//!
//! ```toml
//! [questline]
//! quests_to_complete = 4
//! starting_theme = "Fantasy"
//!
//! [[story_blocks]]
//! id = "road_ambush"
//! block_type = "Starter"
//! themes = ["Fantasy"]
//!
//! [[story_blocks.success_goals]]
//! target = 3
//! channel = "enemy_killed"
//! kind = { type = "kill", enemy = "Bandit" }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::RulesError;
use crate::mechanics::{BlockType, Theme};
use crate::templates::StoryBlockTemplate;

/// Author-time settings of a questline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestlineSettings {
    /// How many story blocks must be completed to finish the questline.
    pub quests_to_complete: u32,

    /// Theme of the opening story block. Later blocks inherit the theme of
    /// whichever block opened the questline.
    pub starting_theme: Theme,

    /// Type of the opening story block.
    pub starting_type: BlockType,
}

impl Default for QuestlineSettings {
    fn default() -> Self {
        Self {
            quests_to_complete: 4,
            starting_theme: Theme::Fantasy,
            starting_type: BlockType::Starter,
        }
    }
}

impl QuestlineSettings {
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.quests_to_complete == 0 {
            return Err(RulesError::InvalidTemplate {
                template: "questline".to_string(),
                reason: "quests_to_complete must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Everything needed to run questlines: settings plus the story block pool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestConfig {
    #[serde(default)]
    pub questline: QuestlineSettings,

    #[serde(default)]
    pub story_blocks: Vec<StoryBlockTemplate>,
}

impl QuestConfig {
    /// Parse and validate a config from a TOML string.
    pub fn from_toml_str(input: &str) -> Result<Self, RulesError> {
        let config: QuestConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| RulesError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check settings and every template. Story block ids must be unique.
    pub fn validate(&self) -> Result<(), RulesError> {
        self.questline.validate()?;

        let mut seen = HashSet::new();
        for block in &self.story_blocks {
            block.validate()?;
            if !seen.insert(&block.id) {
                return Err(RulesError::DuplicateTemplate(block.id.clone()));
            }
        }

        Ok(())
    }
}
