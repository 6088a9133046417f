//! Quest Manager - owns the story block pool and picks blocks that fit the
//! current world state.
//!
//! Selection works in three steps:
//! 1. **World state**: record the requested theme and block type
//! 2. **Refinement**: keep the available templates whose type matches and
//!    whose theme set fits (any theme for Regular blocks, the single theme
//!    otherwise)
//! 3. **Selection**: pick one refined template at random and move it from the
//!    available list to the removed list
//!
//! Removed templates come back with [`QuestManager::refresh_quest_list`].

mod random;

pub use random::*;

use std::collections::HashSet;
use std::sync::Arc;

use quest_rules::{BlockType, QuestConfig, RulesError, StoryBlockTemplate, Theme, WorldState};
use tracing::{debug, info, warn};

use crate::error::QuestError;

/// The pool of story block templates for one questline run.
#[derive(Debug)]
pub struct QuestManager {
    /// Templates that can still be selected.
    available: Vec<Arc<StoryBlockTemplate>>,

    /// Templates selected during this run.
    removed: Vec<Arc<StoryBlockTemplate>>,

    /// Result of the last refinement.
    refined: Vec<Arc<StoryBlockTemplate>>,

    world_state: WorldState,

    rng: Box<dyn RandomSource>,
}

impl QuestManager {
    /// Build a pool from templates. Every template is validated and ids
    /// must be unique.
    pub fn new(
        templates: impl IntoIterator<Item = StoryBlockTemplate>,
    ) -> Result<Self, QuestError> {
        let mut seen = HashSet::new();
        let mut available = Vec::new();

        for template in templates {
            template.validate()?;
            if !seen.insert(template.id.clone()) {
                return Err(RulesError::DuplicateTemplate(template.id).into());
            }
            available.push(Arc::new(template));
        }

        Ok(Self {
            available,
            removed: Vec::new(),
            refined: Vec::new(),
            world_state: WorldState::default(),
            rng: Box::new(ThreadRandom),
        })
    }

    /// Build a pool from the story blocks of a loaded config.
    pub fn from_config(config: &QuestConfig) -> Result<Self, QuestError> {
        Self::new(config.story_blocks.iter().cloned())
    }

    /// Replace the random source.
    pub fn with_random(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Find a story block that fits the theme and type, and take it out of the pool.
    pub fn select_story_block(
        &mut self,
        theme: Theme,
        block_type: BlockType,
    ) -> Result<Arc<StoryBlockTemplate>, QuestError> {
        self.set_world_state(theme, block_type);

        if self.refined.is_empty() {
            warn!(
                %theme,
                %block_type,
                available = self.available.len(),
                "no story block fits the world state"
            );
            return Err(QuestError::NoCandidates { theme, block_type });
        }

        let index = self.rng.pick(self.refined.len()).min(self.refined.len() - 1);
        let selected = Arc::clone(&self.refined[index]);

        self.available.retain(|t| !Arc::ptr_eq(t, &selected));
        self.refined.retain(|t| !Arc::ptr_eq(t, &selected));
        self.removed.push(Arc::clone(&selected));

        debug!(
            template = %selected.id,
            %theme,
            %block_type,
            candidates = self.refined.len() + 1,
            "story block selected"
        );
        Ok(selected)
    }

    /// Put every removed template back into the available pool.
    pub fn refresh_quest_list(&mut self) {
        let restored = self.removed.len();
        self.available.append(&mut self.removed);
        info!(restored, available = self.available.len(), "quest list refreshed");
    }

    fn set_world_state(&mut self, theme: Theme, block_type: BlockType) {
        self.world_state = WorldState::new(theme, block_type);
        self.refine_story_blocks();
    }

    fn refine_story_blocks(&mut self) {
        self.refined = self.world_state.refine(self.available.iter().cloned());
    }

    pub fn available(&self) -> &[Arc<StoryBlockTemplate>] {
        &self.available
    }

    pub fn removed(&self) -> &[Arc<StoryBlockTemplate>] {
        &self.removed
    }

    /// Candidates left over from the last refinement.
    pub fn refined(&self) -> &[Arc<StoryBlockTemplate>] {
        &self.refined
    }

    pub fn world_state(&self) -> WorldState {
        self.world_state
    }

    /// Available plus removed. Constant for the lifetime of the manager.
    pub fn pool_size(&self) -> usize {
        self.available.len() + self.removed.len()
    }
}
