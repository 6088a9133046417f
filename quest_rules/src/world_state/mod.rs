//! World state as seen by story block selection.

use serde::{Deserialize, Serialize};

use crate::mechanics::{BlockType, Theme};
use crate::templates::StoryBlockTemplate;

/// The slice of world state that drives which story blocks are on offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WorldState {
    /// Theme the next story block should belong to.
    pub theme: Theme,

    /// Kind of story block being looked for.
    pub block_type: BlockType,
}

impl WorldState {
    /// Create a world state for the given theme and block type.
    pub fn new(theme: Theme, block_type: BlockType) -> Self {
        Self { theme, block_type }
    }

    /// Check whether a template fits the current world state.
    pub fn admits(&self, template: &StoryBlockTemplate) -> bool {
        template.matches(self.theme, self.block_type)
    }

    /// Pick out the templates that fit the current world state, in pool order.
    pub fn refine<I, T>(&self, pool: I) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<StoryBlockTemplate>,
    {
        pool.into_iter()
            .filter(|template| self.admits(template.as_ref()))
            .collect()
    }
}

impl AsRef<StoryBlockTemplate> for StoryBlockTemplate {
    fn as_ref(&self) -> &StoryBlockTemplate {
        self
    }
}
