//! Questline - a bounded chain of story blocks.
//!
//! A questline opens with a block of its starting type, then adds a Regular
//! block each time the current one completes, a Finale when one completion
//! remains, and finalizes once enough blocks are done. Every block after the
//! first shares the first block's primary theme.
//!
//! The questline owns the channel registry and the story blocks, so it is
//! also where gameplay code broadcasts world events.

use std::collections::VecDeque;

use quest_rules::{BlockType, ChannelId, QuestConfig, QuestlineSettings, Theme};
use tracing::{debug, info};

use crate::channels::ChannelRegistry;
use crate::error::QuestError;
use crate::events::{QuestObserver, QuestSignal};
use crate::quest_manager::QuestManager;
use crate::story_block::{StoryBlock, StoryBlockId};

/// Where a questline is in its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestlineStatus {
    /// `start` has not been called yet.
    NotStarted,
    /// Working through the opening and regular blocks.
    Building,
    /// One completion left: the finale is in play.
    AwaitingFinale,
    /// Enough blocks completed; the questline has been finalized.
    Complete,
}

pub struct Questline {
    settings: QuestlineSettings,
    manager: QuestManager,
    channels: ChannelRegistry,
    story_blocks: Vec<StoryBlock>,
    /// Number of story blocks completed so far.
    index: u32,
    started: bool,
    observers: Vec<Box<dyn QuestObserver>>,
}

impl Questline {
    pub fn new(settings: QuestlineSettings, manager: QuestManager) -> Result<Self, QuestError> {
        settings.validate()?;

        Ok(Self {
            settings,
            manager,
            channels: ChannelRegistry::new(),
            story_blocks: Vec::new(),
            index: 0,
            started: false,
            observers: Vec::new(),
        })
    }

    /// Build a questline and its manager from a loaded config.
    pub fn from_config(config: &QuestConfig) -> Result<Self, QuestError> {
        Self::new(config.questline, QuestManager::from_config(config)?)
    }

    /// Register an observer for every signal this questline emits.
    pub fn add_observer(&mut self, observer: impl QuestObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Begin a run: purge subscribers left over from earlier runs and add the
    /// opening story block.
    ///
    /// Calling it again abandons the current run: its blocks are torn down and
    /// their templates go back to the pool.
    pub fn start(&mut self) -> Result<(), QuestError> {
        for block in &mut self.story_blocks {
            block.teardown(&mut self.channels);
        }
        self.story_blocks.clear();
        self.manager.refresh_quest_list();
        self.index = 0;
        self.started = true;

        let run = self.channels.begin_run();
        info!(run, quests_to_complete = self.settings.quests_to_complete, "questline started");

        let mut outbox = Vec::new();
        let result = self.add_story_block(
            self.settings.starting_theme,
            self.settings.starting_type,
            &mut outbox,
        );
        let dispatched = self.dispatch(outbox);
        result.and(dispatched)
    }

    /// Deliver a world event to every goal listening on `channel`, then react
    /// to whatever it caused. Returns how many goals received the payload.
    pub fn broadcast(&mut self, channel: &ChannelId, payload: &str) -> Result<usize, QuestError> {
        let mut outbox = Vec::new();
        let delivered = self
            .channels
            .broadcast(channel, payload, &mut self.story_blocks, &mut outbox);
        self.dispatch(outbox)?;
        Ok(delivered)
    }

    /// Hand signals to observers in order, chaining the next story block on
    /// every completion. Signals caused while chaining are queued behind.
    ///
    /// A chaining error does not stop the remaining signals; the first one is
    /// returned at the end.
    fn dispatch(&mut self, outbox: Vec<QuestSignal>) -> Result<(), QuestError> {
        let mut queue: VecDeque<QuestSignal> = outbox.into();
        let mut first_error = None;

        while let Some(signal) = queue.pop_front() {
            for observer in &mut self.observers {
                observer.on_signal(&signal);
            }

            if let QuestSignal::StoryCompleted { .. } = signal {
                let mut follow_up = Vec::new();
                if let Err(e) = self.select_new_story_block(&mut follow_up) {
                    first_error.get_or_insert(e);
                }
                queue.extend(follow_up);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// React to a completed story block.
    fn select_new_story_block(&mut self, outbox: &mut Vec<QuestSignal>) -> Result<(), QuestError> {
        let target = self.settings.quests_to_complete;
        if self.index >= target {
            return Ok(());
        }
        self.index += 1;
        let theme = self.questline_theme();

        if self.index == target - 1 {
            self.add_story_block(theme, BlockType::Finale, outbox)
        } else if self.index >= target {
            self.finalize(outbox);
            Ok(())
        } else {
            self.add_story_block(theme, BlockType::Regular, outbox)
        }
    }

    fn add_story_block(
        &mut self,
        theme: Theme,
        block_type: BlockType,
        outbox: &mut Vec<QuestSignal>,
    ) -> Result<(), QuestError> {
        let template = self.manager.select_story_block(theme, block_type)?;
        let mut block = StoryBlock::new(template)?;

        outbox.push(QuestSignal::StoryBlockAdded {
            block: block.id(),
            template: block.template().id.clone(),
        });
        block.init(&mut self.channels, outbox);

        debug!(
            block = %block.id(),
            template = %block.template().id,
            %block_type,
            completed = self.index,
            "story block added to questline"
        );
        self.story_blocks.push(block);
        Ok(())
    }

    /// Clear the chain and return its templates to the pool. Rewards are
    /// granted by observers of `QuestlineCompleted`.
    fn finalize(&mut self, outbox: &mut Vec<QuestSignal>) {
        for block in &mut self.story_blocks {
            block.teardown(&mut self.channels);
        }
        self.story_blocks.clear();
        self.manager.refresh_quest_list();

        info!(completed = self.index, "questline complete");
        outbox.push(QuestSignal::QuestlineCompleted {
            completed: self.index,
        });
    }

    /// Theme every later block must share: the first block's primary theme.
    fn questline_theme(&self) -> Theme {
        self.story_blocks
            .first()
            .and_then(StoryBlock::primary_theme)
            .unwrap_or(self.settings.starting_theme)
    }

    pub fn status(&self) -> QuestlineStatus {
        let target = self.settings.quests_to_complete;
        if !self.started {
            QuestlineStatus::NotStarted
        } else if self.index >= target {
            QuestlineStatus::Complete
        } else if self.index == target - 1 {
            QuestlineStatus::AwaitingFinale
        } else {
            QuestlineStatus::Building
        }
    }

    /// Story blocks added so far in this run.
    pub fn story_blocks(&self) -> &[StoryBlock] {
        &self.story_blocks
    }

    /// Look up a block of the current run, e.g. one named by a signal.
    pub fn story_block(&self, id: StoryBlockId) -> Result<&StoryBlock, QuestError> {
        self.story_blocks
            .iter()
            .find(|block| block.id() == id)
            .ok_or(QuestError::UnknownBlock(id))
    }

    /// The most recently added story block.
    pub fn current_block(&self) -> Option<&StoryBlock> {
        self.story_blocks.last()
    }

    pub fn completed_count(&self) -> u32 {
        self.index
    }

    pub fn settings(&self) -> &QuestlineSettings {
        &self.settings
    }

    pub fn manager(&self) -> &QuestManager {
        &self.manager
    }

    pub fn channels(&self) -> &ChannelRegistry {
        &self.channels
    }
}

impl std::fmt::Debug for Questline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Questline")
            .field("settings", &self.settings)
            .field("index", &self.index)
            .field("story_blocks", &self.story_blocks.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}
