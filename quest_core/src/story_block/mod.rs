//! Story blocks - one narrative unit made of a success sequence and a
//! failure sequence of goals.
//!
//! Each sequence has its own index. The goal at each index is active at the
//! same time as the other sequence's; completing it advances that index.
//! Running out of success goals completes the block, running out of failure
//! goals fails it.

use std::sync::Arc;

use quest_rules::{BlockType, StoryBlockTemplate, Theme};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::channels::{ChannelRegistry, EventTarget};
use crate::error::QuestError;
use crate::events::QuestSignal;
use crate::goals::{Goal, GoalId, GoalRef, GoalState, GoalUpdate};

/// Unique identifier for a story block instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoryBlockId(pub Uuid);

impl StoryBlockId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StoryBlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StoryBlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which of a block's two sequences a goal belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StoryOutcome {
    #[default]
    InProgress,
    Completed,
    Failed,
}

/// A runtime story block, derived from a template and owned by a questline.
#[derive(Debug)]
pub struct StoryBlock {
    id: StoryBlockId,
    template: Arc<StoryBlockTemplate>,
    success_goals: Vec<Goal>,
    fail_goals: Vec<Goal>,
    success_index: usize,
    fail_index: usize,
    initialized: bool,
    outcome: StoryOutcome,
}

impl StoryBlock {
    /// Wrap a template. Goals are not created until [`StoryBlock::init`].
    ///
    /// Malformed templates are rejected here.
    pub fn new(template: Arc<StoryBlockTemplate>) -> Result<Self, QuestError> {
        template.validate()?;

        Ok(Self {
            id: StoryBlockId::new(),
            template,
            success_goals: Vec::new(),
            fail_goals: Vec::new(),
            success_index: 0,
            fail_index: 0,
            initialized: false,
            outcome: StoryOutcome::InProgress,
        })
    }

    /// Create one goal instance per template in each sequence, then activate
    /// the first goal of each. Calling it again does nothing.
    pub fn init(&mut self, channels: &mut ChannelRegistry, outbox: &mut Vec<QuestSignal>) {
        if self.initialized {
            warn!(block = %self.id, "story block already initialized");
            return;
        }

        for template in &self.template.success_goals {
            let goal = Goal::from_template(template);
            goal.init(channels);
            self.success_goals.push(goal);
        }
        for template in &self.template.fail_goals {
            let goal = Goal::from_template(template);
            goal.init(channels);
            self.fail_goals.push(goal);
        }
        self.initialized = true;

        debug!(
            block = %self.id,
            template = %self.template.id,
            success_goals = self.success_goals.len(),
            fail_goals = self.fail_goals.len(),
            "story block initialized"
        );

        self.activate_current(channels, outbox);
    }

    /// Activate the goal at the current index of each sequence.
    ///
    /// Goals already active are left alone. A goal that cannot be activated
    /// is logged and skipped; the rest of the block keeps running.
    pub fn activate_current(
        &mut self,
        channels: &mut ChannelRegistry,
        outbox: &mut Vec<QuestSignal>,
    ) {
        let id = self.id;
        let current = [
            self.success_goals.get_mut(self.success_index),
            self.fail_goals.get_mut(self.fail_index),
        ];

        for goal in current.into_iter().flatten() {
            if goal.state() != GoalState::Inactive {
                continue;
            }
            match goal.activate(id, channels) {
                Ok(()) => outbox.push(QuestSignal::GoalActivated {
                    block: id,
                    goal: goal.id(),
                }),
                Err(e) => warn!(block = %id, error = %e, "goal left inactive"),
            }
        }
    }

    /// A goal of this block reached its target.
    ///
    /// Membership decides what the completion means: a success goal advances
    /// the success sequence, a failure goal advances the failure sequence.
    /// Notifications for a block that already finished are ignored.
    pub fn success(
        &mut self,
        goal: GoalId,
        channels: &mut ChannelRegistry,
        outbox: &mut Vec<QuestSignal>,
    ) {
        if self.is_finished() {
            debug!(block = %self.id, goal = %goal, "story block already finished");
            return;
        }

        match self.sequence_of(goal) {
            Some(Sequence::Success) => self.success_goal_complete(channels, outbox),
            Some(Sequence::Failure) => {
                outbox.push(QuestSignal::GoalFailed {
                    block: self.id,
                    goal,
                });
                self.fail_goal_complete(channels, outbox);
            }
            None => warn!(
                block = %self.id,
                goal = %goal,
                "goal does not belong to this story block"
            ),
        }
    }

    fn success_goal_complete(
        &mut self,
        channels: &mut ChannelRegistry,
        outbox: &mut Vec<QuestSignal>,
    ) {
        self.success_index += 1;

        if self.success_index < self.success_goals.len() {
            self.activate_current(channels, outbox);
        } else {
            self.outcome = StoryOutcome::Completed;
            info!(block = %self.id, template = %self.template.id, "story block complete");
            outbox.push(QuestSignal::StoryCompleted { block: self.id });
        }
    }

    fn fail_goal_complete(
        &mut self,
        channels: &mut ChannelRegistry,
        outbox: &mut Vec<QuestSignal>,
    ) {
        self.fail_index += 1;

        if self.fail_index < self.fail_goals.len() {
            self.activate_current(channels, outbox);
        } else {
            self.outcome = StoryOutcome::Failed;
            if let Some(goal) = self.success_goals.get_mut(self.success_index) {
                goal.fail(channels);
            }
            info!(block = %self.id, template = %self.template.id, "story block failed");
            outbox.push(QuestSignal::StoryFailed { block: self.id });
        }
    }

    /// Route a payload to one of this block's goals and react to completion.
    pub fn deliver_to(
        &mut self,
        goal: GoalId,
        payload: &str,
        channels: &mut ChannelRegistry,
        outbox: &mut Vec<QuestSignal>,
    ) -> GoalUpdate {
        if self.is_finished() {
            return GoalUpdate::Ignored;
        }

        let update = match self.goal_mut(goal) {
            Some(target) => target.handle_event(payload, channels, outbox),
            None => {
                warn!(block = %self.id, goal = %goal, "payload for unknown goal");
                return GoalUpdate::Ignored;
            }
        };

        if update == GoalUpdate::Completed {
            self.success(goal, channels, outbox);
        }
        update
    }

    /// Unsubscribe every goal still listening. Call before dropping the block.
    pub fn teardown(&mut self, channels: &mut ChannelRegistry) {
        for goal in self.success_goals.iter_mut().chain(self.fail_goals.iter_mut()) {
            goal.detach(channels);
        }
    }

    pub fn sequence_of(&self, goal: GoalId) -> Option<Sequence> {
        if self.success_goals.iter().any(|g| g.id() == goal) {
            Some(Sequence::Success)
        } else if self.fail_goals.iter().any(|g| g.id() == goal) {
            Some(Sequence::Failure)
        } else {
            None
        }
    }

    pub fn goal(&self, goal: GoalId) -> Option<&Goal> {
        self.goals().find(|g| g.id() == goal)
    }

    fn goal_mut(&mut self, goal: GoalId) -> Option<&mut Goal> {
        self.success_goals
            .iter_mut()
            .chain(self.fail_goals.iter_mut())
            .find(|g| g.id() == goal)
    }

    /// Every goal of the block, success sequence first.
    pub fn goals(&self) -> impl Iterator<Item = &Goal> {
        self.success_goals.iter().chain(self.fail_goals.iter())
    }

    pub fn id(&self) -> StoryBlockId {
        self.id
    }

    pub fn template(&self) -> &StoryBlockTemplate {
        &self.template
    }

    pub fn block_type(&self) -> BlockType {
        self.template.block_type
    }

    pub fn themes(&self) -> &[Theme] {
        &self.template.themes
    }

    pub fn primary_theme(&self) -> Option<Theme> {
        self.template.primary_theme()
    }

    pub fn success_goals(&self) -> &[Goal] {
        &self.success_goals
    }

    pub fn fail_goals(&self) -> &[Goal] {
        &self.fail_goals
    }

    pub fn success_index(&self) -> usize {
        self.success_index
    }

    pub fn fail_index(&self) -> usize {
        self.fail_index
    }

    /// The success goal currently being worked on, if any remain.
    pub fn active_success_goal(&self) -> Option<&Goal> {
        self.success_goals.get(self.success_index)
    }

    /// The failure goal currently being watched, if any remain.
    pub fn active_fail_goal(&self) -> Option<&Goal> {
        self.fail_goals.get(self.fail_index)
    }

    pub fn outcome(&self) -> StoryOutcome {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome != StoryOutcome::InProgress
    }
}

impl EventTarget for StoryBlock {
    fn deliver(
        &mut self,
        goal: GoalRef,
        payload: &str,
        channels: &mut ChannelRegistry,
        outbox: &mut Vec<QuestSignal>,
    ) -> GoalUpdate {
        if goal.block != self.id {
            return GoalUpdate::Ignored;
        }
        self.deliver_to(goal.goal, payload, channels, outbox)
    }
}

impl EventTarget for Vec<StoryBlock> {
    fn deliver(
        &mut self,
        goal: GoalRef,
        payload: &str,
        channels: &mut ChannelRegistry,
        outbox: &mut Vec<QuestSignal>,
    ) -> GoalUpdate {
        match self.iter_mut().find(|block| block.id == goal.block) {
            Some(block) => block.deliver_to(goal.goal, payload, channels, outbox),
            None => {
                warn!(block = %goal.block, "payload for a story block that no longer exists");
                GoalUpdate::Ignored
            }
        }
    }
}
