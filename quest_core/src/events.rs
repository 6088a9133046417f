//! Signals the runtime sends to the outside world.
//!
//! Story blocks and goals never call out directly. They push [`QuestSignal`]s
//! into an outbox; the questline drains it, reacts where it has to, and hands
//! every signal to the registered [`QuestObserver`]s in emission order.

use quest_rules::TemplateId;
use serde::{Deserialize, Serialize};

use crate::goals::GoalId;
use crate::story_block::StoryBlockId;

/// Something observable happened to a goal, a story block or the questline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum QuestSignal {
    /// A goal became active and is now listening on its channel.
    GoalActivated { block: StoryBlockId, goal: GoalId },

    /// A goal's behavior reacted to a payload. Hook for UI/audio feedback.
    GoalResponded {
        block: StoryBlockId,
        goal: GoalId,
        payload: String,
    },

    /// A goal recorded progress.
    GoalProgressed {
        block: StoryBlockId,
        goal: GoalId,
        current: u32,
        target: u32,
    },

    /// A goal reached its target.
    GoalCompleted { block: StoryBlockId, goal: GoalId },

    /// A goal from a failure sequence completed. Informational.
    GoalFailed { block: StoryBlockId, goal: GoalId },

    /// A story block was selected, instantiated and appended to the questline.
    StoryBlockAdded {
        block: StoryBlockId,
        template: TemplateId,
    },

    /// Every success goal of a story block completed.
    StoryCompleted { block: StoryBlockId },

    /// Every failure goal of a story block completed.
    StoryFailed { block: StoryBlockId },

    /// The questline finished. Rewards are granted by observers of this signal.
    QuestlineCompleted { completed: u32 },
}

impl QuestSignal {
    /// The story block the signal concerns, if any.
    pub fn block(&self) -> Option<StoryBlockId> {
        match self {
            QuestSignal::GoalActivated { block, .. }
            | QuestSignal::GoalResponded { block, .. }
            | QuestSignal::GoalProgressed { block, .. }
            | QuestSignal::GoalCompleted { block, .. }
            | QuestSignal::GoalFailed { block, .. }
            | QuestSignal::StoryBlockAdded { block, .. }
            | QuestSignal::StoryCompleted { block }
            | QuestSignal::StoryFailed { block } => Some(*block),
            QuestSignal::QuestlineCompleted { .. } => None,
        }
    }
}

/// Receives signals from a questline.
///
/// Observers travel with the questline, so they must be `Send`.
pub trait QuestObserver: Send {
    fn on_signal(&mut self, signal: &QuestSignal);
}

impl<F> QuestObserver for F
where
    F: FnMut(&QuestSignal) + Send,
{
    fn on_signal(&mut self, signal: &QuestSignal) {
        self(signal)
    }
}
