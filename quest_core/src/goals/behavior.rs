//! Goal behaviors - the pluggable part of a goal that decides whether a
//! payload counts as progress.

use quest_rules::GoalKind;

/// Matching logic for one kind of goal.
///
/// A behavior only interprets payloads. The owning [`Goal`](super::Goal)
/// applies the progress, gates on its state and handles completion.
pub trait GoalBehavior: std::fmt::Debug + Send {
    /// How much progress this payload is worth. Zero means "not for me".
    fn evaluate(&mut self, payload: &str) -> u32;

    /// Short human-readable summary, e.g. "kill Bandit".
    fn describe(&self) -> String;
}

/// Counts kills of one named enemy.
#[derive(Debug, Clone)]
pub struct KillGoal {
    pub enemy: String,
}

impl GoalBehavior for KillGoal {
    fn evaluate(&mut self, payload: &str) -> u32 {
        u32::from(payload == self.enemy)
    }

    fn describe(&self) -> String {
        format!("kill {}", self.enemy)
    }
}

/// Counts pickups of one named item. `item:amount` picks up several at once.
#[derive(Debug, Clone)]
pub struct CollectGoal {
    pub item: String,
}

impl GoalBehavior for CollectGoal {
    fn evaluate(&mut self, payload: &str) -> u32 {
        let (name, amount) = match payload.split_once(':') {
            Some((name, amount)) => match amount.trim().parse::<u32>() {
                Ok(amount) => (name, amount),
                Err(_) => return 0,
            },
            None => (payload, 1),
        };

        if name.trim() == self.item {
            amount
        } else {
            0
        }
    }

    fn describe(&self) -> String {
        format!("collect {}", self.item)
    }
}

/// Build the behavior for an authored goal kind.
pub fn behavior_for(kind: &GoalKind) -> Box<dyn GoalBehavior> {
    match kind {
        GoalKind::Kill { enemy } => Box::new(KillGoal {
            enemy: enemy.clone(),
        }),
        GoalKind::Collect { item } => Box::new(CollectGoal { item: item.clone() }),
    }
}
