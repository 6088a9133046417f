//! # Quest Core
//!
//! Runtime side of the story block system. Takes the authored templates from
//! `quest_rules`, turns them into live goals and story blocks, routes world
//! events to them and chains completed blocks into a questline.
//!
//! ## Core Components
//!
//! - **goals**: Goal instances and their `Inactive -> Active -> Complete/Failed` state machine
//! - **channels**: Named broadcast buses that route payloads to active goals
//! - **story_block**: Success and failure goal sequences of one narrative unit
//! - **quest_manager**: Story block pool, world-state refinement and random selection
//! - **questline**: Chains story blocks from starter to finale
//! - **events**: Signals the runtime exposes to the host application
//!
//! ## Model
//!
//! - **Single-threaded**: every operation runs to completion synchronously
//! - **Owned state**: channels hold goal handles, never goals; story blocks own their goals
//! - **Message passing**: blocks emit signals into an outbox the questline drains

pub mod channels;
pub mod error;
pub mod events;
pub mod goals;
pub mod quest_manager;
pub mod questline;
pub mod story_block;

pub use channels::*;
pub use error::*;
pub use events::*;
pub use goals::*;
pub use quest_manager::*;
pub use questline::*;
pub use story_block::*;
