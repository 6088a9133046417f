//! # Quest Rules
//!
//! Authored quest content: themes, story block types, goal and story block
//! templates, and the questline settings they run under. Everything here is
//! immutable at runtime; `quest_core` derives its own mutable instances.

pub mod config;
pub mod error;
pub mod mechanics;
pub mod templates;
pub mod world_state;

pub use config::*;
pub use error::*;
pub use mechanics::*;
pub use templates::*;
pub use world_state::*;
