//! Tank arena simulation: rotatable tanks driving between static buildings, ballistic
//! shells, and a simple grid-walking AI.
//!
//! [`arena::Arena`] owns the world and advances it one [`arena::Arena::tick`] at a time;
//! [`generation::populate`] builds the standard world. Rendering and audio live in the
//! viewer binary and only consume [`events::WorldEvent`]s and snapshots.

pub mod logging;

pub mod ai;
pub mod arena;
pub mod collision;
pub mod config;
pub mod error;
pub mod events;
pub mod generation;
pub mod geometry;
pub mod input;
pub mod obstacles;
pub mod shell;
pub mod tank;
pub mod types;
pub mod utils;

pub use arena::{Arena, GameStatus};
pub use error::ArenaError;
