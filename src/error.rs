// Setup errors: configuration problems and world population failures

use crate::types::EntityId;
use thiserror::Error;

/// Errors raised while configuring or populating an arena.
/// The per-tick simulation itself never fails.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArenaError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Could not place a tank without collisions after {attempts} attempts")]
    PlacementFailed { attempts: u32 },
    #[error("The player tank collides with the world at its start position")]
    PlayerColliding,
    #[error("No live tank with id {0}")]
    UnknownTank(EntityId),
}
