use crate::arena::Arena;
use crate::error::ArenaError;
use crate::tank::Controller;
use crate::types::{EntityId, Vec3};
use rand::Rng;

/// What [`populate`] put into the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    pub player: EntityId,
    pub buildings: usize,
    pub enemies: usize,
}

/// Fills an empty arena: the player at the origin, a regular grid of buildings, then a
/// random number of AI tanks on random spawn-grid points that don't collide with
/// anything already placed.
pub fn populate(arena: &mut Arena) -> Result<Population, ArenaError> {
    let config = arena.config().clone();

    if arena.placement_collides(Vec3::ZERO) {
        return Err(ArenaError::PlayerColliding);
    }
    let player = arena.add_tank(Vec3::ZERO, Controller::Human);

    let per_side = (config.world_size / config.building_spacing).floor() as i64;
    let corner = config.building_offset - config.half_extent();
    let mut buildings = 0;
    for i in 1..=per_side {
        for j in 1..=per_side {
            let position = Vec3::new(
                i as f64 * config.building_spacing + corner,
                0.0,
                j as f64 * config.building_spacing + corner,
            );
            arena.add_building(position);
            buildings += 1;
        }
    }

    let enemies = arena.rng_mut().gen_range(config.min_enemies..config.max_enemies);
    for _ in 0..enemies {
        let position = find_spawn_point(arena)?;
        let id = arena.add_tank(position, Controller::Ai);
        log::debug!(target: "world", "Tank {} spawned at ({:.0}, {:.0})", id, position.x, position.z);
    }

    log::info!(
        "World populated: player {}, {} buildings, {} enemies",
        player,
        buildings,
        enemies
    );

    Ok(Population {
        player,
        buildings,
        enemies: enemies as usize,
    })
}

// Rolls spawn-grid points until one is free
fn find_spawn_point(arena: &mut Arena) -> Result<Vec3, ArenaError> {
    let range = arena.config().spawn_grid_range;
    let step = arena.config().spawn_grid_step;
    let attempts = arena.config().max_placement_attempts;

    for _ in 0..attempts {
        let rng = arena.rng_mut();
        let x = rng.gen_range(-range..=range) as f64 * step;
        let z = rng.gen_range(-range..=range) as f64 * step;
        let position = Vec3::new(x, 0.0, z);
        if !arena.placement_collides(position) {
            return Ok(position);
        }
    }
    Err(ArenaError::PlacementFailed { attempts })
}
