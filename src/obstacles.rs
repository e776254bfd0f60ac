use crate::config::{BUILDING_HALF_DEPTH, BUILDING_HALF_WIDTH, BUILDING_HEIGHT};
use crate::types::{EntityId, Point, Vec3};

// Represents a static building in the arena
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Building {
    pub id: EntityId,
    pub position: Vec3,
    pub size: Vec3, // X/Z half-extents, Y full height
    destroyed: bool,
}

impl Building {
    pub fn new(id: EntityId, position: Vec3) -> Self {
        Building {
            id,
            position,
            size: Vec3::new(BUILDING_HALF_WIDTH, BUILDING_HEIGHT, BUILDING_HALF_DEPTH),
            destroyed: false,
        }
    }

    /// Ground-plane half-extents.
    pub fn half_extents(&self) -> Point {
        Point::new(self.size.x, self.size.z)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

/// The fixed set of buildings. Buildings are only ever removed, never moved or added
/// after world generation; removals take effect in [`ObstacleRegistry::sweep`].
#[derive(Debug, Clone, Default)]
pub struct ObstacleRegistry {
    buildings: Vec<Building>,
}

impl ObstacleRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    // Ids must arrive in increasing order so iteration stays in insertion order
    pub(crate) fn insert(&mut self, building: Building) {
        debug_assert!(self.buildings.last().is_none_or(|b| b.id < building.id));
        self.buildings.push(building);
    }

    /// Live buildings in insertion order. Buildings marked this tick are skipped.
    pub fn iter(&self) -> impl Iterator<Item = &Building> {
        self.buildings.iter().filter(|b| !b.destroyed)
    }

    pub fn get(&self, id: EntityId) -> Option<&Building> {
        self.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Marks a building for removal. Returns false if it was already gone.
    pub fn mark_destroyed(&mut self, id: EntityId) -> bool {
        match self.buildings.iter_mut().find(|b| b.id == id && !b.destroyed) {
            Some(building) => {
                building.destroyed = true;
                true
            }
            None => false,
        }
    }

    /// Drops every marked building and returns their ids.
    pub fn sweep(&mut self) -> Vec<EntityId> {
        let removed: Vec<EntityId> = self
            .buildings
            .iter()
            .filter(|b| b.destroyed)
            .map(|b| b.id)
            .collect();
        if !removed.is_empty() {
            self.buildings.retain(|b| !b.destroyed);
        }
        removed
    }
}
