use crate::tank::Controller;
use crate::types::{EntityId, Point, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundKind {
    Shoot,
    Hit,
}

/// Fire-and-forget notifications for renderers and audio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldEvent {
    Sound { kind: SoundKind, position: Vec3 },
    TankRemoved(EntityId),
    BuildingRemoved(EntityId),
    ShellRemoved(EntityId),
}

/// Receives world events as they happen during a tick.
pub trait EventSink {
    fn emit(&mut self, event: WorldEvent);
}

impl EventSink for Vec<WorldEvent> {
    fn emit(&mut self, event: WorldEvent) {
        self.push(event);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: WorldEvent) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankSnapshot {
    pub id: EntityId,
    pub controller: Controller,
    pub position: Vec3,
    pub heading: f64,
    pub steering: f64,
    pub turret: f64,
    pub cannon: f64,
    pub front_wheel: f64,
    pub back_wheel: f64,
    pub half_extents: Point,
    pub health: i32,
    pub reloading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingSnapshot {
    pub id: EntityId,
    pub position: Vec3,
    pub half_extents: Point,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShellSnapshot {
    pub id: EntityId,
    pub position: Vec3,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldSnapshot {
    pub tanks: Vec<TankSnapshot>,
    pub buildings: Vec<BuildingSnapshot>,
    pub shells: Vec<ShellSnapshot>,
}

impl WorldSnapshot {
    pub fn player(&self) -> Option<&TankSnapshot> {
        self.tanks.iter().find(|t| t.controller == Controller::Human)
    }
}
