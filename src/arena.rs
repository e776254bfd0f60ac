use crate::ai;
use crate::collision;
use crate::config::WorldConfig;
use crate::error::ArenaError;
use crate::events::{
    BuildingSnapshot, EventSink, ShellSnapshot, SoundKind, TankSnapshot, WorldEvent, WorldSnapshot,
};
use crate::input::{self, Command};
use crate::obstacles::{Building, ObstacleRegistry};
use crate::shell::{Impact, Launch, Shell};
use crate::tank::{Controller, MoveDirection, Tank};
use crate::types::{EntityId, TickTime, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Overall state of a game from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Running,
    PlayerDestroyed,
    Victory,
}

/// One tank plus the parts of the world it needs to act: the other tanks and the
/// buildings to collide with, and somewhere to put shells and sounds.
///
/// Human commands and the AI drive tanks through the same handle.
pub struct TankControl<'a> {
    pub(crate) tanks: &'a mut [Tank],
    pub(crate) index: usize,
    pub(crate) buildings: &'a ObstacleRegistry,
    pub(crate) half_extent: f64,
    pub(crate) now: f64,
    pub(crate) tick: u64,
    pub(crate) launches: &'a mut Vec<Launch>,
    pub(crate) sink: &'a mut dyn EventSink,
}

impl TankControl<'_> {
    pub fn tank(&self) -> &Tank {
        &self.tanks[self.index]
    }

    pub fn tank_mut(&mut self) -> &mut Tank {
        &mut self.tanks[self.index]
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Position of the first live human-controlled tank, if any.
    pub fn human_position(&self) -> Option<Vec3> {
        self.tanks
            .iter()
            .find(|t| !t.is_destroyed() && t.controller() == Controller::Human)
            .map(|t| t.position)
    }

    /// Moves the tank one step. The move is undone if the new pose collides with the
    /// border, a tank or a building. Returns whether the move stuck.
    pub fn drive(&mut self, direction: MoveDirection) -> bool {
        let snapshot = self.tanks[self.index].pose();
        self.tanks[self.index].integrate_move(direction);

        let tanks: &[Tank] = &*self.tanks;
        let tank = &tanks[self.index];
        if collision::collides_with_world(tank, tanks, self.buildings, self.half_extent) {
            crate::debug_drive!(tank.id, self.tick, "Move {:?} blocked, rolled back", direction);
            self.tanks[self.index].restore(snapshot);
            return false;
        }
        true
    }

    /// Fires if the cannon is loaded. The shell joins the world at the end of the
    /// tank phase of the tick.
    pub fn fire(&mut self) -> bool {
        let now = self.now;
        let tank = &mut self.tanks[self.index];
        match tank.fire_cannon(now) {
            Some(launch) => {
                self.sink.emit(WorldEvent::Sound {
                    kind: SoundKind::Shoot,
                    position: tank.position,
                });
                self.launches.push(launch);
                true
            }
            None => false,
        }
    }
}

// Represents the simulated world: tanks, buildings and shells in flight
#[derive(Debug)]
pub struct Arena {
    config: WorldConfig,
    tanks: Vec<Tank>,
    buildings: ObstacleRegistry,
    shells: Vec<Shell>,
    next_id: EntityId,
    ticks: u64,
    rng: StdRng,
}

impl Arena {
    pub fn new(config: WorldConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Arena {
            config,
            tanks: Vec::new(),
            buildings: ObstacleRegistry::new(),
            shells: Vec::new(),
            next_id: 1,
            ticks: 0,
            rng,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    // --- Population ---

    pub fn add_building(&mut self, position: Vec3) -> EntityId {
        let id = self.allocate_id();
        self.buildings.insert(Building::new(id, position));
        id
    }

    /// Adds a tank without checking where it lands.
    pub fn add_tank(&mut self, position: Vec3, controller: Controller) -> EntityId {
        let id = self.allocate_id();
        let mut tank = Tank::new(id, position, controller);
        if controller == Controller::Human {
            tank.health = self.config.player_health;
        }
        self.tanks.push(tank);
        id
    }

    /// True if a default tank with heading 0 at `position` would collide with the world.
    pub fn placement_collides(&self, position: Vec3) -> bool {
        let probe = Tank::new(EntityId::MAX, position, Controller::Ai);
        collision::collides_with_world(&probe, &self.tanks, &self.buildings, self.config.half_extent())
    }

    pub fn set_controller(&mut self, id: EntityId, controller: Controller) -> Result<(), ArenaError> {
        let tank = self.tank_mut(id)?;
        tank.set_controller(controller);
        Ok(())
    }

    // --- Queries ---

    pub fn tank(&self, id: EntityId) -> Option<&Tank> {
        self.tanks.iter().find(|t| t.id == id && !t.is_destroyed())
    }

    pub fn tank_mut(&mut self, id: EntityId) -> Result<&mut Tank, ArenaError> {
        self.tanks
            .iter_mut()
            .find(|t| t.id == id && !t.is_destroyed())
            .ok_or(ArenaError::UnknownTank(id))
    }

    pub fn tanks(&self) -> &[Tank] {
        &self.tanks
    }

    pub fn buildings(&self) -> &ObstacleRegistry {
        &self.buildings
    }

    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    /// The first live human-controlled tank.
    pub fn player(&self) -> Option<&Tank> {
        self.tanks
            .iter()
            .find(|t| !t.is_destroyed() && t.controller() == Controller::Human)
    }

    pub fn enemy_count(&self) -> usize {
        self.tanks.iter().filter(|t| !t.is_destroyed() && t.is_ai()).count()
    }

    pub fn status(&self) -> GameStatus {
        if self.player().is_none() {
            GameStatus::PlayerDestroyed
        } else if self.enemy_count() == 0 {
            GameStatus::Victory
        } else {
            GameStatus::Running
        }
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        let tanks = self
            .tanks
            .iter()
            .filter(|t| !t.is_destroyed())
            .map(|t| {
                let (front_wheel, back_wheel) = t.wheels();
                TankSnapshot {
                    id: t.id,
                    controller: t.controller(),
                    position: t.position,
                    heading: t.heading(),
                    steering: t.steering(),
                    turret: t.turret(),
                    cannon: t.cannon(),
                    front_wheel,
                    back_wheel,
                    half_extents: t.half_extents(),
                    health: t.health,
                    reloading: t.is_reloading(),
                }
            })
            .collect();
        let buildings = self
            .buildings
            .iter()
            .map(|b| BuildingSnapshot {
                id: b.id,
                position: b.position,
                half_extents: b.half_extents(),
                height: b.size.y,
            })
            .collect();
        let shells = self
            .shells
            .iter()
            .map(|s| ShellSnapshot {
                id: s.id,
                position: s.position(),
            })
            .collect();
        WorldSnapshot {
            tanks,
            buildings,
            shells,
        }
    }

    // --- Simulation ---

    /// Advances the world by one tick.
    ///
    /// Human commands go to the player tank first, then every tank in id order reloads
    /// and, if AI controlled, thinks. Shells fired this tick join the world afterwards and
    /// only start moving next tick. Everything destroyed during the tick is removed at
    /// the end, and until then it is invisible to every query.
    pub fn tick(&mut self, time: TickTime, commands: &[Command], sink: &mut dyn EventSink) {
        self.ticks += 1;
        let half_extent = self.config.half_extent();
        let mut launches = Vec::new();

        if let Some(index) = self.player_index() {
            let mut control = TankControl {
                tanks: &mut self.tanks,
                index,
                buildings: &self.buildings,
                half_extent,
                now: time.total,
                tick: self.ticks,
                launches: &mut launches,
                sink: &mut *sink,
            };
            for &command in commands {
                input::apply(command, &mut control);
            }
        }

        for index in 0..self.tanks.len() {
            if self.tanks[index].is_destroyed() {
                continue;
            }
            self.tanks[index].update_reload(time.total);
            if !self.tanks[index].is_ai() {
                continue;
            }
            let mut control = TankControl {
                tanks: &mut self.tanks,
                index,
                buildings: &self.buildings,
                half_extent,
                now: time.total,
                tick: self.ticks,
                launches: &mut launches,
                sink: &mut *sink,
            };
            ai::update(&mut control, &self.config.lattice, &mut self.rng);
        }

        let in_flight = self.shells.len();
        for launch in launches {
            let id = self.allocate_id();
            crate::debug_shell!("Shell {} launched by tank {}", id, launch.owner);
            self.shells.push(Shell::new(id, launch));
        }

        let mut spent = Vec::new();
        for index in 0..in_flight {
            let impact = self.shells[index].find_impact(&self.tanks, &self.buildings, time.elapsed);
            match impact {
                Some(impact) => {
                    let shell = &self.shells[index];
                    let (id, position) = (shell.id, shell.position());
                    self.apply_impact(id, impact, position, sink);
                    spent.push(id);
                }
                None => self.shells[index].advance(time.elapsed),
            }
        }

        self.sweep(&spent, sink);
    }

    fn player_index(&self) -> Option<usize> {
        self.tanks
            .iter()
            .position(|t| !t.is_destroyed() && t.controller() == Controller::Human)
    }

    fn apply_impact(&mut self, shell_id: EntityId, impact: Impact, position: Vec3, sink: &mut dyn EventSink) {
        match impact {
            Impact::Ground => {
                crate::debug_shell!("Shell {} hit the ground", shell_id);
            }
            Impact::Tank(tank_id) => {
                if let Some(tank) = self.tanks.iter_mut().find(|t| t.id == tank_id) {
                    tank.health -= 1;
                    crate::debug_shell!("Shell {} hit tank {}, health now {}", shell_id, tank_id, tank.health);
                    if tank.health <= 0 {
                        tank.mark_destroyed();
                        log::info!("Tank {} destroyed", tank_id);
                    }
                }
                sink.emit(WorldEvent::Sound {
                    kind: SoundKind::Hit,
                    position,
                });
            }
            Impact::Building(building_id) => {
                let site = self.buildings.get(building_id).map(|b| b.position.ground());
                if self.buildings.mark_destroyed(building_id) {
                    if let Some(site) = site {
                        log::info!(
                            "Building {} at ({:.0}, {:.0}) destroyed by shell {}",
                            building_id,
                            site.x,
                            site.z,
                            shell_id
                        );
                    }
                }
                sink.emit(WorldEvent::Sound {
                    kind: SoundKind::Hit,
                    position,
                });
            }
        }
    }

    // Removes everything marked during the tick
    fn sweep(&mut self, spent: &[EntityId], sink: &mut dyn EventSink) {
        if self.tanks.iter().any(|t| t.is_destroyed()) {
            for tank in self.tanks.iter().filter(|t| t.is_destroyed()) {
                sink.emit(WorldEvent::TankRemoved(tank.id));
            }
            self.tanks.retain(|t| !t.is_destroyed());
        }

        for id in self.buildings.sweep() {
            sink.emit(WorldEvent::BuildingRemoved(id));
        }

        if !spent.is_empty() {
            self.shells.retain(|s| !spent.contains(&s.id));
            for &id in spent {
                sink.emit(WorldEvent::ShellRemoved(id));
            }
        }
    }
}
