use crate::audio::AudioManager;
use crate::render::{self, Renderer, ViewMode};
use log::info;
use macroquad::prelude::{KeyCode, get_frame_time, is_key_down, is_key_pressed, next_frame};
use tankarena::config::FIXED_TICK_SECONDS;
use tankarena::events::{SoundKind, WorldEvent};
use tankarena::input::Command;
use tankarena::types::GameClock;
use tankarena::{Arena, GameStatus};

const MAX_FRAME_CATCH_UP: f64 = 0.25; // Seconds of simulation a slow frame may owe

// Keys held down are repeated every tick; toggles fire once per press
const HELD_KEYS: [(KeyCode, Command); 11] = [
    (KeyCode::Left, Command::TurnLeft),
    (KeyCode::Right, Command::TurnRight),
    (KeyCode::Up, Command::MoveForward),
    (KeyCode::Down, Command::MoveBackward),
    (KeyCode::A, Command::TurretLeft),
    (KeyCode::D, Command::TurretRight),
    (KeyCode::W, Command::CannonUp),
    (KeyCode::S, Command::CannonDown),
    (KeyCode::Space, Command::Fire),
    (KeyCode::Enter, Command::Fire),
    (KeyCode::KpEnter, Command::Fire),
];

const PRESSED_KEYS: [(KeyCode, Command); 3] = [
    (KeyCode::M, Command::ToggleMap),
    (KeyCode::Escape, Command::Exit),
    (KeyCode::Q, Command::Exit),
];

/// Collects this frame's commands from the keyboard, without duplicates.
fn poll_commands() -> Vec<Command> {
    let mut commands: Vec<Command> = Vec::new();
    let held = HELD_KEYS.iter().filter(|(key, _)| is_key_down(*key));
    let pressed = PRESSED_KEYS.iter().filter(|(key, _)| is_key_pressed(*key));
    for &(_, command) in held.chain(pressed) {
        if !commands.contains(&command) {
            commands.push(command);
        }
    }
    commands
}

/// Counters collected while the simulation runs.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub shots: u32,
    pub hits: u32,
    pub tanks_destroyed: u32,
    pub buildings_destroyed: u32,
}

impl RunSummary {
    fn record(&mut self, events: &[WorldEvent]) {
        for event in events {
            match event {
                WorldEvent::Sound {
                    kind: SoundKind::Shoot,
                    ..
                } => self.shots += 1,
                WorldEvent::Sound { kind: SoundKind::Hit, .. } => self.hits += 1,
                WorldEvent::TankRemoved(_) => self.tanks_destroyed += 1,
                WorldEvent::BuildingRemoved(_) => self.buildings_destroyed += 1,
                WorldEvent::ShellRemoved(_) => {}
            }
        }
    }
}

/// Runs the simulation without a window for up to `max_ticks` fixed steps, stopping
/// early once the game is decided.
pub fn run_headless(arena: &mut Arena, max_ticks: u64) -> RunSummary {
    info!("Running headless for up to {} ticks", max_ticks);
    let mut clock = GameClock::new();
    let mut summary = RunSummary::default();
    let mut events: Vec<WorldEvent> = Vec::new();

    while summary.ticks < max_ticks && arena.status() == GameStatus::Running {
        let time = clock.advance(FIXED_TICK_SECONDS);
        arena.tick(time, &[], &mut events);
        summary.ticks += 1;
        summary.record(&events);
        events.clear();
    }

    info!(
        "Headless run finished after {} ticks ({:.1}s): {:?}, {} enemies left, {} shots, {} hits, {} tanks and {} buildings destroyed",
        summary.ticks,
        clock.total(),
        arena.status(),
        arena.enemy_count(),
        summary.shots,
        summary.hits,
        summary.tanks_destroyed,
        summary.buildings_destroyed
    );
    summary
}

/// The interactive viewer: keyboard in, top-down view and sound out
pub struct Game {
    arena: Arena,
    renderer: Renderer,
    audio: AudioManager,
    clock: GameClock,
    view: ViewMode,
    time_accumulator: f64,
    summary: RunSummary,
}

impl Game {
    pub fn new(arena: Arena) -> Self {
        let renderer = Renderer::new(arena.config().world_size);
        Game {
            arena,
            renderer,
            audio: AudioManager::new(),
            clock: GameClock::new(),
            view: ViewMode::Follow,
            time_accumulator: 0.0,
            summary: RunSummary::default(),
        }
    }

    /// Run the main game loop until the player quits
    pub async fn run(mut self) {
        self.audio.load_assets().await;
        info!("Starting main loop...");

        let mut events: Vec<WorldEvent> = Vec::new();
        loop {
            let commands = poll_commands();
            if commands.contains(&Command::Exit) {
                break;
            }
            if commands.contains(&Command::ToggleMap) {
                self.view = self.view.toggled();
            }

            let status = self.arena.status();
            if status == GameStatus::Running {
                let tank_commands: Vec<Command> = commands.into_iter().filter(|c| c.drives_tank()).collect();
                self.time_accumulator = (self.time_accumulator + get_frame_time() as f64).min(MAX_FRAME_CATCH_UP);

                // Fixed simulation update loop
                while self.time_accumulator >= FIXED_TICK_SECONDS {
                    self.time_accumulator -= FIXED_TICK_SECONDS;
                    let time = self.clock.advance(FIXED_TICK_SECONDS);
                    self.arena.tick(time, &tank_commands, &mut events);
                    self.summary.ticks += 1;
                }
                self.play_sounds(&events);
                self.summary.record(&events);
                events.clear();
            }

            let snapshot = self.arena.snapshot();
            let announcement = match status {
                GameStatus::Running => None,
                GameStatus::PlayerDestroyed => Some("YOU WERE DESTROYED"),
                GameStatus::Victory => Some("VICTORY"),
            };
            self.renderer.draw_frame(&snapshot, self.view, status, announcement);
            next_frame().await;
        }

        info!(
            "Exiting after {} ticks: {} shots, {} hits, {} tanks destroyed",
            self.summary.ticks, self.summary.shots, self.summary.hits, self.summary.tanks_destroyed
        );
    }

    fn play_sounds(&self, events: &[WorldEvent]) {
        let listener = render::listener(&self.arena.snapshot());
        for event in events {
            if let WorldEvent::Sound { kind, position } = *event {
                self.audio.play(kind, position, listener);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tankarena::config::WorldConfig;
    use tankarena::generation;
    use tankarena::tank::Controller;
    use tankarena::types::Vec3;

    #[test]
    fn test_summary_counts_events() {
        let mut summary = RunSummary::default();
        summary.record(&[
            WorldEvent::Sound {
                kind: SoundKind::Shoot,
                position: Vec3::ZERO,
            },
            WorldEvent::Sound {
                kind: SoundKind::Hit,
                position: Vec3::ZERO,
            },
            WorldEvent::TankRemoved(3),
            WorldEvent::ShellRemoved(9),
        ]);
        assert_eq!(summary.shots, 1);
        assert_eq!(summary.hits, 1);
        assert_eq!(summary.tanks_destroyed, 1);
        assert_eq!(summary.buildings_destroyed, 0);
    }

    #[test]
    fn test_headless_run_respects_tick_limit() {
        let mut arena = Arena::new(WorldConfig::default()).expect("valid config");
        generation::populate(&mut arena).expect("population succeeds");
        let summary = run_headless(&mut arena, 30);
        assert_eq!(summary.ticks, 30);
    }

    #[test]
    fn test_headless_run_stops_when_decided() {
        let mut arena = Arena::new(WorldConfig::default()).expect("valid config");
        arena.add_tank(Vec3::ZERO, Controller::Human);
        let summary = run_headless(&mut arena, 120);
        assert_eq!(summary.ticks, 0);
        assert_eq!(arena.status(), GameStatus::Victory);
    }
}
