use crate::arena::TankControl;
use crate::tank::MoveDirection;

/// Raw commands a player can issue in one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    TurnLeft,
    TurnRight,
    MoveForward,
    MoveBackward,
    TurretLeft,
    TurretRight,
    CannonUp,
    CannonDown,
    Fire,
    ToggleMap, // Viewer only
    Exit,      // Viewer only
}

impl Command {
    /// True for commands that act on the player's tank rather than the viewer.
    pub fn drives_tank(self) -> bool {
        !matches!(self, Command::ToggleMap | Command::Exit)
    }
}

/// Applies one command to the controlled tank. Viewer commands are ignored.
pub fn apply(command: Command, control: &mut TankControl<'_>) {
    match command {
        Command::TurnLeft => control.tank_mut().turn_left(),
        Command::TurnRight => control.tank_mut().turn_right(),
        Command::MoveForward => {
            control.drive(MoveDirection::Forward);
        }
        Command::MoveBackward => {
            control.drive(MoveDirection::Backward);
        }
        Command::TurretLeft => control.tank_mut().turn_turret_left(),
        Command::TurretRight => control.tank_mut().turn_turret_right(),
        Command::CannonUp => control.tank_mut().cannon_up(),
        Command::CannonDown => control.tank_mut().cannon_down(),
        Command::Fire => {
            if control.fire() {
                let (id, tick) = (control.tank().id, control.tick());
                crate::debug_weapon!(id, tick, "Player fired");
            }
        }
        Command::ToggleMap | Command::Exit => {}
    }
}
