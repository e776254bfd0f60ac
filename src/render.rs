use macroquad::prelude::*;
use tankarena::GameStatus;
use tankarena::events::{BuildingSnapshot, ShellSnapshot, TankSnapshot, WorldSnapshot};
use tankarena::geometry::footprint_corners;
use tankarena::tank::Controller;
use tankarena::types::{Point, Vec3};

const FOLLOW_VIEW_SPAN: f64 = 12_000.0; // World units across the short screen edge
const HUD_FONT_SIZE: f32 = 22.0;
const SHELL_SCREEN_RADIUS: f32 = 2.5;
const MIN_TANK_SCREEN_SIZE: f32 = 3.0; // Keeps tanks visible on the full map

const GROUND_COLOR: Color = Color::new(0.16, 0.20, 0.14, 1.0);
const BORDER_COLOR: Color = Color::new(0.55, 0.55, 0.55, 1.0);
const BUILDING_COLOR: Color = Color::new(0.35, 0.33, 0.30, 1.0);
const BUILDING_ROOF_COLOR: Color = Color::new(0.45, 0.43, 0.40, 1.0);
const PLAYER_COLOR: Color = Color::new(0.25, 0.45, 0.75, 1.0);
const ENEMY_COLOR: Color = Color::new(0.70, 0.22, 0.20, 1.0);

/// Which part of the world the camera shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Follow, // Close view centred on the player
    Map,    // Whole world
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Follow => ViewMode::Map,
            ViewMode::Map => ViewMode::Follow,
        }
    }
}

// Maps world X/Z onto the screen, +Z pointing up
struct Camera {
    focus: Point,
    scale: f64, // Pixels per world unit
    center: Vec2,
}

impl Camera {
    fn new(view: ViewMode, snapshot: &WorldSnapshot, world_size: f64) -> Self {
        let (width, height) = (screen_width(), screen_height());
        let short_edge = width.min(height) as f64;
        let (focus, span) = match (view, snapshot.player()) {
            (ViewMode::Follow, Some(player)) => (player.position.ground(), FOLLOW_VIEW_SPAN),
            _ => (Point::new(0.0, 0.0), world_size),
        };
        Camera {
            focus,
            scale: short_edge / span,
            center: vec2(width / 2.0, height / 2.0),
        }
    }

    fn to_screen(&self, point: Point) -> Vec2 {
        vec2(
            self.center.x + ((point.x - self.focus.x) * self.scale) as f32,
            self.center.y - ((point.z - self.focus.z) * self.scale) as f32,
        )
    }

    fn length(&self, world: f64) -> f32 {
        (world * self.scale) as f32
    }
}

// Handles drawing the arena from above using macroquad
pub struct Renderer {
    world_size: f64,
}

impl Renderer {
    pub fn new(world_size: f64) -> Self {
        Renderer { world_size }
    }

    pub fn draw_frame(&self, snapshot: &WorldSnapshot, view: ViewMode, status: GameStatus, announcement: Option<&str>) {
        clear_background(BLACK);
        let camera = Camera::new(view, snapshot, self.world_size);

        self.draw_ground(&camera);
        for building in &snapshot.buildings {
            Self::draw_building(&camera, building);
        }
        for tank in &snapshot.tanks {
            Self::draw_tank(&camera, tank);
        }
        for shell in &snapshot.shells {
            Self::draw_shell(&camera, shell);
        }

        Self::draw_hud(snapshot, view, status);
        if let Some(message) = announcement {
            Self::draw_announcement(message);
        }
    }

    fn draw_ground(&self, camera: &Camera) {
        let half = self.world_size / 2.0;
        let top_left = camera.to_screen(Point::new(-half, half));
        let size = camera.length(self.world_size);
        draw_rectangle(top_left.x, top_left.y, size, size, GROUND_COLOR);
        draw_rectangle_lines(top_left.x, top_left.y, size, size, 2.0, BORDER_COLOR);
    }

    fn draw_building(camera: &Camera, building: &BuildingSnapshot) {
        let half = building.half_extents;
        let top_left = camera.to_screen(Point::new(building.position.x - half.x, building.position.z + half.z));
        let (width, depth) = (camera.length(half.x * 2.0), camera.length(half.z * 2.0));
        draw_rectangle(top_left.x, top_left.y, width, depth, BUILDING_COLOR);
        // Inset roof so neighbouring blocks stay distinguishable when zoomed out
        let inset = width * 0.15;
        draw_rectangle(
            top_left.x + inset,
            top_left.y + inset,
            width - inset * 2.0,
            depth - inset * 2.0,
            BUILDING_ROOF_COLOR,
        );
    }

    fn draw_tank(camera: &Camera, tank: &TankSnapshot) {
        let color = match tank.controller {
            Controller::Human => PLAYER_COLOR,
            Controller::Ai => ENEMY_COLOR,
        };
        let center = camera.to_screen(tank.position.ground());

        if camera.length(tank.half_extents.x * 2.0) < MIN_TANK_SCREEN_SIZE {
            draw_circle(center.x, center.y, MIN_TANK_SCREEN_SIZE, color);
            return;
        }

        let [top_left, top_right, bottom_left, bottom_right] =
            footprint_corners(tank.position.ground(), tank.half_extents, tank.heading).map(|c| camera.to_screen(c));
        draw_triangle(top_left, top_right, bottom_left, color);
        draw_triangle(bottom_right, top_right, bottom_left, color);
        let outline = Color::new(color.r + 0.2, color.g + 0.2, color.b + 0.2, 1.0);
        draw_line(top_left.x, top_left.y, top_right.x, top_right.y, 2.0, outline); // Nose
        draw_line(bottom_left.x, bottom_left.y, bottom_right.x, bottom_right.y, 1.0, outline);

        // Barrel, foreshortened as the cannon rises
        let aim = tank.heading + tank.turret;
        let reach = camera.length(tank.half_extents.z * 1.4 * tank.cannon.cos());
        let tip = center + vec2(aim.sin() as f32, -(aim.cos() as f32)) * reach;
        let barrel_color = if tank.reloading { GRAY } else { LIGHTGRAY };
        draw_circle(center.x, center.y, camera.length(tank.half_extents.x * 0.45), barrel_color);
        draw_line(center.x, center.y, tip.x, tip.y, 3.0, barrel_color);
    }

    fn draw_shell(camera: &Camera, shell: &ShellSnapshot) {
        let position = camera.to_screen(shell.position.ground());
        // Shadow on the ground, shell offset by height
        draw_circle(position.x, position.y, SHELL_SCREEN_RADIUS, Color::new(0.0, 0.0, 0.0, 0.5));
        let lifted = position - vec2(0.0, camera.length(shell.position.y * 0.25));
        draw_circle(lifted.x, lifted.y, SHELL_SCREEN_RADIUS, YELLOW);
    }

    fn draw_hud(snapshot: &WorldSnapshot, view: ViewMode, status: GameStatus) {
        let padding = 12.0;
        let enemies = snapshot.tanks.iter().filter(|t| t.controller == Controller::Ai).count();

        if let Some(player) = snapshot.player() {
            draw_text("HEALTH", padding, padding + HUD_FONT_SIZE, HUD_FONT_SIZE, WHITE);
            let pip = 14.0;
            for i in 0..player.health.max(0) {
                draw_rectangle(
                    padding + 90.0 + i as f32 * (pip + 4.0),
                    padding + 6.0,
                    pip,
                    pip,
                    health_color(player.health),
                );
            }
            let position = player.position;
            let info = format!("X {:>7.0}  Z {:>7.0}  {}", position.x, position.z, reload_label(player));
            draw_text(&info, padding, padding + HUD_FONT_SIZE * 2.2, HUD_FONT_SIZE * 0.8, LIGHTGRAY);
        }

        let enemy_text = format!("ENEMIES {}", enemies);
        let dims = measure_text(&enemy_text, None, HUD_FONT_SIZE as u16, 1.0);
        draw_text(
            &enemy_text,
            screen_width() - dims.width - padding,
            padding + HUD_FONT_SIZE,
            HUD_FONT_SIZE,
            WHITE,
        );

        let hint = match view {
            ViewMode::Follow => "M: map",
            ViewMode::Map => "M: follow",
        };
        let status_text = match status {
            GameStatus::Running => "",
            GameStatus::PlayerDestroyed => "DESTROYED",
            GameStatus::Victory => "VICTORY",
        };
        draw_text(
            &format!("{}  {}", hint, status_text),
            padding,
            screen_height() - padding,
            HUD_FONT_SIZE * 0.8,
            GRAY,
        );
    }

    fn draw_announcement(message: &str) {
        let font_size = 64.0;
        draw_rectangle(0.0, 0.0, screen_width(), screen_height(), Color::new(0.0, 0.0, 0.0, 0.5));
        let dims = measure_text(message, None, font_size as u16, 1.0);
        draw_text(
            message,
            (screen_width() - dims.width) / 2.0,
            screen_height() / 2.0,
            font_size,
            WHITE,
        );
        let hint = "Press Esc to quit";
        let hint_dims = measure_text(hint, None, 24, 1.0);
        draw_text(
            hint,
            (screen_width() - hint_dims.width) / 2.0,
            screen_height() / 2.0 + 40.0,
            24.0,
            LIGHTGRAY,
        );
    }
}

fn reload_label(tank: &TankSnapshot) -> &'static str {
    if tank.reloading { "RELOADING" } else { "READY" }
}

// Green when healthy through yellow to red
fn health_color(health: i32) -> Color {
    let ratio = (health as f32 / tankarena::config::PLAYER_HEALTH as f32).clamp(0.0, 1.0);
    if ratio > 0.5 {
        let t = (ratio - 0.5) * 2.0;
        Color::new(1.0 - t, 1.0, 0.0, 1.0)
    } else {
        Color::new(1.0, ratio * 2.0, 0.0, 1.0)
    }
}

/// Listener position for positional audio: the player, or the world centre once the
/// player is gone.
pub fn listener(snapshot: &WorldSnapshot) -> Vec3 {
    snapshot.player().map(|p| p.position).unwrap_or(Vec3::ZERO)
}
