use log::warn;
use macroquad::audio::{PlaySoundParams, Sound, load_sound, play_sound};
use tankarena::events::SoundKind;
use tankarena::types::Vec3;

const AUDIBLE_RANGE: f64 = 20_000.0; // Sounds further than this from the listener are silent

#[derive(Default)]
pub struct AudioManager {
    shoot_sound: Option<Sound>,
    hit_sound: Option<Sound>,
}

impl AudioManager {
    pub fn new() -> Self {
        Default::default()
    }

    // Load all sound assets; missing files leave that sound silent
    pub async fn load_assets(&mut self) {
        self.shoot_sound = Self::load("assets/shoot.ogg").await;
        self.hit_sound = Self::load("assets/hit.ogg").await;
    }

    async fn load(path: &str) -> Option<Sound> {
        load_sound(path)
            .await
            .map_err(|e| {
                warn!("Failed to load sound '{}': {}", path, e);
                e
            })
            .ok()
    }

    /// Plays `kind` at `position`, quieter the further it is from `listener`.
    pub fn play(&self, kind: SoundKind, position: Vec3, listener: Vec3) {
        let sound = match kind {
            SoundKind::Shoot => self.shoot_sound.as_ref(),
            SoundKind::Hit => self.hit_sound.as_ref(),
        };
        let Some(sound) = sound else {
            return;
        };

        let volume = attenuation(position.distance(&listener));
        if volume > 0.0 {
            play_sound(
                sound,
                PlaySoundParams {
                    looped: false,
                    volume,
                },
            );
        }
    }
}

// Linear falloff from full volume at the listener to silence at the edge of hearing
fn attenuation(distance: f64) -> f32 {
    (1.0 - distance / AUDIBLE_RANGE).clamp(0.0, 1.0) as f32
}
