use crate::audio::AudioSnapshot;
use crate::input::PendingInput;
use crate::theme::InteractionParams;
use crate::visual::Uniforms;
use glam::{Vec2, Vec3};

pub const POINTER_DECAY: f32 = 0.9;
pub const SCROLL_DECAY: f32 = 0.95;
pub const CLICK_DECAY: f32 = 0.95;
/// Click intensity at or below this snaps to zero.
pub const CLICK_EPSILON: f32 = 1e-4;

/// Interaction state carried between frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameState {
    pub pointer: Vec2,
    pub pointer_intensity: f32,
    pub click_position: Vec2,
    pub click_intensity: f32,
    pub scroll_offset: f32,
    pub gyro: Vec3,
    pub elapsed_ms: f64,
}

impl Default for FrameState {
    fn default() -> Self {
        Self {
            pointer: Vec2::splat(0.5),
            pointer_intensity: 0.0,
            click_position: Vec2::ZERO,
            click_intensity: 0.0,
            scroll_offset: 0.0,
            gyro: Vec3::ZERO,
            elapsed_ms: 0.0,
        }
    }
}

impl FrameState {
    /// Fold drained input in, honoring the theme's interaction switches.
    pub fn apply(&mut self, input: &PendingInput, interaction: &InteractionParams) {
        if let Some(p) = input.pointer {
            self.pointer = p.position;
            self.pointer_intensity = if p.touch {
                (p.intensity * interaction.touch_sensitivity).clamp(0.0, 1.0)
            } else {
                p.intensity
            };
        }
        if let Some(position) = input.click {
            if interaction.click_ripples {
                self.click_position = position;
                self.click_intensity = 1.0;
            }
        }
        self.scroll_offset += input.scroll;
        if let Some(tilt) = input.gyro {
            if interaction.gyro_enabled {
                self.gyro = tilt;
            }
        }
    }

    pub fn decay_click(&mut self) {
        if self.click_intensity > CLICK_EPSILON {
            self.click_intensity *= CLICK_DECAY;
        } else {
            self.click_intensity = 0.0;
        }
    }

    /// Per-frame relaxation of pointer and scroll.
    pub fn decay(&mut self) {
        self.pointer_intensity *= POINTER_DECAY;
        self.scroll_offset *= SCROLL_DECAY;
    }

    pub fn uniforms(&self, resolution: Vec2, audio: AudioSnapshot) -> Uniforms {
        Uniforms {
            resolution,
            time_ms: self.elapsed_ms as f32,
            pointer: self.pointer,
            pointer_intensity: self.pointer_intensity,
            click_position: self.click_position,
            click_intensity: self.click_intensity,
            scroll_offset: self.scroll_offset,
            gyro: self.gyro,
            audio,
        }
    }
}
