use super::field::{FieldContext, Geometry};
use super::noise::fbm;
use super::transform::{transform, TransformInputs};
use super::{glsl_mod, mix, mix3};
use crate::audio::AudioSnapshot;
use crate::theme::Theme;
use glam::{Vec2, Vec3};

const PI_APPROX: f32 = 3.14159;
const SECONDARY_DENSITY: f32 = 0.8;

/// Per-frame inputs shared by every pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Uniforms {
    /// Output size in pixels; only the aspect ratio matters.
    pub resolution: Vec2,
    pub time_ms: f32,
    /// Normalized pointer position, origin bottom-left.
    pub pointer: Vec2,
    pub pointer_intensity: f32,
    /// Normalized position of the last click, origin bottom-left.
    pub click_position: Vec2,
    pub click_intensity: f32,
    pub scroll_offset: f32,
    pub gyro: Vec3,
    /// Band levels after the per-band response multipliers.
    pub audio: AudioSnapshot,
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            resolution: Vec2::ONE,
            time_ms: 0.0,
            pointer: Vec2::splat(0.5),
            pointer_intensity: 0.0,
            click_position: Vec2::ZERO,
            click_intensity: 0.0,
            scroll_offset: 0.0,
            gyro: Vec3::ZERO,
            audio: AudioSnapshot::default(),
        }
    }
}

/// One composited pixel with its intermediate terms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub field: f32,
    pub color1: Vec3,
    pub color2: Vec3,
    /// Linear RGB, unclamped.
    pub color: Vec3,
}

/// Everything derived once per frame from the theme and uniforms; `sample`
/// is then a pure function of the pixel coordinate.
#[derive(Clone, Debug)]
pub struct FrameProgram {
    theme: Theme,
    u: Uniforms,
    time: f32,
    aspect: f32,
    pointer_offset: Vec2,
    rotation: Vec3,
    field_ctx: FieldContext,
}

impl FrameProgram {
    pub fn new(theme: &Theme, uniforms: Uniforms) -> Self {
        let theme = theme.sanitized();
        let anim = &theme.animation;
        let time = uniforms.time_ms * 0.001 * anim.base_speed;
        let aspect = if uniforms.resolution.y > 0.0 {
            uniforms.resolution.x / uniforms.resolution.y
        } else {
            1.0
        };
        let pointer_offset = (uniforms.pointer - Vec2::splat(0.5))
            * theme.interaction.mouse_reactivity
            * uniforms.pointer_intensity;
        let rotation = if anim.auto_rotate {
            Vec3::new(anim.rotation_x, anim.rotation_y, anim.rotation_z)
        } else {
            Vec3::ZERO
        };
        let field_ctx = FieldContext {
            time_ms: uniforms.time_ms,
            base_speed: anim.base_speed,
            complexity: theme.geometry.complexity,
            wave_amplitude: anim.wave_amplitude,
        };
        Self {
            theme,
            u: uniforms,
            time,
            aspect,
            pointer_offset,
            rotation,
            field_ctx,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn uniforms(&self) -> &Uniforms {
        &self.u
    }

    /// Speed-scaled time in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn pointer_offset(&self) -> Vec2 {
        self.pointer_offset
    }

    /// `uv` in [0, 1]^2 (origin bottom-left) to aspect-corrected screen space.
    pub fn screen_position(&self, uv: Vec2) -> Vec2 {
        let mut s = (uv - Vec2::splat(0.5)) * 2.0;
        s.x *= self.aspect;
        s
    }

    pub fn transform_inputs(&self, screen: Vec2) -> TransformInputs {
        TransformInputs {
            screen,
            time: self.time,
            pointer_offset: self.pointer_offset,
            bass: self.u.audio.bass,
            mid: self.u.audio.mid,
            gyro: self.u.gyro,
            scroll_offset: self.u.scroll_offset,
            click_intensity: self.u.click_intensity,
            morph: self.theme.geometry.morph,
            rotation: self.rotation,
            breathing: self.theme.animation.breathing_effect,
        }
    }

    /// Primary field, blended with the secondary only when one is selected
    /// and the blend amount is positive.
    pub fn geometry_field(&self, p: Vec3) -> f32 {
        let g = &self.theme.geometry;
        let primary = if self.theme.animation.particle_mode {
            Geometry::Particle
        } else {
            g.primary
        };
        let field1 = primary.field(p, g.density, &self.field_ctx);

        match g.secondary {
            Some(secondary) if g.blend_amount > 0.0 => {
                let field2 = secondary.field(p, g.density * SECONDARY_DENSITY, &self.field_ctx);
                mix(field1, field2, g.blend_fraction())
            }
            _ => field1,
        }
    }

    /// Final scalar field: geometry plus chaos, pulse and audio terms.
    pub fn field_at(&self, uv: Vec2) -> f32 {
        let screen = self.screen_position(uv);
        let p = transform(&self.transform_inputs(screen));
        self.modulate(self.geometry_field(p), uv)
    }

    fn modulate(&self, field: f32, uv: Vec2) -> f32 {
        let t = self.time;
        let chaos = self.theme.geometry.chaos;
        let mut f = field;

        let chaos_uv = uv
            + Vec2::new(
                (uv.y * 20.0 + t).sin() * chaos * 0.1,
                (uv.x * 15.0 + t).cos() * chaos * 0.1,
            );
        f += fbm(chaos_uv * 5.0 + Vec2::splat(t)) * chaos;

        f *= (t * 5.0).sin() * self.theme.animation.pulse * 0.2 + 1.0;

        let audio = &self.u.audio;
        f += audio.energy * 0.3;
        f += (t * 10.0 + audio.bass * 5.0).sin() * audio.bass * 0.2;
        f
    }

    pub fn sample(&self, uv: Vec2) -> Sample {
        let screen = self.screen_position(uv);
        let p = transform(&self.transform_inputs(screen));
        let field = self.modulate(self.geometry_field(p), uv);
        self.colorize(field, screen)
    }

    pub fn shade(&self, uv: Vec2) -> Vec3 {
        self.sample(uv).color
    }

    /// Color stage for an already-composed field value at `screen`.
    pub fn colorize(&self, field: f32, screen: Vec2) -> Sample {
        let t = self.time;
        let c = &self.theme.colors;

        let hue1 = c.primary_hue + t * c.color_speed + field * 0.5;
        let hue2 = c.secondary_hue + t * c.color_speed * 0.7;
        let color1 = hsl_to_rgb(hue1 / 360.0, c.saturation, c.brightness);
        let color2 = hsl_to_rgb(hue2 / 360.0, c.saturation * 0.8, c.brightness * 0.9);

        let mut color = mix3(color1, color2, (field * PI_APPROX).sin() * 0.5 + 0.5);
        color *= field;

        let mouse_distance = (screen - self.pointer_offset).length();
        let glow = (-mouse_distance * 2.0).exp() * c.glow * 0.5;
        color += glow * color1;

        color += self.click_ripple(screen) * color2 * 0.5;

        let audio = &self.u.audio;
        color.x += audio.high * 0.2;
        color.y += audio.mid * 0.2;
        color.z += audio.bass * 0.2;

        Sample {
            field,
            color1,
            color2,
            color,
        }
    }

    /// Radial ripple around the last click, fading with distance and intensity.
    /// The click position is compared as-is against the screen coordinate.
    pub fn click_ripple(&self, screen: Vec2) -> f32 {
        let click = self.u.click_intensity;
        if click <= 0.0 {
            return 0.0;
        }
        let r = (screen - self.u.click_position).length();
        (r * 10.0 - self.u.time_ms * 0.01).sin() * click * (-r * 2.0).exp()
    }
}

/// HSL to RGB with hue in turns; channels land in [0, 1] for s, l in [0, 1].
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    let channel = |offset: f32| {
        ((glsl_mod(h * 6.0 + offset, 6.0) - 3.0).abs() - 1.0).clamp(0.0, 1.0)
    };
    let rgb = Vec3::new(channel(0.0), channel(4.0), channel(2.0));
    Vec3::splat(l) + s * (rgb - Vec3::splat(0.5)) * (1.0 - (2.0 * l - 1.0).abs())
}
