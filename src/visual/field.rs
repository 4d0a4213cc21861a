use super::{fract3, smoothstep};
use glam::{Vec2, Vec3};

/// Shader-precision pi; the Klein parametrization is tuned against it.
const PI_APPROX: f32 = 3.14159;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Geometry {
    Tetrahedron = 0,
    Hypercube = 1,
    Sphere = 2,
    Torus = 3,
    KleinBottle = 4,
    Fractal = 5,
    Wave = 6,
    Crystal = 7,
    Particle = 8,
}

impl Geometry {
    pub const fn all() -> [Self; 9] {
        [
            Self::Tetrahedron,
            Self::Hypercube,
            Self::Sphere,
            Self::Torus,
            Self::KleinBottle,
            Self::Fractal,
            Self::Wave,
            Self::Crystal,
            Self::Particle,
        ]
    }

    /// Selector lookup. Anything outside 0..=7 lands on the particle swarm.
    pub fn from_index(index: i64) -> Self {
        match index {
            0 => Self::Tetrahedron,
            1 => Self::Hypercube,
            2 => Self::Sphere,
            3 => Self::Torus,
            4 => Self::KleinBottle,
            5 => Self::Fractal,
            6 => Self::Wave,
            7 => Self::Crystal,
            _ => Self::Particle,
        }
    }

    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Tetrahedron => "Tetrahedron",
            Self::Hypercube => "Hypercube",
            Self::Sphere => "Sphere",
            Self::Torus => "Torus",
            Self::KleinBottle => "Klein Bottle",
            Self::Fractal => "Fractal",
            Self::Wave => "Wave",
            Self::Crystal => "Crystal",
            Self::Particle => "Particle",
        }
    }

    pub fn next(self) -> Self {
        Self::from_index((self.index() as i64 + 1) % 9)
    }

    /// Field intensity of this shape at `p`, sampled at `scale`.
    pub fn field(self, p: Vec3, scale: f32, ctx: &FieldContext) -> f32 {
        match self {
            Self::Tetrahedron => tetrahedron(p, scale),
            Self::Hypercube => hypercube(p, scale),
            Self::Sphere => sphere(p, scale),
            Self::Torus => torus(p, scale),
            Self::KleinBottle => klein_bottle(p, scale),
            Self::Fractal => fractal(p, scale, ctx.complexity),
            Self::Wave => wave(p, scale, ctx.time_ms, ctx.base_speed, ctx.wave_amplitude),
            Self::Crystal => crystal(p, scale),
            Self::Particle => particle(p, scale, ctx.time_ms, ctx.complexity),
        }
    }
}

/// Per-frame values some shapes read besides the point itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldContext {
    /// Raw elapsed time in milliseconds (not speed-scaled).
    pub time_ms: f32,
    pub base_speed: f32,
    pub complexity: u32,
    pub wave_amplitude: f32,
}

#[inline]
fn cell(p: Vec3, scale: f32) -> Vec3 {
    fract3(p * scale) - Vec3::splat(0.5)
}

pub fn tetrahedron(p: Vec3, scale: f32) -> f32 {
    let q = cell(p, scale);
    let d1 = q.length();
    let d2 = (q - Vec3::new(0.5, 0.0, 0.0)).length();
    let d3 = (q - Vec3::new(0.0, 0.5, 0.0)).length();
    let d4 = (q - Vec3::new(0.0, 0.0, 0.5)).length();
    let vertices = 1.0 - smoothstep(0.0, 0.1, d1.min(d2).min(d3.min(d4)));

    let band = |r: f32| 1.0 - smoothstep(0.0, 0.05, (r - 0.25).abs());
    let mut edges = 0.0f32;
    edges = edges.max(band(Vec2::new(q.x, q.y).length()));
    edges = edges.max(band(Vec2::new(q.y, q.z).length()));
    edges = edges.max(band(Vec2::new(q.x, q.z).length()));

    vertices.max(edges * 0.7)
}

pub fn hypercube(p: Vec3, scale: f32) -> f32 {
    let q = cell(p, scale).abs();
    1.0 - smoothstep(0.3, 0.5, q.x.max(q.y).max(q.z))
}

pub fn sphere(p: Vec3, scale: f32) -> f32 {
    1.0 - smoothstep(0.2, 0.5, cell(p, scale).length())
}

pub fn torus(p: Vec3, scale: f32) -> f32 {
    let q = cell(p, scale);
    let r1 = (q.x * q.x + q.y * q.y).sqrt();
    let r2 = ((r1 - 0.3) * (r1 - 0.3) + q.z * q.z).sqrt();
    1.0 - smoothstep(0.0, 0.15, r2)
}

/// Klein bottle immersion sampled over the uncentered cell, so `u, v` span a full turn.
pub fn klein_bottle(p: Vec3, scale: f32) -> f32 {
    let q = fract3(p * scale);
    let u = q.x * 2.0 * PI_APPROX;
    let v = q.y * 2.0 * PI_APPROX;
    let x = u.cos() * (3.0 + (u / 2.0).cos() * v.sin() - (u / 2.0).sin() * (2.0 * v).sin());
    let klein = Vec2::new(x, q.z).length() - 0.15;
    1.0 - smoothstep(0.0, 0.1, klein.abs())
}

pub fn fractal(p: Vec3, scale: f32, complexity: u32) -> f32 {
    let mut q = p * scale;
    let mut acc = 0.0f32;
    let mut amplitude = 1.0f32;
    for _ in 0..complexity {
        q = fract3(q) - Vec3::splat(0.5);
        acc += q.length() * amplitude;
        amplitude *= 0.5;
        q *= 2.0;
    }
    1.0 - smoothstep(0.0, 2.0, acc)
}

pub fn wave(p: Vec3, scale: f32, time_ms: f32, base_speed: f32, amplitude: f32) -> f32 {
    let q = p * scale;
    let t = time_ms * base_speed;
    let mut w = (q.x * 3.0 + t * 0.01).sin()
        * (q.y * 3.0 + t * 0.013).sin()
        * (q.z * 3.0 + t * 0.017).sin();
    w += (q.x * 6.0 - t * 0.008).sin() * 0.5;
    w += (q.y * 4.0 + t * 0.011).sin() * 0.3;
    smoothstep(-0.3, 0.3, w * amplitude)
}

pub fn crystal(p: Vec3, scale: f32) -> f32 {
    let q = cell(p, scale);
    let a = q.abs();
    let d = a.x.max(a.y).max(a.z);
    let shell = 1.0 - smoothstep(0.25, 0.45, d);

    let inner = (q * 3.0).abs();
    let inner = inner.x.max(inner.y).max(inner.z);
    let structure = (1.0 - smoothstep(0.8, 1.0, inner)) * 0.3;

    // Shell and core overlap at the cell center; saturate there.
    (shell + structure).min(1.0)
}

/// Orbiting swarm of `2 * complexity` soft points. Driven by raw milliseconds.
pub fn particle(p: Vec3, scale: f32, time_ms: f32, complexity: u32) -> f32 {
    let q = p * scale;
    let mut sum = 0.0f32;
    for i in 0..complexity.saturating_mul(2) {
        let fi = i as f32;
        let pos = Vec3::new(
            (time_ms * 0.01 + fi * 0.5).sin() * 2.0,
            (time_ms * 0.013 + fi * 0.7).cos() * 2.0,
            (time_ms * 0.017 + fi * 0.3).sin() * 2.0,
        );
        let dist = (q - pos).length();
        sum += 1.0 / (1.0 + dist * dist * 10.0);
    }
    (sum * 0.1).min(1.0)
}
