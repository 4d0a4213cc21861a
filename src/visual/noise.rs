use super::{fract, fract2, mix};
use glam::Vec2;

const OCTAVES: usize = 6;

/// Sine-scrambled lattice hash in [0, 1). Good enough for visuals, nothing else.
pub fn hash(p: Vec2) -> f32 {
    fract(p.dot(Vec2::new(127.1, 311.7)).sin() * 43_758.547)
}

/// Value noise: smoothed bilinear blend of the four surrounding lattice hashes.
pub fn value_noise(p: Vec2) -> f32 {
    let i = p.floor();
    let f = fract2(p);
    let u = f * f * (Vec2::splat(3.0) - 2.0 * f);

    let a = hash(i);
    let b = hash(i + Vec2::X);
    let c = hash(i + Vec2::Y);
    let d = hash(i + Vec2::ONE);

    mix(mix(a, b, u.x), mix(c, d, u.x), u.y)
}

/// Six octaves of value noise, frequency doubling and amplitude halving from 0.5.
pub fn fbm(p: Vec2) -> f32 {
    let mut p = p;
    let mut value = 0.0f32;
    let mut amplitude = 0.5f32;
    for _ in 0..OCTAVES {
        value += amplitude * value_noise(p);
        p *= 2.0;
        amplitude *= 0.5;
    }
    value
}
