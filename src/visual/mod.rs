mod compositor;
mod field;
mod noise;
mod transform;

use glam::{Vec2, Vec3};

pub use compositor::{hsl_to_rgb, FrameProgram, Sample, Uniforms};
pub use field::{FieldContext, Geometry};
pub use noise::{fbm, hash, value_noise};
pub use transform::{
    ease_in_out_sine, embed, project, rotate, rotation, rotation_angles, transform,
    transform_with_order, RotationPlane, TransformInputs, ROTATION_ORDER,
};

/// Field evaluators, exposed one function per shape.
pub mod fields {
    pub use super::field::{
        crystal, fractal, hypercube, klein_bottle, particle, sphere, tetrahedron, torus, wave,
    };
}

/// GLSL `fract`: `x - floor(x)`, in [0, 1]. Rounding gives exactly 1.0 for
/// tiny negative inputs, so callers must not assume the upper bound is open.
#[inline]
pub(crate) fn fract(x: f32) -> f32 {
    x - x.floor()
}

#[inline]
pub(crate) fn fract3(v: Vec3) -> Vec3 {
    v - v.floor()
}

#[inline]
pub(crate) fn fract2(v: Vec2) -> Vec2 {
    v - v.floor()
}

/// Hermite step between two edges, clamped outside them.
#[inline]
pub(crate) fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
pub(crate) fn mix(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

#[inline]
pub(crate) fn mix3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a * (1.0 - t) + b * t
}

/// GLSL `mod`: result takes the sign of `y`.
#[inline]
pub(crate) fn glsl_mod(x: f32, y: f32) -> f32 {
    x - y * (x / y).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fract_can_round_up_to_one() {
        assert_eq!(fract(2.25), 0.25);
        assert_eq!(fract(-0.25), 0.75);
        assert_eq!(fract(-1e-9), 1.0);
        for x in [-1e-9f32, -3.5, 0.0, 7.999_999, -1e30] {
            assert!((0.0..=1.0).contains(&fract(x)), "fract({x})");
        }
    }

    #[test]
    fn glsl_mod_follows_divisor_sign() {
        assert!((glsl_mod(-1.0, 3.0) - 2.0).abs() < 1e-6);
        assert!((glsl_mod(1.0, -3.0) + 2.0).abs() < 1e-6);
    }
}
