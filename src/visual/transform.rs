//! Screen -> 4D -> 3D mapping.
//!
//! A screen coordinate is lifted into 4D, nudged by audio and interaction
//! signals, rotated through the XW, YW and ZW planes and perspective-projected
//! back to 3D. Constants here are tuned against the field evaluators; changing
//! any of them visibly changes every theme.

use super::fract;
use glam::{Mat4, Vec2, Vec3, Vec4};

const TAU_APPROX: f32 = 6.28318;
const PI_APPROX: f32 = 3.14159;
const PROJECTION_DISTANCE: f32 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationPlane {
    XW,
    YW,
    ZW,
}

pub const ROTATION_ORDER: [RotationPlane; 3] =
    [RotationPlane::XW, RotationPlane::YW, RotationPlane::ZW];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformInputs {
    /// Aspect-corrected screen position, roughly [-1, 1].
    pub screen: Vec2,
    /// Speed-scaled time in seconds.
    pub time: f32,
    pub pointer_offset: Vec2,
    pub bass: f32,
    pub mid: f32,
    pub gyro: Vec3,
    pub scroll_offset: f32,
    pub click_intensity: f32,
    pub morph: f32,
    /// Rotation rates for the XW, YW and ZW planes.
    pub rotation: Vec3,
    pub breathing: bool,
}

pub fn ease_in_out_sine(t: f32) -> f32 {
    -((PI_APPROX * t).cos() - 1.0) / 2.0
}

/// Plane rotation in column-major layout, applied as `m * p`.
pub fn rotation(plane: RotationPlane, theta: f32) -> Mat4 {
    let c = theta.cos();
    let s = theta.sin();
    let cols = match plane {
        RotationPlane::XW => [
            c, 0.0, 0.0, -s, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            s, 0.0, 0.0, c,
        ],
        RotationPlane::YW => [
            1.0, 0.0, 0.0, 0.0, //
            0.0, c, 0.0, -s, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, s, 0.0, c,
        ],
        RotationPlane::ZW => [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, c, -s, //
            0.0, 0.0, s, c,
        ],
    };
    Mat4::from_cols_array(&cols)
}

/// Lift into 4D and apply the additive audio/gyro/scroll modulation.
pub fn embed(inputs: &TransformInputs) -> Vec4 {
    let xy = inputs.screen + inputs.pointer_offset * 0.2;
    let mut p = Vec4::new(
        xy.x,
        xy.y,
        (inputs.time * 0.1 + inputs.morph).sin() * 0.3,
        (inputs.time * 0.08 + inputs.morph * 0.5).cos() * 0.3,
    );

    p.w += inputs.bass * 0.5;
    p.z += inputs.mid * 0.3;
    p.x += inputs.gyro.x * 0.1;
    p.y += inputs.gyro.y * 0.1;
    p.y += inputs.scroll_offset * 0.1;
    p
}

/// Angles for the XW, YW and ZW planes, in that order.
pub fn rotation_angles(inputs: &TransformInputs) -> [f32; 3] {
    let t = inputs.time;
    let eased = ease_in_out_sine(fract(t * 0.1)) * TAU_APPROX;
    [
        t * inputs.rotation.x + inputs.pointer_offset.y + eased,
        t * inputs.rotation.y + inputs.pointer_offset.x,
        t * inputs.rotation.z + inputs.click_intensity * 2.0,
    ]
}

pub fn rotate(p: Vec4, angles: [f32; 3], order: [RotationPlane; 3]) -> Vec4 {
    order.iter().fold(p, |acc, &plane| {
        let theta = match plane {
            RotationPlane::XW => angles[0],
            RotationPlane::YW => angles[1],
            RotationPlane::ZW => angles[2],
        };
        rotation(plane, theta) * acc
    })
}

pub fn project(p: Vec4) -> Vec3 {
    let k = PROJECTION_DISTANCE / (PROJECTION_DISTANCE + p.w);
    Vec3::new(p.x * k, p.y * k, p.z * k)
}

pub fn transform(inputs: &TransformInputs) -> Vec3 {
    transform_with_order(inputs, ROTATION_ORDER)
}

pub fn transform_with_order(inputs: &TransformInputs, order: [RotationPlane; 3]) -> Vec3 {
    let p4 = rotate(embed(inputs), rotation_angles(inputs), order);
    let mut p = project(p4);
    if inputs.breathing {
        p *= (inputs.time * 2.0).sin() * 0.1 + 1.0;
    }
    p
}
