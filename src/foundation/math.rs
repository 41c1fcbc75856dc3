//! Math types for the scene graph.
//!
//! Thin aliases over nalgebra plus the handful of helpers the transform
//! hierarchy needs. Coordinates are Y-up right-handed: right = +X, up = +Y,
//! forward = +Z.

pub use nalgebra::{Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Unit quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Math constants
pub mod constants {
    pub use std::f32::consts::PI;

    /// Tolerance below which a vector is considered degenerate
    pub const DEGENERATE_EPSILON: f32 = 1.0e-6;
}

/// The world right axis (+X).
pub fn world_right() -> Vec3 {
    Vec3::x()
}

/// The world up axis (+Y).
pub fn world_up() -> Vec3 {
    Vec3::y()
}

/// The world forward axis (+Z).
pub fn world_forward() -> Vec3 {
    Vec3::z()
}

/// Build a rotation of `theta` radians about `axis`.
///
/// The axis does not need to be pre-normalized. A degenerate (near-zero)
/// axis yields the identity rotation rather than an error; a zeroed axis is
/// a common transient state and not a caller bug.
pub fn axis_angle(axis: Vec3, theta: f32) -> Quat {
    match Unit::try_new(axis, constants::DEGENERATE_EPSILON) {
        Some(unit_axis) => Quat::from_axis_angle(&unit_axis, theta),
        None => Quat::identity(),
    }
}

/// Normalize `v` in place and return its length before normalization.
///
/// A zero-length vector is left unchanged and 0 is returned. This is the
/// documented degenerate case, not an error.
pub fn normalize_or_zero(v: &mut Vec3) -> f32 {
    let length = v.norm();
    if length > 0.0 {
        *v /= length;
    }
    length
}
