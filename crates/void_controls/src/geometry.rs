//! Horizontal-plane geometry and heading helpers
//!
//! Navigation ignores the vertical axis: distances and directions are taken
//! on the XZ plane. The actor looks down -Z when its heading yaw is zero.

use glam::{EulerRot, Quat, Vec3};

/// Forward direction of an unrotated actor
pub const FORWARD: Vec3 = Vec3::NEG_Z;

/// Drop the vertical component
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Distance between two points on the XZ plane
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    flatten(b - a).length()
}

/// Unit vector from `from` towards `to` on the XZ plane, `None` when the
/// points coincide horizontally
pub fn horizontal_direction(from: Vec3, to: Vec3) -> Option<Vec3> {
    let delta = flatten(to - from);
    let length = delta.length();
    if length > f32::EPSILON {
        Some(delta / length)
    } else {
        None
    }
}

/// Heading yaw (radians around +Y) that turns [`FORWARD`] onto `direction`
#[inline]
pub fn heading_yaw(direction: Vec3) -> f32 {
    (-direction.x).atan2(-direction.z)
}

/// Orientation facing a horizontal direction
#[inline]
pub fn facing(direction: Vec3) -> Quat {
    Quat::from_rotation_y(heading_yaw(direction))
}

/// Yaw component of an orientation (YXZ order, as used by the camera)
#[inline]
pub fn yaw_of(orientation: Quat) -> f32 {
    orientation.to_euler(EulerRot::YXZ).0
}

/// Point on a circle of `radius` around `center`, at `angle` from +X
#[inline]
pub fn point_on_circle(center: Vec3, angle: f32, radius: f32) -> Vec3 {
    Vec3::new(
        center.x + angle.cos() * radius,
        center.y,
        center.z + angle.sin() * radius,
    )
}
