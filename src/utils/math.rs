//! Small math helpers layered on top of `glam`.

use glam::{Mat3, Quat, Vec3};

/// Converts an angular velocity (radians/sec) into the quaternion delta it
/// produces over `dt`.
pub fn angular_velocity_to_quat(angular: Vec3, dt: f32) -> Quat {
    let angle = angular.length() * dt;
    if angle.abs() < 1e-6 {
        return Quat::IDENTITY;
    }
    let axis = angular / (angle / dt);
    Quat::from_axis_angle(axis, angle)
}

/// Skew-symmetric cross-product matrix: `skew(a) * b == a.cross(b)`.
pub fn skew(v: Vec3) -> Mat3 {
    Mat3::from_cols(
        Vec3::new(0.0, v.z, -v.y),
        Vec3::new(-v.z, 0.0, v.x),
        Vec3::new(v.y, -v.x, 0.0),
    )
}
