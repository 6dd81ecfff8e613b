// Transform utilities for Mat4
//
// Extends glam::Mat4 with the location / Euler XYZ / scale basis used by
// scene objects, and the parent-inverse identity check.

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Extension trait for Mat4 to provide object-basis utilities
pub trait Mat4Ext {
    /// Compose a basis matrix from location, Euler XYZ rotation (radians) and scale.
    ///
    /// The X rotation is applied first, then Y, then Z: `R = Rz * Ry * Rx`.
    fn from_location_euler_scale(location: Vec3, rotation: Vec3, scale: Vec3) -> Self;

    /// Decompose into `(location, euler_xyz, scale)`.
    fn to_location_euler_scale(&self) -> (Vec3, Vec3, Vec3);

    /// True when every cell is within `tolerance` of the identity matrix.
    fn is_identity_within(&self, tolerance: f32) -> bool;
}

impl Mat4Ext for Mat4 {
    fn from_location_euler_scale(location: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        let rotation = Quat::from_euler(EulerRot::ZYX, rotation.z, rotation.y, rotation.x);
        Mat4::from_scale_rotation_translation(scale, rotation, location)
    }

    fn to_location_euler_scale(&self) -> (Vec3, Vec3, Vec3) {
        let (scale, rotation, translation) = self.to_scale_rotation_translation();
        let (z, y, x) = rotation.to_euler(EulerRot::ZYX);
        // + 0.0 turns -0.0 into 0.0
        (translation, Vec3::new(x, y, z) + Vec3::ZERO, scale)
    }

    fn is_identity_within(&self, tolerance: f32) -> bool {
        self.to_cols_array()
            .iter()
            .zip(Mat4::IDENTITY.to_cols_array().iter())
            .all(|(cell, expected)| (cell - expected).abs() <= tolerance)
    }
}
