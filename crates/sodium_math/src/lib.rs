// Re-export glam for convenience
pub use glam::*;

// Sodium math types
mod transform;
pub use transform::Mat4Ext;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_creation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_parent_world_inverse_recovers_local() {
        let parent = Mat4::from_location_euler_scale(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.5),
            Vec3::splat(2.0),
        );
        let local = Mat4::from_translation(Vec3::new(0.0, 3.0, 0.0));
        let world = parent * local;

        let recovered = parent.inverse() * world;
        let point = recovered.transform_point3(Vec3::ZERO);
        assert!((point - Vec3::new(0.0, 3.0, 0.0)).length() < 1e-4);
    }
}
