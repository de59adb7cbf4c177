// Re-export glam for convenience
pub use glam::*;

// Opal math helpers
mod matrix;
pub use matrix::*;

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
    fn test_mat4_identity_compose() {
        let m = Mat4::IDENTITY * Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let p = m.transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(1.0, 0.0, 0.0));
    }
}
