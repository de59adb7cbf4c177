// Matrix helpers for the PBRT statement language.
//
// glam stores matrices column-major; PBRT documents list 16 numbers that the
// importer treats as a row-major 4x4. These helpers convert at the boundary
// so everything inside the importer is a plain glam::Mat4.

use glam::{Mat4, Vec3};

/// Determinants smaller than this are treated as singular.
pub const SINGULAR_EPSILON: f32 = 1e-12;

/// Extension trait for Mat4 with PBRT-oriented conversions.
pub trait Mat4Ext {
    /// The 16 matrix elements in row-major order.
    fn to_rows_array(&self) -> [f32; 16];

    /// Inverse, or `None` when the matrix is singular.
    fn try_inverse(&self) -> Option<Mat4>;
}

impl Mat4Ext for Mat4 {
    fn to_rows_array(&self) -> [f32; 16] {
        self.transpose().to_cols_array()
    }

    fn try_inverse(&self) -> Option<Mat4> {
        if self.determinant().abs() <= SINGULAR_EPSILON {
            None
        } else {
            Some(self.inverse())
        }
    }
}

/// Build a Mat4 from 16 elements in row-major order.
pub fn mat4_from_rows(values: &[f32; 16]) -> Mat4 {
    Mat4::from_cols_array(values).transpose()
}

/// Rotation about an arbitrary axis, angle in degrees (PBRT `Rotate`).
///
/// Returns `None` when the axis has no usable direction (zero length).
pub fn rotate_degrees(angle: f32, axis: Vec3) -> Option<Mat4> {
    let axis = axis.try_normalize()?;
    Some(Mat4::from_axis_angle(axis, angle.to_radians()))
}

/// World-to-camera matrix for a PBRT `LookAt` statement.
///
/// PBRT builds the camera-to-world frame from eye/look/up and the current
/// transform composes its inverse.
pub fn look_at_world_to_camera(eye: Vec3, look: Vec3, up: Vec3) -> Mat4 {
    let dir = (look - eye).normalize();
    let right = up.normalize().cross(dir).normalize();
    let new_up = dir.cross(right);

    let camera_to_world = Mat4::from_cols(
        right.extend(0.0),
        new_up.extend(0.0),
        dir.extend(0.0),
        eye.extend(1.0),
    );
    camera_to_world.inverse()
}
