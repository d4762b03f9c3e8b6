//! Math type aliases and helper functions.
//!
//! All rendering math is `f32` and column-major, matching GLSL's memory
//! layout for `vec`/`mat` types.

pub use nalgebra;

/// 2D vector (f32).
pub type Vec2 = nalgebra::Vector2<f32>;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4D vector (f32).
pub type Vec4 = nalgebra::Vector4<f32>;

/// 2x2 matrix (f32).
pub type Mat2 = nalgebra::Matrix2<f32>;

/// 3x3 matrix (f32).
pub type Mat3 = nalgebra::Matrix3<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Build a right-handed perspective projection with OpenGL clip depth [-1, 1].
pub fn perspective_gl(yfov: f32, aspect: f32, znear: f32, zfar: f32) -> Mat4 {
    Mat4::new_perspective(aspect, yfov, znear, zfar)
}

/// Right-handed look-at view matrix.
pub fn look_at_rh(eye: &Vec3, target: &Vec3, up: &Vec3) -> Mat4 {
    let eye_point = nalgebra::Point3::from(*eye);
    let target_point = nalgebra::Point3::from(*target);
    nalgebra::Isometry3::look_at_rh(&eye_point, &target_point, up).to_homogeneous()
}

/// Model matrix rotated about X, then about Y (angles in degrees).
///
/// Equivalent to `Rx * Ry`: a vertex is first rotated around Y, then around X.
pub fn model_rotation(angle_x_deg: f32, angle_y_deg: f32) -> Mat4 {
    let rx = Mat4::from_axis_angle(&Vec3::x_axis(), angle_x_deg.to_radians());
    let ry = Mat4::from_axis_angle(&Vec3::y_axis(), angle_y_deg.to_radians());
    rx * ry
}

/// Rotation around the Z axis (angle in degrees) as a 4x4 matrix.
pub fn rotation_z(angle_deg: f32) -> Mat4 {
    Mat4::from_axis_angle(&Vec3::z_axis(), angle_deg.to_radians())
}

/// Normal matrix for a model-view matrix.
///
/// This is the inverse-transpose of the upper-left 3x3 block, which keeps
/// normals perpendicular to surfaces under non-uniform scale. Returns `None`
/// when that block is singular.
pub fn normal_matrix(model_view: &Mat4) -> Option<Mat3> {
    let upper: Mat3 = model_view.fixed_view::<3, 3>(0, 0).into_owned();
    upper.try_inverse().map(|inv| inv.transpose())
}

/// Convert a 4x4 matrix to a column-major `[[f32; 4]; 4]` array.
pub fn mat4_to_cols_array_2d(m: &Mat4) -> [[f32; 4]; 4] {
    let s = m.as_slice();
    [
        [s[0], s[1], s[2], s[3]],
        [s[4], s[5], s[6], s[7]],
        [s[8], s[9], s[10], s[11]],
        [s[12], s[13], s[14], s[15]],
    ]
}

/// Convert a 3x3 matrix to std140 columns (each column padded to a vec4).
pub fn mat3_to_std140_cols(m: &Mat3) -> [[f32; 4]; 3] {
    let s = m.as_slice();
    [
        [s[0], s[1], s[2], 0.0],
        [s[3], s[4], s[5], 0.0],
        [s[6], s[7], s[8], 0.0],
    ]
}
