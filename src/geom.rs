//! Rotation helpers about the vertical axis.
//!
//! All boxes stand upright, so every transform in the crate is a translation
//! plus a yaw about +y acting on the (x, z) ground plane coordinates.

use nalgebra::{Point3, Vector3};


/// Rotate a point about the vertical axis by `angle` radians:
/// `x' = x cos - z sin`, `z' = x sin + z cos`.
pub fn rotate_y(point: &Point3<f64>, angle: f64) -> Point3<f64> {
    let (sin, cos) = angle.sin_cos();
    Point3::new(
        point.x * cos - point.z * sin,
        point.y,
        point.x * sin + point.z * cos,
    )
}

/// Rotate all points about the vertical axis.
pub fn rotate_pts(points: &[Point3<f64>], angle: f64) -> Vec<Point3<f64>> {
    points.iter().map(|p| rotate_y(p, angle)).collect()
}

/// Rotate a ground plane offset (x, z) by `angle` radians.
pub fn rotate_xz(x: f64, z: f64, angle: f64) -> (f64, f64) {
    let (sin, cos) = angle.sin_cos();
    (x * cos - z * sin, x * sin + z * cos)
}

/// Unit vector in the same direction, or zero for a zero-length vector.
pub fn normalized_or_zero(v: &Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
}
