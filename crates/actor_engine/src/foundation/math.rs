//! Math utilities and types
//!
//! The engine simulates a 2D world, so everything is expressed with
//! `nalgebra` 2-vectors in `f32`.

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f32>;

/// Out-of-range vector reported where a contact carries no geometry
/// (trigger contacts and collision exits).
pub const NO_CONTACT_GEOMETRY: f32 = -999.0;

/// The sentinel vector `(-999, -999)` used for absent contact point/normal
pub fn sentinel() -> Vec2 {
    Vec2::new(NO_CONTACT_GEOMETRY, NO_CONTACT_GEOMETRY)
}

/// Convert degrees to radians
pub fn to_radians(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

/// Convert radians to degrees
pub fn to_degrees(radians: f32) -> f32 {
    radians * 180.0 / std::f32::consts::PI
}

/// Rotate a vector by `angle` radians
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y)
}

/// 2D cross product (z component of the 3D cross product)
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Normalize a vector, returning zero for degenerate input
pub fn normalize_or_zero(v: Vec2) -> Vec2 {
    let length = v.norm();
    if length > f32::EPSILON {
        v / length
    } else {
        Vec2::zeros()
    }
}
