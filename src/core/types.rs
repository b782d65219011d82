//! Core type aliases and coordinate helpers

pub use glam::{IVec3, UVec3};

/// Standard Result type for the simulator
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;

/// Gravitational acceleration in m/s²
pub const GRAVITY: f64 = 9.81;

/// Euclidean distance between two points in a plane
pub fn distance_2d(x1: u32, y1: u32, x2: u32, y2: u32) -> f64 {
    let dx = x1 as f64 - x2 as f64;
    let dy = y1 as f64 - y2 as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Euclidean distance between two atom coordinates
pub fn distance_3d(a: UVec3, b: UVec3) -> f64 {
    let d = a.as_dvec3() - b.as_dvec3();
    d.length()
}

/// True if the coordinates are equal or touch (26-neighborhood)
pub fn coords_adjacent(a: UVec3, b: UVec3) -> bool {
    let d = a.as_ivec3() - b.as_ivec3();
    d.x.abs() <= 1 && d.y.abs() <= 1 && d.z.abs() <= 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distances() {
        assert_eq!(distance_2d(0, 0, 3, 4), 5.0);
        assert_eq!(distance_2d(3, 4, 0, 0), 5.0);
        assert_eq!(distance_3d(UVec3::new(1, 1, 1), UVec3::new(1, 1, 1)), 0.0);
        assert!((distance_3d(UVec3::ZERO, UVec3::ONE) - 3f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_adjacency() {
        let c = UVec3::new(5, 5, 5);
        assert!(coords_adjacent(c, c));
        assert!(coords_adjacent(c, UVec3::new(4, 6, 5)));
        assert!(coords_adjacent(c, UVec3::new(6, 6, 6)));
        assert!(!coords_adjacent(c, UVec3::new(7, 5, 5)));
        assert!(!coords_adjacent(UVec3::ZERO, UVec3::new(0, 0, 2)));
    }
}
