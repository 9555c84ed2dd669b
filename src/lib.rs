//! Geom Clone - simulation core of a top-down arcade shooter
//!
//! Core modules:
//! - `sim`: Entity simulation (steering, actor state machines, collisions, entity lifecycle)
//! - `renderer`: Draw-command seam consumed by an external renderer
//! - `content`: Sprite alpha masks used by the pixel collision test
//! - `tuning`: Data-driven game balance
//! - `error`: Error types

pub mod content;
pub mod error;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use content::{AlphaMask, Content};
pub use error::SimError;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless runner (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// All sprites are authored for a 1600x1200 screen; physics runs in these pixels
    pub const REFERENCE_WIDTH: f32 = 1600.0;
    pub const REFERENCE_HEIGHT: f32 = 1200.0;

    /// Global speed scale applied to every actor's velocity and max speed
    pub const GAME_SPEED: f32 = 0.9;

    /// Born states last this long before the actor becomes active
    pub const BORN_TIMEOUT: f32 = 1.5;
    /// Dead enemies are removed this long after dying
    pub const DEAD_TIMEOUT: f32 = 1.5;
    /// Delay between the player's death and the respawn
    pub const RESPAWN_DELAY: f32 = 1.5;

    /// Playfield limits for clamped actors (normalized coordinates)
    pub const MIN_X: f32 = 0.01;
    pub const MAX_X: f32 = 0.99;
    pub const MIN_Y: f32 = 0.013;
    pub const MAX_Y: f32 = 0.987;
}

/// Perpendicular of `v` (rotated +90 degrees)
#[inline]
pub fn perpendicular(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Rotate `v` by `degrees`
#[inline]
pub fn rotate_degrees(v: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(v)
}

/// Map a point in an agent's local space (x along heading, y along side) to world space
#[inline]
pub fn point_to_world_space(point: Vec2, heading: Vec2, side: Vec2, position: Vec2) -> Vec2 {
    position + heading * point.x + side * point.y
}

/// Normalized screen coordinates (0..1) to reference pixels
#[inline]
pub fn to_world(normalized: Vec2) -> Vec2 {
    normalized * Vec2::new(consts::REFERENCE_WIDTH, consts::REFERENCE_HEIGHT)
}

/// Reference pixels to normalized screen coordinates
#[inline]
pub fn to_normalized(world: Vec2) -> Vec2 {
    world / Vec2::new(consts::REFERENCE_WIDTH, consts::REFERENCE_HEIGHT)
}

/// Random unit vector
pub fn random_direction<R: rand::Rng + ?Sized>(rng: &mut R) -> Vec2 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    Vec2::from_angle(angle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perpendicular_is_orthogonal() {
        let v = Vec2::new(3.0, -2.0);
        assert!(perpendicular(v).dot(v).abs() < 1e-6);
        assert_eq!(perpendicular(Vec2::X), Vec2::Y);
    }

    #[test]
    fn test_rotate_degrees() {
        let r = rotate_degrees(Vec2::X, 90.0);
        assert!((r - Vec2::Y).length() < 1e-5);
    }

    #[test]
    fn test_point_to_world_space() {
        let p = point_to_world_space(Vec2::new(10.0, 2.0), Vec2::Y, perpendicular(Vec2::Y), Vec2::new(5.0, 5.0));
        assert!((p - Vec2::new(3.0, 15.0)).length() < 1e-5);
    }

    #[test]
    fn test_world_round_trip() {
        let n = Vec2::new(0.25, 0.75);
        assert!((to_normalized(to_world(n)) - n).length() < 1e-6);
        assert_eq!(to_world(Vec2::ONE), Vec2::new(1600.0, 1200.0));
    }
}
