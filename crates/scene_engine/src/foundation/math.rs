//! Math utilities and types
//!
//! Provides the 2D vector type used for positions and headings, and the
//! angle helpers behind the turn-towards behaviour of entities.

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = std::f32::consts::TAU;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Pi / 4
    pub const QUARTER_PI: f32 = PI * 0.25;
}

/// Math utility functions
pub mod utils {
    use super::constants::{PI, TAU};
    use super::Vec2;

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Re-map `value` from `[in_min, in_max]` onto `[out_min, out_max]`
    ///
    /// A degenerate input range maps everything to `out_min`.
    pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
        let span = in_max - in_min;
        if span.abs() <= f32::EPSILON {
            return out_min;
        }
        lerp(out_min, out_max, (value - in_min) / span)
    }

    /// Like [`map_range`], but the result is clamped to the output range
    ///
    /// Works for descending output ranges too.
    pub fn map_range_clamped(
        value: f32,
        in_min: f32,
        in_max: f32,
        out_min: f32,
        out_max: f32,
    ) -> f32 {
        let mapped = map_range(value, in_min, in_max, out_min, out_max);
        let (low, high) = if out_min <= out_max {
            (out_min, out_max)
        } else {
            (out_max, out_min)
        };
        mapped.clamp(low, high)
    }

    /// Wrap an angle into `(-PI, PI]`
    ///
    /// An angle exactly opposite the reference resolves to `+PI`.
    pub fn normalize_angle(angle: f32) -> f32 {
        let wrapped = angle.rem_euclid(TAU);
        let normalized = if wrapped > PI { wrapped - TAU } else { wrapped };
        // rem_euclid can land a hair past -PI after the subtraction
        if normalized <= -PI {
            PI
        } else {
            normalized
        }
    }

    /// Bearing from `from` to `to` in radians (`atan2`, x axis = 0)
    pub fn angle_between(from: &Vec2, to: &Vec2) -> f32 {
        (to.y - from.y).atan2(to.x - from.x)
    }

    /// Squared euclidean distance
    pub fn dist_sq(a: &Vec2, b: &Vec2) -> f32 {
        (b - a).norm_squared()
    }

    /// Unit vector pointing along `angle`
    pub fn from_angle(angle: f32) -> Vec2 {
        Vec2::new(angle.cos(), angle.sin())
    }
}
