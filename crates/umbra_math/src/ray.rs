use crate::Vec3;

/// A ray in 3D space with origin, direction, and time.
///
/// The ray describes the line `origin + t * direction`. The `time` field is
/// the shutter instant the ray was sampled at, used by moving geometry.
/// Rays are built once per sample and never mutated afterwards.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Direction vector (not necessarily normalized)
    pub direction: Vec3,
    pub time: f32,
}

impl Ray {
    /// Create a new ray.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3, time: f32) -> Self {
        Self {
            origin,
            direction,
            time,
        }
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Point along the ray at parameter t.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// True when origin and direction are finite and the direction is non-zero.
    ///
    /// Rays failing this check cannot produce meaningful intersections.
    pub fn is_well_formed(&self) -> bool {
        self.origin.is_finite()
            && self.direction.is_finite()
            && self.direction.length_squared() > 0.0
    }
}
