use crate::{Interval, Ray, Vec3};

/// Axes thinner than this are padded so no box has zero thickness.
const MIN_AXIS_SIZE: f32 = 0.0001;

/// Axis-Aligned Bounding Box for the BVH.
///
/// Stored as one interval per axis. Boxes built through `new` or
/// `from_points` always satisfy `min <= max` on every axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB from two opposite corners, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let x = Interval::new(a.x.min(b.x), a.x.max(b.x));
        let y = Interval::new(a.y.min(b.y), a.y.max(b.y));
        let z = Interval::new(a.z.min(b.z), a.z.max(b.z));

        Self::new(x, y, z)
    }

    /// Create an AABB that encloses two other AABBs.
    ///
    /// Lower corner is the per-axis minimum of the minima, upper corner the
    /// per-axis maximum of the maxima.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Lower corner.
    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    /// Upper corner.
    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Slab test: does the ray pass through the box within `ray_t`?
    ///
    /// A zero direction component yields an infinite inverse; the resulting
    /// infinite slab bounds are valid and need no special casing.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let inv_d = 1.0 / r.direction[axis];
            let origin = r.origin[axis];

            let mut t0 = (slab.min - origin) * inv_d;
            let mut t1 = (slab.max - origin) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            ray_t = ray_t.intersect(&Interval::new(t0, t1));
            if ray_t.max <= ray_t.min {
                return false;
            }
        }

        true
    }

    /// Translate the AABB by an offset vector.
    pub fn translate(&self, offset: Vec3) -> Aabb {
        Aabb::new(
            self.x.add_scalar(offset.x),
            self.y.add_scalar(offset.y),
            self.z.add_scalar(offset.z),
        )
    }

    fn pad_to_minimums(&mut self) {
        if self.x.size() < MIN_AXIS_SIZE {
            self.x = self.x.expand(MIN_AXIS_SIZE);
        }
        if self.y.size() < MIN_AXIS_SIZE {
            self.y = self.y.expand(MIN_AXIS_SIZE);
        }
        if self.z.size() < MIN_AXIS_SIZE {
            self.z = self.z.expand(MIN_AXIS_SIZE);
        }
    }
}
