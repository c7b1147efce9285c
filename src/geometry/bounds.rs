use cgmath::Point2;

use crate::{Float, Point2i, Point3f, Ray, INFINITY};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds2i {
    pub min: Point2i,
    pub max: Point2i,
}

impl Bounds2i {
    pub fn with_bounds(min: Point2i, max: Point2i) -> Self {
        Self { min, max }
    }

    pub fn from_resolution(width: u32, height: u32) -> Self {
        Self::with_bounds(Point2::new(0, 0), Point2::new(width as i32, height as i32))
    }

    pub fn width(&self) -> i32 { self.max.x - self.min.x }

    pub fn height(&self) -> i32 { self.max.y - self.min.y }

    pub fn area(&self) -> i32 {
        self.width().max(0) * self.height().max(0)
    }

    pub fn intersection(&self, other: &Self) -> Self {
        Self::with_bounds(
            Point2::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            Point2::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        )
    }

    pub fn contains(&self, p: Point2i) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// Pixels inside the bounds in scanline order.
    pub fn iter_points(self) -> impl Iterator<Item = Point2i> {
        let (min, max) = (self.min, self.max);
        (min.y..max.y).flat_map(move |y| (min.x..max.x).map(move |x| Point2::new(x, y)))
    }

    /// Splits the bounds into `tile_size`-square tiles in scanline order. Tiles on the right and
    /// bottom edges are clipped to the bounds.
    pub fn iter_tiles(self, tile_size: i32) -> impl Iterator<Item = Bounds2i> {
        let n_x = (self.width() + tile_size - 1) / tile_size;
        let n_y = (self.height() + tile_size - 1) / tile_size;
        (0..n_y).flat_map(move |ty| {
            (0..n_x).map(move |tx| {
                let min = Point2::new(self.min.x + tx * tile_size, self.min.y + ty * tile_size);
                let max = Point2::new(
                    (min.x + tile_size).min(self.max.x),
                    (min.y + tile_size).min(self.max.y),
                );
                Bounds2i::with_bounds(min, max)
            })
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds3f {
    pub min: Point3f,
    pub max: Point3f,
}

impl Bounds3f {
    pub fn empty() -> Self {
        Self {
            min: Point3f::new(INFINITY, INFINITY, INFINITY),
            max: Point3f::new(-INFINITY, -INFINITY, -INFINITY),
        }
    }

    pub fn with_bounds(p1: Point3f, p2: Point3f) -> Self {
        Self {
            min: Point3f::new(p1.x.min(p2.x), p1.y.min(p2.y), p1.z.min(p2.z)),
            max: Point3f::new(p1.x.max(p2.x), p1.y.max(p2.y), p1.z.max(p2.z)),
        }
    }

    pub fn union_point(&self, p: Point3f) -> Self {
        Self {
            min: Point3f::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            max: Point3f::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        }
    }

    pub fn union(&self, other: &Self) -> Self {
        self.union_point(other.min).union_point(other.max)
    }

    /// Slab test against the ray's parametric interval.
    pub fn intersect_p(&self, ray: &Ray) -> bool {
        let mut t0 = ray.t_min;
        let mut t1 = ray.t_max;
        for axis in 0..3 {
            let inv_dir = 1.0 / ray.dir[axis];
            let mut t_near = (self.min[axis] - ray.origin[axis]) * inv_dir;
            let mut t_far = (self.max[axis] - ray.origin[axis]) * inv_dir;
            if t_near > t_far {
                std::mem::swap(&mut t_near, &mut t_far);
            }
            // Slightly widen the far plane so grazing and axis-aligned hits are not culled.
            t_far *= 1.0 + 2.0 * gamma3();
            // NaN comparisons fall through, keeping the slab open for zero direction components
            t0 = if t_near > t0 { t_near } else { t0 };
            t1 = if t_far < t1 { t_far } else { t1 };
            if t0 > t1 {
                return false;
            }
        }
        true
    }
}

fn gamma3() -> Float {
    let e = std::f32::EPSILON * 0.5;
    3.0 * e / (1.0 - 3.0 * e)
}
