use cgmath::{EuclideanSpace, InnerSpace};

use crate::geometry::bounds::Bounds3f;
use crate::interaction::ShapeHit;
use crate::sampling::{uniform_sample_triangle, DiscretePdf};
use crate::shapes::{Shape, SurfacePoint};
use crate::{Float, Point2f, Point3f, Ray, Vec3f};

/// Indexed triangle mesh with optional per-vertex normals.
///
/// Area sampling first picks a triangle in proportion to its area, then reuses the
/// remainder of the first sample coordinate to place the point inside it.
pub struct TriangleMesh {
    vertices: Vec<Point3f>,
    indices: Vec<[u32; 3]>,
    normals: Option<Vec<Vec3f>>,
    area_distribution: DiscretePdf,
    bounds: Bounds3f,
}

impl TriangleMesh {
    pub fn new(vertices: Vec<Point3f>, indices: Vec<[u32; 3]>, normals: Option<Vec<Vec3f>>) -> Self {
        if let Some(ref normals) = normals {
            assert_eq!(normals.len(), vertices.len());
        }

        let mut area_distribution = DiscretePdf::with_capacity(indices.len());
        for tri in &indices {
            let [p0, p1, p2] = Self::corners(&vertices, tri);
            area_distribution.append(0.5 * (p1 - p0).cross(p2 - p0).magnitude());
        }
        area_distribution.normalize();

        let bounds = vertices.iter().fold(Bounds3f::empty(), |b, &p| b.union_point(p));

        Self { vertices, indices, normals, area_distribution, bounds }
    }

    /// Parallelogram spanned by two edges from `corner`, facing along `edge_u × edge_v`.
    pub fn quad(corner: Point3f, edge_u: Vec3f, edge_v: Vec3f) -> Self {
        let vertices = vec![corner, corner + edge_u, corner + edge_u + edge_v, corner + edge_v];
        Self::new(vertices, vec![[0, 1, 2], [0, 2, 3]], None)
    }

    pub fn n_triangles(&self) -> usize {
        self.indices.len()
    }

    fn corners(vertices: &[Point3f], tri: &[u32; 3]) -> [Point3f; 3] {
        [vertices[tri[0] as usize], vertices[tri[1] as usize], vertices[tri[2] as usize]]
    }

    fn geometric_normal(&self, tri: &[u32; 3]) -> Vec3f {
        let [p0, p1, p2] = Self::corners(&self.vertices, tri);
        (p1 - p0).cross(p2 - p0).normalize()
    }

    fn shading_normal(&self, tri: &[u32; 3], b: [Float; 3], ng: Vec3f) -> Vec3f {
        match self.normals {
            Some(ref normals) => {
                let ns = normals[tri[0] as usize] * b[0]
                    + normals[tri[1] as usize] * b[1]
                    + normals[tri[2] as usize] * b[2];
                if ns.magnitude2() > 0.0 { ns.normalize() } else { ng }
            }
            None => ng,
        }
    }

    /// Möller–Trumbore; returns `(t, b1, b2)` for a hit inside the ray interval.
    fn intersect_triangle(&self, ray: &Ray, tri: &[u32; 3]) -> Option<(Float, Float, Float)> {
        let [p0, p1, p2] = Self::corners(&self.vertices, tri);
        let e1 = p1 - p0;
        let e2 = p2 - p0;
        let pvec = ray.dir.cross(e2);
        let det = e1.dot(pvec);
        if det.abs() < 1.0e-12 {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.origin - p0;
        let b1 = tvec.dot(pvec) * inv_det;
        if b1 < 0.0 || b1 > 1.0 {
            return None;
        }

        let qvec = tvec.cross(e1);
        let b2 = ray.dir.dot(qvec) * inv_det;
        if b2 < 0.0 || b1 + b2 > 1.0 {
            return None;
        }

        let t = e2.dot(qvec) * inv_det;
        if ray.contains(t) { Some((t, b1, b2)) } else { None }
    }
}

impl Shape for TriangleMesh {
    fn world_bound(&self) -> Bounds3f {
        self.bounds
    }

    fn intersect(&self, ray: &Ray) -> Option<ShapeHit> {
        if !self.bounds.intersect_p(ray) {
            return None;
        }

        let mut closest: Option<(Float, Float, Float, usize)> = None;
        let mut ray = *ray;
        for (i, tri) in self.indices.iter().enumerate() {
            if let Some((t, b1, b2)) = self.intersect_triangle(&ray, tri) {
                closest = Some((t, b1, b2, i));
                ray = ray.clipped(t);
            }
        }

        let (t, b1, b2, i) = closest?;
        let tri = &self.indices[i];
        let n = self.geometric_normal(tri);
        Some(ShapeHit {
            t,
            p: ray.at(t),
            n,
            shading_n: self.shading_normal(tri, [1.0 - b1 - b2, b1, b2], n),
        })
    }

    fn intersect_test(&self, ray: &Ray) -> bool {
        self.bounds.intersect_p(ray)
            && self.indices.iter().any(|tri| self.intersect_triangle(ray, tri).is_some())
    }

    fn area(&self) -> Float {
        self.area_distribution.sum()
    }

    fn sample(&self, u: Point2f) -> SurfacePoint {
        let (index, u_reused) = self.area_distribution.sample_reuse(u.x);
        let tri = &self.indices[index];
        let [p0, p1, p2] = Self::corners(&self.vertices, tri);
        let (b0, b1) = uniform_sample_triangle(Point2f::new(u_reused, u.y));
        let p = Point3f::from_vec(p0.to_vec() * b0 + p1.to_vec() * b1 + p2.to_vec() * (1.0 - b0 - b1));
        SurfacePoint { p, n: self.geometric_normal(tri) }
    }
}
