use cgmath::InnerSpace;

use crate::error::RenderError;
use crate::shapes::SurfacePoint;
use crate::spectrum::Spectrum;
use crate::{Float, Point2f, Point3f, Vec3f};

pub mod diffuse;
pub mod infinite;

pub use diffuse::DiffuseAreaLight;
pub use infinite::UniformEnvironment;

/// The closed set of emitters.
pub enum Luminaire {
    Area(DiffuseAreaLight),
    Environment(UniformEnvironment),
}

impl Luminaire {
    pub fn is_environment(&self) -> bool {
        match self {
            Luminaire::Environment(_) => true,
            Luminaire::Area(_) => false,
        }
    }

    pub fn radiance(&self) -> Spectrum {
        match self {
            Luminaire::Area(l) => l.radiance,
            Luminaire::Environment(l) => l.radiance,
        }
    }

    /// Uniform-area sample of the emitting surface. Environments have no surface to sample.
    pub fn sample_surface_point(&self, u: Point2f) -> Option<SurfacePoint> {
        match self {
            Luminaire::Area(l) => Some(l.shape.sample(u)),
            Luminaire::Environment(_) => None,
        }
    }

    /// Area density of `sample_surface_point`.
    pub fn area_pdf(&self) -> Float {
        match self {
            Luminaire::Area(l) => l.shape.pdf(),
            Luminaire::Environment(_) => 0.0,
        }
    }

    /// Radiance leaving a point with normal `n` in direction `w`.
    pub fn emitted_radiance(&self, n: Vec3f, w: Vec3f) -> Spectrum {
        match self {
            Luminaire::Area(l) => l.emitted_radiance(n, w),
            Luminaire::Environment(l) => l.radiance,
        }
    }
}

/// Fails unless every luminaire in the list can be position-sampled and there is at least one.
pub fn check_sampleable(luminaires: &[Luminaire]) -> Result<(), RenderError> {
    if luminaires.is_empty() {
        return Err(RenderError::NoLuminaires);
    }
    match luminaires.iter().position(Luminaire::is_environment) {
        Some(index) => Err(RenderError::UnsupportedLuminaire { index }),
        None => Ok(()),
    }
}

/// A point chosen on one of the scene's luminaires.
#[derive(Clone, Copy)]
pub struct LightPoint<'s> {
    pub index: usize,
    pub luminaire: &'s Luminaire,
    pub p: Point3f,
    pub n: Vec3f,
    /// Area density of the point, including the `1/N` luminaire selection probability.
    pub pdf: Float,
}

/// Picks a luminaire uniformly with the first coordinate of `u`, then reuses the remainder of
/// that coordinate together with the second one to sample a point on it.
pub fn sample_light_point(luminaires: &[Luminaire], u: Point2f) -> Option<LightPoint<'_>> {
    if luminaires.is_empty() {
        return None;
    }
    let n = luminaires.len();
    let scaled = u.x * n as Float;
    let index = (scaled as usize).min(n - 1);
    let u_reused = Point2f::new((scaled - index as Float).max(0.0).min(crate::ONE_MINUS_EPSILON), u.y);

    let luminaire = &luminaires[index];
    let point = luminaire.sample_surface_point(u_reused)?;
    Some(LightPoint {
        index,
        luminaire,
        p: point.p,
        n: point.n,
        pdf: luminaire.area_pdf() / n as Float,
    })
}

/// Area density with which `sample_light_point` produces a point on luminaire `index`.
pub fn light_point_pdf(luminaires: &[Luminaire], index: usize) -> Float {
    luminaires[index].area_pdf() / luminaires.len() as Float
}

/// A luminaire point sampled as seen from a reference point.
#[derive(Clone, Copy, Debug)]
pub struct LuminaireQuery {
    pub luminaire: usize,
    pub reference: Point3f,
    pub p: Point3f,
    pub n: Vec3f,
    /// Unit direction from `reference` to `p`
    pub d: Vec3f,
    pub dist: Float,
    /// Solid-angle density at `reference`, including luminaire selection.
    pub pdf: Float,
}

impl LuminaireQuery {
    /// Samples a luminaire point for next-event estimation. Returns the record and the
    /// unoccluded emitted radiance divided by the solid-angle density; `None` when the sampled
    /// point faces away from `reference`.
    pub fn sample(luminaires: &[Luminaire], reference: Point3f, u: Point2f) -> Option<(Self, Spectrum)> {
        let lp = sample_light_point(luminaires, u)?;
        let offset = lp.p - reference;
        let dist2 = offset.magnitude2();
        if dist2 == 0.0 {
            return None;
        }
        let dist = dist2.sqrt();
        let d = offset / dist;
        let dp = -lp.n.dot(d);
        if dp <= 0.0 || lp.pdf == 0.0 {
            return None;
        }

        let pdf = lp.pdf * dist2 / dp;
        let query = Self { luminaire: lp.index, reference, p: lp.p, n: lp.n, d, dist, pdf };
        Some((query, lp.luminaire.emitted_radiance(lp.n, -d) / pdf))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shapes::{Sphere, TriangleMesh};
    use approx::assert_abs_diff_eq;
    use std::sync::Arc;

    fn two_quads() -> Vec<Luminaire> {
        vec![
            Luminaire::Area(DiffuseAreaLight::new(
                Arc::new(TriangleMesh::quad(point3f!(0, 2, 0), vec3f!(1, 0, 0), vec3f!(0, 0, 1))),
                Spectrum::uniform(1.0),
            )),
            Luminaire::Area(DiffuseAreaLight::new(
                Arc::new(Sphere::new(point3f!(5, 5, 5), 0.5)),
                Spectrum::uniform(2.0),
            )),
        ]
    }

    #[test]
    fn selection_reuses_residual() {
        let lums = two_quads();
        // first half of u.x picks the quad, and its residual spans the whole quad
        let a = sample_light_point(&lums, point2f!(0.0, 0.5)).unwrap();
        let b = sample_light_point(&lums, point2f!(0.4999, 0.5)).unwrap();
        assert_eq!(a.index, 0);
        assert_eq!(b.index, 0);
        assert!((a.p - b.p).magnitude() > 0.5);
        let c = sample_light_point(&lums, point2f!(0.75, 0.5)).unwrap();
        assert_eq!(c.index, 1);
        assert_abs_diff_eq!(c.pdf, 1.0 / (4.0 * crate::consts::PI * 0.25) / 2.0, epsilon = 1e-5);
    }

    #[test]
    fn empty_list_is_a_configuration_error() {
        assert!(sample_light_point(&[], point2f!(0.5, 0.5)).is_none());
        assert_eq!(check_sampleable(&[]), Err(RenderError::NoLuminaires));
        let env = vec![Luminaire::Environment(UniformEnvironment { radiance: Spectrum::uniform(1.0) })];
        assert_eq!(check_sampleable(&env), Err(RenderError::UnsupportedLuminaire { index: 0 }));
    }

    #[test]
    fn query_solid_angle_density() {
        // x cross z is -y, so the quad faces the origin below it
        let lums = vec![Luminaire::Area(DiffuseAreaLight::new(
            Arc::new(TriangleMesh::quad(point3f!(-0.5, 2, -0.5), vec3f!(1, 0, 0), vec3f!(0, 0, 1))),
            Spectrum::uniform(3.0),
        ))];
        let (q, weight) = LuminaireQuery::sample(&lums, point3f!(0, 0, 0), point2f!(0.5, 0.5)).unwrap();
        let cos_light = -q.n.dot(q.d);
        assert_abs_diff_eq!(q.pdf, q.dist * q.dist / cos_light, epsilon = 1e-4);
        assert_abs_diff_eq!(weight[0], 3.0 / q.pdf, epsilon = 1e-4);
    }
}
