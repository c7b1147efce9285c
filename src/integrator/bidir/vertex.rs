use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;
use cgmath::InnerSpace;

use crate::geometry::Frame;
use crate::integrator::{BidirConfig, RelativeIor};
use crate::interaction::SurfaceInteraction;
use crate::light::{sample_light_point, LightPoint, Luminaire};
use crate::reflection::bsdf::Bsdf;
use crate::reflection::TransportMode;
use crate::sampler::Sampler;
use crate::sampling::{uniform_hemisphere_pdf, uniform_sample_hemisphere};
use crate::scene::Scene;
use crate::spectrum::Spectrum;
use crate::{abs_dot, Float, Point3f, Ray, Vec3f};

#[derive(Clone, Copy)]
pub enum VertexKind<'s> {
    /// The first vertex of a light sub-path, on a luminaire.
    Light(&'s Luminaire),
    Surface(&'s Bsdf),
}

/// One vertex of an eye or light sub-path.
///
/// Densities are per unit area at this vertex: `pdf_fwd` for generating it from the previous
/// vertex of its own sub-path, `pdf_rev` for generating it from the next one, as the other
/// sub-path would.
#[derive(Clone, Copy)]
pub struct PathVertex<'s> {
    pub kind: VertexKind<'s>,
    pub p: Point3f,
    /// Geometric normal, used to convert densities.
    pub n: Vec3f,
    pub frame: Frame,
    /// Unit direction towards the previous vertex of the sub-path.
    pub wo: Vec3f,
    pub throughput: Spectrum,
    pub pdf_fwd: Float,
    pub pdf_rev: Float,
    pub delta: bool,
}

impl<'s> PathVertex<'s> {
    pub fn surface(si: &SurfaceInteraction<'s>, throughput: Spectrum) -> Self {
        let bsdf = si.bsdf();
        Self {
            kind: VertexKind::Surface(bsdf),
            p: si.p,
            n: si.n,
            frame: si.frame,
            wo: si.wo,
            throughput,
            pdf_fwd: 0.0,
            pdf_rev: 0.0,
            delta: bsdf.is_delta(),
        }
    }

    /// A luminaire point whose throughput is the inverse of its area density, so that
    /// `throughput * f` is the emitted radiance estimate.
    pub fn light(lp: &LightPoint<'s>) -> Self {
        Self {
            kind: VertexKind::Light(lp.luminaire),
            p: lp.p,
            n: lp.n,
            frame: Frame::from_normal(lp.n),
            wo: lp.n,
            throughput: Spectrum::uniform(1.0 / lp.pdf),
            pdf_fwd: lp.pdf,
            pdf_rev: 0.0,
            delta: false,
        }
    }

    pub fn is_light(&self) -> bool {
        match self.kind {
            VertexKind::Light(_) => true,
            VertexKind::Surface(_) => false,
        }
    }

    /// Scattering function for world-space directions, or the emitted radiance towards `wi`
    /// for a luminaire vertex.
    pub fn f(&self, wo: Vec3f, wi: Vec3f) -> Spectrum {
        match self.kind {
            VertexKind::Surface(bsdf) => bsdf.f(self.frame.to_local(wo), self.frame.to_local(wi)),
            VertexKind::Light(luminaire) => luminaire.emitted_radiance(self.n, wi),
        }
    }

    /// Density per unit area at `next` of continuing the sub-path from this vertex, having
    /// arrived from direction `wo`. Luminaire vertices use the emission direction density.
    pub fn pdf_area(&self, wo: Vec3f, next: &PathVertex) -> Float {
        let d = next.p - self.p;
        let dist2 = d.magnitude2();
        if dist2 == 0.0 {
            return 0.0;
        }
        let wi = d / dist2.sqrt();
        let pdf_dir = match self.kind {
            VertexKind::Surface(bsdf) => bsdf.pdf(self.frame.to_local(wo), self.frame.to_local(wi)),
            VertexKind::Light(_) => emission_pdf(self.n, wi),
        };
        convert_density(pdf_dir, self.p, next)
    }
}

/// Density of the emission directions chosen when a light sub-path starts.
pub fn emission_pdf(n: Vec3f, w: Vec3f) -> Float {
    if n.dot(w) > 0.0 {
        uniform_hemisphere_pdf()
    } else {
        0.0
    }
}

/// Converts a solid-angle density at `from` into an area density at `to`.
pub fn convert_density(pdf: Float, from: Point3f, to: &PathVertex) -> Float {
    let d = to.p - from;
    let dist2 = d.magnitude2();
    if dist2 == 0.0 {
        return 0.0;
    }
    pdf * abs_dot(to.n, d / dist2.sqrt()) / dist2
}

/// Grows a light sub-path from a sampled luminaire point. The first vertex lies on the
/// luminaire; every later one is a surface hit whose throughput already includes emission,
/// the scattering weights along the way and the roulette compensation.
pub fn trace_light_path<'s, 'a>(
    scene: &'s Scene,
    sampler: &mut dyn Sampler,
    config: &BidirConfig,
    arena: &'a Bump,
) -> BumpVec<'a, PathVertex<'s>> {
    let mut path = BumpVec::with_capacity_in(16, arena);

    let lp = match sample_light_point(scene.luminaires(), sampler.get_2d()) {
        Some(lp) => lp,
        None => return path,
    };
    let origin = PathVertex::light(&lp);
    let dir = origin.frame.to_world(uniform_sample_hemisphere(sampler.get_2d()));
    let mut pdf_dir = uniform_hemisphere_pdf();
    let mut throughput = origin.throughput * origin.f(dir, dir) * abs_dot(origin.n, dir) / pdf_dir;
    let mut ray = Ray::new(origin.p, dir);
    path.push(origin);

    let mut ior = RelativeIor::new(config.eta_bounds);
    while path.len() < config.max_light_vertices {
        if throughput.is_black() {
            break;
        }
        match config.light_roulette.survives(path.len() as u32, sampler) {
            Some(p) => throughput /= p,
            None => break,
        }

        let si = match scene.intersect(&ray) {
            Some(si) => si,
            None => break,
        };
        let prev_p = path[path.len() - 1].p;
        let mut vertex = PathVertex::surface(&si, throughput);
        vertex.pdf_fwd = convert_density(pdf_dir, prev_p, &vertex);
        path.push(vertex);

        let wo = si.to_local(si.wo);
        let sample = match si.bsdf().sample(wo, sampler.get_2d(), TransportMode::Importance) {
            Some(s) if !s.weight.is_black() => s,
            _ => break,
        };
        if !ior.scatter(sample.eta) {
            break;
        }

        let pdf_rev = if sample.is_discrete() {
            pdf_dir = 0.0;
            0.0
        } else {
            pdf_dir = sample.pdf;
            si.bsdf().pdf(sample.wi, wo)
        };
        let n = path.len();
        path[n - 2].pdf_rev = convert_density(pdf_rev, si.p, &path[n - 2]);

        throughput *= sample.weight;
        ray = si.spawn_ray(si.to_world(sample.wi));
    }

    path
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scene::presets;
    use crate::sampler::random::RandomSampler;
    use approx::assert_abs_diff_eq;

    #[test]
    fn light_path_starts_on_luminaire() {
        let scene = presets::furnace(0.5, 1.0).unwrap();
        let config = BidirConfig::default();
        let arena = Bump::new();
        let mut sampler = RandomSampler::new_with_seed(1, 5);

        for _ in 0..50 {
            let path = trace_light_path(&scene, &mut sampler, &config, &arena);
            assert!(path[0].is_light());
            assert_abs_diff_eq!(path[0].pdf_fwd, 1.0 / (4.0 * crate::consts::PI), epsilon = 1e-5);
            for v in path.iter().skip(1) {
                assert!(!v.is_light());
                assert!(v.throughput.is_non_negative());
                assert!(v.pdf_fwd > 0.0);
                // every hit lies on the unit sphere
                assert_abs_diff_eq!((v.p - Point3f::new(0.0, 0.0, 0.0)).magnitude(), 1.0, epsilon = 1e-3);
            }
            // reverse densities are known for every vertex that has a successor
            for v in path.iter().take(path.len().saturating_sub(2)) {
                assert!(v.pdf_rev > 0.0);
            }
        }
    }

    #[test]
    fn no_luminaires_gives_empty_path() {
        let scene = Scene::builder().environment(Spectrum::uniform(1.0)).build().unwrap();
        let arena = Bump::new();
        let mut sampler = RandomSampler::new_with_seed(1, 5);
        assert!(trace_light_path(&scene, &mut sampler, &BidirConfig::default(), &arena).is_empty());
    }
}
