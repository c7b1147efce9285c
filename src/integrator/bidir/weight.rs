//! Balance-heuristic weights over the strategies the bidirectional estimator actually runs.
//!
//! A full path with `d` eye vertices and `s` light vertices can also be produced with fewer
//! eye vertices and correspondingly more light vertices. The weight of the strategy in use is
//! `1 / (1 + Σ pᵢ/pₛ)`, where the density ratios are accumulated outwards from the connection
//! one vertex at a time, as in Veach's thesis. Strategies that would connect through a delta
//! vertex are skipped. Hitting a luminaire by chance is only counted by the estimator after a
//! delta bounce, and never starting from the camera (there is no light-tracing strategy), so
//! those strategies are excluded too.

use cgmath::InnerSpace;
use smallvec::SmallVec;

use crate::integrator::bidir::vertex::{convert_density, emission_pdf, PathVertex};
use crate::Float;

#[derive(Clone, Copy, Debug)]
struct Densities {
    fwd: Float,
    rev: Float,
    delta: bool,
}

impl<'s> From<&PathVertex<'s>> for Densities {
    fn from(v: &PathVertex<'s>) -> Self {
        Self { fwd: v.pdf_fwd, rev: v.pdf_rev, delta: v.delta }
    }
}

type DensityPath = SmallVec<[Densities; 16]>;

fn remap0(f: Float) -> Float {
    if f != 0.0 { f } else { 1.0 }
}

/// `eye` holds the surface vertices of the eye sub-path, nearest to the camera first; `light`
/// holds the light sub-path with the luminaire vertex first.
fn balance(eye: &[Densities], light: &[Densities]) -> Float {
    let mut sum = 0.0;

    let mut ri = 1.0;
    for j in (1..eye.len()).rev() {
        ri *= remap0(eye[j].rev) / remap0(eye[j].fwd);
        if !eye[j].delta && !eye[j - 1].delta {
            sum += ri;
        }
    }

    // emission hits are only counted after a delta bounce
    let emission_counted = light.len() >= 2 && light[1].delta;
    ri = 1.0;
    for j in (0..light.len()).rev() {
        ri *= remap0(light[j].rev) / remap0(light[j].fwd);
        let counted = if j > 0 {
            !light[j].delta && !light[j - 1].delta
        } else {
            emission_counted && !light[0].delta
        };
        if counted {
            sum += ri;
        }
    }

    1.0 / (1.0 + sum)
}

/// Weight of connecting the last eye vertex to the last light vertex. Both slices must be
/// non-empty.
pub fn connection_weight(eye: &[PathVertex], light: &[PathVertex]) -> Float {
    let (d, s) = (eye.len(), light.len());
    let pt = &eye[d - 1];
    let qs = &light[s - 1];

    let mut e: DensityPath = eye.iter().map(Densities::from).collect();
    let mut l: DensityPath = light.iter().map(Densities::from).collect();

    e[d - 1].rev = qs.pdf_area(qs.wo, pt);
    e[d - 1].delta = false;
    if d >= 2 {
        e[d - 2].rev = pt.pdf_area((qs.p - pt.p).normalize(), &eye[d - 2]);
    }
    l[s - 1].rev = pt.pdf_area(pt.wo, qs);
    l[s - 1].delta = false;
    if s >= 2 {
        l[s - 2].rev = qs.pdf_area((pt.p - qs.p).normalize(), &light[s - 2]);
    }

    balance(&e, &l)
}

/// Weight of the last eye vertex lying on a luminaire, reached by the random walk.
/// `origin_pdf` is the area density with which the light sampler picks that point.
pub fn emission_weight(eye: &[PathVertex], origin_pdf: Float) -> Float {
    let d = eye.len();
    let pt = &eye[d - 1];

    let mut e: DensityPath = eye.iter().map(Densities::from).collect();
    e[d - 1].rev = origin_pdf;
    e[d - 1].delta = false;
    if d >= 2 {
        let prev = &eye[d - 2];
        let to_prev = (prev.p - pt.p).normalize();
        e[d - 2].rev = convert_density(emission_pdf(pt.n, to_prev), pt.p, prev);
    }

    balance(&e, &[])
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn dens(fwd: Float, rev: Float) -> Densities {
        Densities { fwd, rev, delta: false }
    }

    #[test]
    fn single_strategy_has_full_weight() {
        assert_eq!(balance(&[dens(1.0, 0.0)], &[]), 1.0);
        // next-event estimation at the first hit competes with nothing
        assert_eq!(balance(&[dens(1.0, 2.0)], &[dens(0.5, 3.0)]), 1.0);
    }

    #[test]
    fn two_strategies_share_by_density() {
        // eye hit a luminaire at its second vertex, competing with light sampling from the
        // first vertex: w = p_hit / (p_hit + p_light)
        let eye = [dens(1.0, 0.0), dens(0.2, 0.6)];
        let w_hit = balance(&eye, &[]);
        assert_abs_diff_eq!(w_hit, 0.2 / (0.2 + 0.6), epsilon = 1e-6);

        // the same path by light sampling; the emission strategy is not run after a
        // non-delta bounce, so next-event estimation takes everything
        let eye = [dens(1.0, 0.3)];
        let light = [dens(0.6, 0.2)];
        assert_eq!(balance(&eye, &light), 1.0);
    }

    #[test]
    fn emission_after_delta_light_vertex_is_counted() {
        // light sub-path: luminaire, mirror, diffuse vertex the eye connects to. The mirror
        // rules out both connections through it, but an eye walk may hit the luminaire after
        // bouncing off it, so that strategy competes.
        let mut mirror = dens(0.0, 0.0);
        mirror.delta = true;
        let eye = [dens(1.0, 0.2)];
        let light = [dens(0.5, 0.25), mirror, dens(0.4, 0.8)];
        assert_abs_diff_eq!(balance(&eye, &light), 0.5, epsilon = 1e-6);

        // a diffuse middle vertex allows both connections instead, and the emission hit drops out
        let light = [dens(0.5, 0.25), dens(0.5, 0.5), dens(0.4, 0.8)];
        assert_abs_diff_eq!(balance(&eye, &light), 0.2, epsilon = 1e-6);
    }

    #[test]
    fn delta_vertices_are_skipped() {
        let mut mirror = dens(0.4, 0.4);
        mirror.delta = true;
        let eye = [dens(1.0, 0.5), mirror, dens(0.7, 0.9)];
        // both alternative strategies would have to connect at the mirror
        assert_eq!(balance(&eye, &[]), 1.0);
    }
}
