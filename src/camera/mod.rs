use cgmath::InnerSpace;

use crate::{consts, Float, Point2f, Point2i, Point3f, Ray, Vec3f};

#[derive(Clone, Copy, Debug)]
pub struct CameraSample {
    /// Position on the film in raster coordinates.
    pub p_film: Point2f,
}

pub trait Camera: Sync + Send {
    /// Returns the ray through the film sample and the weight of its contribution.
    fn generate_ray(&self, sample: CameraSample) -> (Float, Ray);
}

/// Pinhole camera. Raster `(0, 0)` is the top-left corner of the image.
#[derive(Clone, Debug)]
pub struct PerspectiveCamera {
    origin: Point3f,
    forward: Vec3f,
    right: Vec3f,
    up: Vec3f,
    resolution: Point2i,
    tan_half_fov: Float,
    aspect: Float,
}

impl PerspectiveCamera {
    /// `fov` is the vertical field of view in degrees.
    pub fn look_at(eye: Point3f, target: Point3f, up: Vec3f, fov: Float, resolution: Point2i) -> Self {
        let forward = (target - eye).normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);
        Self {
            origin: eye,
            forward,
            right,
            up,
            resolution,
            tan_half_fov: (0.5 * fov * consts::PI / 180.0).tan(),
            aspect: resolution.x as Float / resolution.y as Float,
        }
    }

    pub fn resolution(&self) -> Point2i {
        self.resolution
    }
}

impl Camera for PerspectiveCamera {
    fn generate_ray(&self, sample: CameraSample) -> (Float, Ray) {
        let ndc_x = 2.0 * sample.p_film.x / self.resolution.x as Float - 1.0;
        let ndc_y = 1.0 - 2.0 * sample.p_film.y / self.resolution.y as Float;
        let dir = self.forward
            + self.right * (ndc_x * self.tan_half_fov * self.aspect)
            + self.up * (ndc_y * self.tan_half_fov);
        (1.0, Ray::new(self.origin, dir.normalize()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn centre_of_film_looks_at_target() {
        let camera = PerspectiveCamera::look_at(point3f!(0, 0, 5), point3f!(0, 0, 0), vec3f!(0, 1, 0), 60.0, Point2i::new(64, 32));
        let (weight, ray) = camera.generate_ray(CameraSample { p_film: point2f!(32, 16) });
        assert_eq!(weight, 1.0);
        assert_abs_diff_eq!(ray.dir.z, -1.0, epsilon = 1e-6);

        // top edge of the film is half the field of view above the axis
        let (_, top) = camera.generate_ray(CameraSample { p_film: point2f!(32, 0) });
        assert_abs_diff_eq!(top.dir.y / -top.dir.z, (30.0 as Float).to_radians().tan(), epsilon = 1e-5);
        let (_, left) = camera.generate_ray(CameraSample { p_film: point2f!(0, 16) });
        assert!(left.dir.x < 0.0);
    }
}
