use std::ops::Range;

use glam::Mat4;

pub enum Projection {
    Perspective {
        surface_width: u32,
        surface_height: u32,
        /// vertical field of view in radians
        fov: f32,
        z_range: Range<f32>,
    },
}

impl Projection {
    #[must_use]
    pub fn new_perspective(
        (surface_width, surface_height): (u32, u32),
        fov: f32,
        z_range: Range<f32>,
    ) -> Self {
        Self::Perspective {
            surface_width,
            surface_height,
            fov,
            z_range,
        }
    }

    fn near(&self) -> f32 {
        match *self {
            Projection::Perspective { ref z_range, .. } => z_range.start,
        }
    }

    fn far(&self) -> f32 {
        match *self {
            Projection::Perspective { ref z_range, .. } => z_range.end,
        }
    }

    #[must_use]
    pub fn fov(&self) -> f32 {
        match *self {
            Projection::Perspective { fov, .. } => fov,
        }
    }

    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        match *self {
            Projection::Perspective {
                surface_width,
                surface_height,
                ..
            } => {
                #[expect(
                    clippy::cast_precision_loss,
                    reason = "surface sizes are far below 2^24"
                )]
                let ratio = surface_width as f32 / surface_height.max(1) as f32;
                ratio
            }
        }
    }

    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov(), self.aspect_ratio(), self.near(), self.far())
    }

    pub fn set_fov(&mut self, new_fov: f32) {
        match *self {
            Projection::Perspective { ref mut fov, .. } => *fov = new_fov,
        }
    }

    pub fn set_surface_dimensions(&mut self, (new_surface_width, new_surface_height): (u32, u32)) {
        match *self {
            Projection::Perspective {
                ref mut surface_width,
                ref mut surface_height,
                ..
            } => {
                *surface_width = new_surface_width;
                *surface_height = new_surface_height;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_follows_surface() {
        let mut projection = Projection::new_perspective((1200, 800), 45_f32.to_radians(), 0.1..100.0);
        assert!((projection.aspect_ratio() - 1.5).abs() < 1e-6, "1200x800");

        projection.set_surface_dimensions((800, 800));
        assert!((projection.aspect_ratio() - 1.0).abs() < 1e-6, "800x800");
    }

    #[test]
    fn zero_height_does_not_divide_by_zero() {
        let projection = Projection::new_perspective((640, 0), 1.0, 0.1..100.0);
        assert!(projection.aspect_ratio().is_finite(), "finite ratio");
    }

    #[test]
    fn fov_can_be_changed() {
        let mut projection = Projection::new_perspective((100, 100), 1.0, 0.1..100.0);
        projection.set_fov(0.5);
        assert!((projection.fov() - 0.5).abs() < f32::EPSILON, "fov updated");
        let matrix = projection.matrix();
        assert!(matrix.is_finite(), "matrix is finite");
    }
}
