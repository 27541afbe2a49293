//! The lights of the scene, all following the avatar.
//!
//! The structs are uploaded as-is and mirror the light structs in `shaders/common.wgsl`.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

const DIRECTION: Vec3 = Vec3::new(-0.2, -1.0, -0.3);
const ORBIT_RADIUS: f32 = 4.0;
const ORBIT_HEIGHT: f32 = 4.0;
const SPOT_HEIGHT: f32 = 5.0;
const SHININESS: f32 = 64.0;

/// constant, linear and quadratic attenuation factors
const ATTENUATION: Vec4 = Vec4::new(1.0, 0.09, 0.032, 0.0);

fn grey(value: f32) -> Vec4 {
    Vec4::new(value, value, value, 1.0)
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub(crate) struct DirectionalLight {
    pub(crate) direction: Vec4,
    pub(crate) ambient: Vec4,
    pub(crate) diffuse: Vec4,
    pub(crate) specular: Vec4,
}

impl DirectionalLight {
    fn new(diffuse: f32, specular: f32) -> Self {
        Self {
            direction: DIRECTION.extend(0.0),
            ambient: grey(0.05),
            diffuse: grey(diffuse),
            specular: grey(specular),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub(crate) struct PointLight {
    pub(crate) position: Vec4,
    pub(crate) ambient: Vec4,
    pub(crate) diffuse: Vec4,
    pub(crate) specular: Vec4,
    pub(crate) attenuation: Vec4,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub(crate) struct SpotLight {
    pub(crate) position: Vec4,
    pub(crate) direction: Vec4,
    pub(crate) ambient: Vec4,
    pub(crate) diffuse: Vec4,
    pub(crate) specular: Vec4,
    pub(crate) attenuation: Vec4,
    /// cosines of the inner and outer cone angles
    pub(crate) cut_off: Vec4,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub(crate) struct Lighting {
    /// sun light for models
    pub(crate) directional: DirectionalLight,
    pub(crate) point: PointLight,
    /// dimmer sun light for the ground plane
    pub(crate) ground_directional: DirectionalLight,
    /// lights up the ground around the avatar
    pub(crate) spot: SpotLight,
    /// x: specular exponent of all models
    pub(crate) material: Vec4,
}

impl Lighting {
    /// Places all lights relative to the avatar, `elapsed` seconds after start.
    pub(crate) fn around(avatar: Vec3, elapsed: f32) -> Self {
        let (sin, cos) = elapsed.sin_cos();
        let orbit = Vec3::new(ORBIT_RADIUS * sin, ORBIT_HEIGHT, ORBIT_RADIUS * cos);

        let point = PointLight {
            position: (avatar + orbit).extend(1.0),
            ambient: grey(0.05),
            diffuse: grey(0.8),
            specular: grey(1.0),
            attenuation: ATTENUATION,
        };

        let spot = SpotLight {
            position: (avatar + Vec3::Y * SPOT_HEIGHT).extend(1.0),
            direction: Vec4::NEG_Y,
            ambient: grey(0.0),
            diffuse: grey(1.0),
            specular: grey(1.0),
            attenuation: ATTENUATION,
            cut_off: Vec4::new(
                45_f32.to_radians().cos(),
                50_f32.to_radians().cos(),
                0.0,
                0.0,
            ),
        };

        Self {
            directional: DirectionalLight::new(0.4, 1.0),
            point,
            ground_directional: DirectionalLight::new(0.1, 0.0),
            spot,
            material: Vec4::new(SHININESS, 0.0, 0.0, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn point_light_orbits_above_the_avatar() {
        let avatar = Vec3::new(2.0, 0.1, -3.0);

        let start = Lighting::around(avatar, 0.0).point.position.truncate();
        assert!(
            start.abs_diff_eq(avatar + Vec3::new(0.0, 4.0, 4.0), 1e-5),
            "at t = 0 the light is at {start}"
        );

        let quarter = Lighting::around(avatar, FRAC_PI_2).point.position.truncate();
        assert!(
            quarter.abs_diff_eq(avatar + Vec3::new(4.0, 4.0, 0.0), 1e-5),
            "at t = pi/2 the light is at {quarter}"
        );

        for step in 0..20 {
            #[expect(clippy::cast_precision_loss, reason = "small loop counter")]
            let time = step as f32 * 0.7;
            let offset = Lighting::around(avatar, time).point.position.truncate() - avatar;
            assert!(
                (offset.x.hypot(offset.z) - ORBIT_RADIUS).abs() < 1e-4,
                "radius at t = {time}"
            );
        }
    }

    #[test]
    fn spot_light_points_down_onto_the_avatar() {
        let avatar = Vec3::new(-1.0, 0.1, 1.0);
        let spot = Lighting::around(avatar, 12.0).spot;
        assert_eq!(spot.position.truncate(), avatar + Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(spot.direction, Vec4::NEG_Y);
        assert!(
            spot.cut_off.x > spot.cut_off.y,
            "inner cone is narrower than the outer cone"
        );
    }

    #[test]
    fn ground_gets_dimmer_sun_light() {
        let lighting = Lighting::around(Vec3::ZERO, 0.0);
        assert_eq!(
            lighting.directional.direction,
            lighting.ground_directional.direction
        );
        assert!(lighting.ground_directional.diffuse.x < lighting.directional.diffuse.x);
    }

    #[test]
    fn layout_is_a_multiple_of_vec4() {
        assert_eq!(size_of::<Lighting>() % 16, 0);
        assert_eq!(size_of::<Lighting>(), (4 + 5 + 4 + 7 + 1) * 16);
    }
}
