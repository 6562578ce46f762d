use glam::{Mat4, Vec3};

/// Half-line used for picking. `direction` is always unit length.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Builds a ray, normalizing `direction`.
    ///
    /// A zero or non-finite direction falls back to -Z (the controller forward axis).
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.try_normalize().unwrap_or(Vec3::NEG_Z),
        }
    }

    /// Ray along the local -Z axis of a device pose.
    ///
    /// The origin is the pose translation. The direction uses the rotation part
    /// only; translation and scale are discarded.
    pub fn from_pose(pose: &Mat4) -> Self {
        let (_scale, rotation, translation) = pose.to_scale_rotation_translation();
        Self::new(translation, rotation * Vec3::NEG_Z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn identity_pose_points_down_negative_z() {
        let ray = Ray::from_pose(&Mat4::IDENTITY);
        assert!(approx(ray.origin, Vec3::ZERO));
        assert!(approx(ray.direction, Vec3::NEG_Z));
    }

    #[test]
    fn translation_moves_origin_only() {
        let pose = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let ray = Ray::from_pose(&pose);
        assert!(approx(ray.origin, Vec3::new(1.0, 2.0, 3.0)));
        assert!(approx(ray.direction, Vec3::NEG_Z));
    }

    #[test]
    fn rotation_turns_direction() {
        // +90° about Y turns -Z into -X.
        let pose = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let ray = Ray::from_pose(&pose);
        assert!(approx(ray.direction, Vec3::NEG_X));
    }

    #[test]
    fn scale_is_discarded() {
        let pose = Mat4::from_scale_rotation_translation(
            Vec3::splat(4.0),
            Quat::IDENTITY,
            Vec3::new(0.0, 1.0, 0.0),
        );
        let ray = Ray::from_pose(&pose);
        assert!((ray.direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn zero_direction_falls_back() {
        let ray = Ray::new(Vec3::ZERO, Vec3::ZERO);
        assert_eq!(ray.direction, Vec3::NEG_Z);
    }
}
