use glam::{Mat4, Quat, Vec3};

/// Drawable size of the output surface in physical pixels.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
}

impl DisplaySize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height; 1.0 while either side is zero.
    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Right-handed perspective camera looking down its local -Z.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
    position: Vec3,
    orientation: Quat,
    home: Vec3,
}

impl PerspectiveCamera {
    pub fn new(fov_y_deg: f32, near: f32, far: f32, aspect: f32, position: Vec3) -> Self {
        Self {
            fov_y_deg,
            near,
            far,
            aspect,
            position,
            orientation: Quat::IDENTITY,
            home: position,
        }
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Places the eye at a tracked pose (head mirror view).
    pub fn set_pose(&mut self, pose: &Mat4) {
        let (_scale, rotation, translation) = pose.to_scale_rotation_translation();
        self.position = translation;
        self.orientation = rotation.normalize();
    }

    /// Returns the eye to its configured position, looking down -Z.
    pub fn reset(&mut self) {
        self.position = self.home;
        self.orientation = Quat::IDENTITY;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(50.0, 0.1, 10.0, 16.0 / 9.0, Vec3::new(0.0, 1.6, 3.0))
    }

    #[test]
    fn aspect_of_empty_display_is_one() {
        assert_eq!(DisplaySize::new(0, 600).aspect(), 1.0);
        assert!((DisplaySize::new(1920, 1080).aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn invalid_aspect_is_ignored() {
        let mut cam = camera();
        cam.set_aspect(0.0);
        cam.set_aspect(f32::NAN);
        assert!((cam.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn point_ahead_projects_to_centre() {
        let cam = camera();
        let clip = cam.view_proj() * Vec4::new(0.0, 1.6, -2.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn pose_then_reset_restores_home() {
        let mut cam = camera();
        cam.set_pose(&Mat4::from_rotation_translation(
            Quat::from_rotation_y(1.0),
            Vec3::new(0.2, 1.7, 0.1),
        ));
        assert!((cam.position() - Vec3::new(0.2, 1.7, 0.1)).length() < 1e-5);

        cam.reset();
        assert_eq!(cam.position(), Vec3::new(0.0, 1.6, 3.0));
        assert_eq!(cam.orientation(), Quat::IDENTITY);
    }
}
