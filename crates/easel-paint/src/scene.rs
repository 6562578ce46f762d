use glam::Vec3;

use crate::camera::{DisplaySize, PerspectiveCamera};
use crate::panel::Panel;
use crate::surface::Rgba8;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AmbientLight {
    pub color: Rgba8,
    pub intensity: f32,
}

/// Light arriving from `position` toward the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DirectionalLight {
    pub color: Rgba8,
    pub intensity: f32,
    pub position: Vec3,
}

impl DirectionalLight {
    /// Unit vector the light travels along.
    pub fn direction(&self) -> Vec3 {
        (-self.position).try_normalize().unwrap_or(Vec3::NEG_Y)
    }
}

/// Text drawn onto the panel surface once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelConfig {
    pub text: String,
    pub px: f32,
    pub color: Rgba8,
    /// Left edge and baseline in buffer pixels.
    pub origin: (f32, f32),
}

/// Static scene values.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub background: Rgba8,

    pub surface_size: (u32, u32),
    pub surface_fill: Rgba8,
    pub label: Option<LabelConfig>,

    pub panel_size: (f32, f32),
    pub panel_center: Vec3,

    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec3,

    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background: Rgba8::from_hex(0x505050),

            surface_size: (320, 180),
            surface_fill: Rgba8::WHITE,
            label: Some(LabelConfig {
                text: "Interactive Canvas Panel".to_string(),
                px: 20.0,
                color: Rgba8::BLACK,
                origin: (20.0, 40.0),
            }),

            panel_size: (3.2, 1.8),
            panel_center: Vec3::new(0.0, 1.6, -2.0),

            fov_y_deg: 50.0,
            near: 0.1,
            far: 10.0,
            eye: Vec3::new(0.0, 1.6, 3.0),

            ambient: AmbientLight {
                color: Rgba8::WHITE,
                intensity: 0.5,
            },
            directional: DirectionalLight {
                color: Rgba8::WHITE,
                intensity: 0.5,
                position: Vec3::new(0.0, 1.0, 0.0),
            },
        }
    }
}

/// Everything the renderer draws besides the surface pixels and controllers.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub background: Rgba8,
    pub camera: PerspectiveCamera,
    pub panel: Panel,
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
}

impl Scene {
    pub fn new(config: &SceneConfig, display: DisplaySize) -> Self {
        let (w, h) = config.panel_size;
        Self {
            background: config.background,
            camera: PerspectiveCamera::new(
                config.fov_y_deg,
                config.near,
                config.far,
                display.aspect(),
                config.eye,
            ),
            panel: Panel::new(w, h, config.panel_center),
            ambient: config.ambient,
            directional: config.directional,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directional_light_points_down() {
        let light = SceneConfig::default().directional;
        assert!((light.direction() - Vec3::NEG_Y).length() < 1e-6);
    }

    #[test]
    fn scene_uses_display_aspect() {
        let scene = Scene::new(&SceneConfig::default(), DisplaySize::new(800, 600));
        assert!((scene.camera.aspect() - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(scene.panel.center(), Vec3::new(0.0, 1.6, -2.0));
        assert_eq!(scene.background, Rgba8::new(0x50, 0x50, 0x50, 0xff));
    }
}
