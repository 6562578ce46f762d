use glam::Vec2;

use crate::panel::Panel;
use crate::ray::Ray;
use crate::surface::{Rgba8, SurfaceBuffer};

/// Paint applied by a single select.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Brush {
    pub radius: f32,
    pub color: Rgba8,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            radius: 5.0,
            color: Rgba8::RED,
        }
    }
}

/// Maps surface coordinates to buffer pixels.
///
/// `u` runs left to right, `v` bottom to top; buffer rows run top to bottom, so
/// `v` is flipped. The result is not clamped.
#[inline]
pub fn uv_to_pixel(uv: Vec2, width: u32, height: u32) -> Vec2 {
    Vec2::new(uv.x * width as f32, (1.0 - uv.y) * height as f32)
}

/// A painted mark.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mark {
    /// Disc centre in buffer pixels, after clamping.
    pub pixel: Vec2,
    pub uv: Vec2,
}

/// Raycasts a pointer against the panel and paints where it lands.
#[derive(Debug, Clone, Default)]
pub struct PointerPainter {
    brush: Brush,
}

impl PointerPainter {
    pub fn new(brush: Brush) -> Self {
        Self { brush }
    }

    /// Paints one disc where `ray` hits `panel`.
    ///
    /// A miss leaves `surface` untouched (including its dirty flag).
    pub fn paint(&self, ray: &Ray, panel: &Panel, surface: &mut SurfaceBuffer) -> Option<Mark> {
        let hit = panel.raycast(ray)?;

        let raw = uv_to_pixel(hit.uv, surface.width(), surface.height());
        let (x, y) = surface.clamp_point(raw.x, raw.y);

        surface.fill_disc(x, y, self.brush.radius, self.brush.color);

        Some(Mark {
            pixel: Vec2::new(x, y),
            uv: hit.uv,
        })
    }
}
