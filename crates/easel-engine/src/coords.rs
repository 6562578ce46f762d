//! Overlay placement in logical pixels: top-left origin, +Y down.

use glam::Vec2;

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn size(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ScreenRect {
    pub min: Vec2,
    pub size: Vec2,
}

impl ScreenRect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// `size` inset by `margin` from the top-right corner of `viewport`.
    pub fn top_right(viewport: Viewport, size: Vec2, margin: f32) -> Self {
        Self {
            min: Vec2::new(viewport.width - margin - size.x, margin),
            size,
        }
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Half-open: the right and bottom edges are outside.
    pub fn contains(self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.min.x && p.y >= self.min.y && p.x < max.x && p.y < max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let r = ScreenRect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Vec2::ZERO));
        assert!(r.contains(Vec2::new(9.9, 9.9)));
        assert!(!r.contains(Vec2::new(10.0, 5.0)));
        assert!(!r.contains(Vec2::new(5.0, -0.1)));
    }

    #[test]
    fn top_right_keeps_margin_on_both_edges() {
        let r = ScreenRect::top_right(Viewport::new(800.0, 600.0), Vec2::new(200.0, 40.0), 20.0);
        assert_eq!(r.min, Vec2::new(580.0, 20.0));
        assert_eq!(r.max(), Vec2::new(780.0, 60.0));
        assert_eq!(r.center(), Vec2::new(680.0, 40.0));
    }
}
