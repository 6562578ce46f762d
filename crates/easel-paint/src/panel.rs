use glam::{Mat4, Vec2, Vec3};

use crate::ray::Ray;

// Plane-parallel rays and boundary hits are compared against this.
const EPSILON: f32 = 1e-5;

/// Result of a ray hitting the panel.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PanelHit {
    /// World-space hit point.
    pub point: Vec3,

    /// Distance from the ray origin to `point`.
    pub distance: f32,

    /// Surface parameterization in `[0, 1]²`; `u` grows left to right, `v` bottom to top.
    pub uv: Vec2,
}

/// The single flat, double-sided panel in the scene.
///
/// Geometry lives in the panel's local XY plane, centred on the origin and facing +Z;
/// `transform` places it in the world. Immutable once built.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Panel {
    size: Vec2,
    transform: Mat4,
    inverse: Mat4,
}

impl Panel {
    /// Axis-aligned panel centred at `center`, facing +Z.
    pub fn new(width: f32, height: f32, center: Vec3) -> Self {
        Self::with_transform(width, height, Mat4::from_translation(center))
    }

    /// Panel with an arbitrary placement. `transform` must be invertible.
    pub fn with_transform(width: f32, height: f32, transform: Mat4) -> Self {
        Self {
            size: Vec2::new(width.abs(), height.abs()),
            transform,
            inverse: transform.inverse(),
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    #[inline]
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    /// Local-to-world transform scaled to the panel size, mapping the unit quad
    /// `[-0.5, 0.5]²` onto the panel.
    pub fn model_matrix(&self) -> Mat4 {
        self.transform * Mat4::from_scale(self.size.extend(1.0))
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        self.transform.transform_point3(Vec3::ZERO)
    }

    /// Nearest intersection of `ray` with the panel, from either side.
    ///
    /// Misses when the ray is parallel to the plane, points away from it, or
    /// crosses the plane outside the panel's finite bounds. Hits exactly on the
    /// boundary count as hits.
    pub fn raycast(&self, ray: &Ray) -> Option<PanelHit> {
        let origin = self.inverse.transform_point3(ray.origin);
        let direction = self.inverse.transform_vector3(ray.direction);

        if direction.z.abs() < EPSILON {
            return None;
        }

        let t = -origin.z / direction.z;
        if !t.is_finite() || t < 0.0 {
            return None;
        }

        let local = origin + direction * t;
        let half = self.size * 0.5;
        if local.x.abs() > half.x + EPSILON || local.y.abs() > half.y + EPSILON {
            return None;
        }

        let point = self.transform.transform_point3(Vec3::new(local.x, local.y, 0.0));
        let uv = Vec2::new(local.x / self.size.x + 0.5, local.y / self.size.y + 0.5)
            .clamp(Vec2::ZERO, Vec2::ONE);

        Some(PanelHit {
            point,
            distance: (point - ray.origin).length(),
            uv,
        })
    }
}
