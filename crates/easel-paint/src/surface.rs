use bytemuck::{Pod, Zeroable};

/// Straight-alpha sRGB color, one byte per channel.
///
/// Layout matches `wgpu::TextureFormat::Rgba8UnormSrgb`, so a slice of pixels
/// can be uploaded with `bytemuck::cast_slice` and no conversion pass.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Pod, Zeroable)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff, 0xff);
    pub const BLACK: Self = Self::new(0x00, 0x00, 0x00, 0xff);
    pub const RED: Self = Self::new(0xff, 0x00, 0x00, 0xff);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a `0xRRGGBB` literal.
    #[inline]
    pub const fn from_hex(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 0xff)
    }

    /// Source-over composite of `src` onto `self`, with `src.a` scaled by `coverage`.
    fn over(self, src: Rgba8, coverage: u8) -> Rgba8 {
        let alpha = src.a as u32 * coverage as u32 / 255;
        if alpha == 0 {
            return self;
        }
        if alpha == 255 {
            return src;
        }

        let inv = 255 - alpha;
        let mix = |s: u8, d: u8| ((s as u32 * alpha + d as u32 * inv + 127) / 255) as u8;
        Rgba8 {
            r: mix(src.r, self.r),
            g: mix(src.g, self.g),
            b: mix(src.b, self.b),
            a: (alpha + (self.a as u32 * inv + 127) / 255).min(255) as u8,
        }
    }
}

/// The panel's drawable surface.
///
/// Fixed-size RGBA8 grid addressed from the top-left corner (+X right, +Y down).
/// Every mutation sets the dirty flag; the renderer clears it with
/// [`take_dirty`](Self::take_dirty) when it uploads the pixels.
///
/// A new buffer starts dirty so that its initial contents reach the GPU.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba8>,
    dirty: bool,
}

impl SurfaceBuffer {
    /// Creates a buffer filled with `background`.
    ///
    /// Zero dimensions are bumped to 1 so that clamping always has a valid pixel.
    pub fn new(width: u32, height: u32, background: Rgba8) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            pixels: vec![background; width as usize * height as usize],
            dirty: true,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }

    /// Raw bytes in row-major order, 4 bytes per pixel.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Returns the pixel at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(self.index(x, y)).copied()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the dirty flag and clears it.
    #[inline]
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Clamps a point to `[0, width) × [0, height)` in pixel units.
    pub fn clamp_point(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x.clamp(0.0, (self.width - 1) as f32),
            y.clamp(0.0, (self.height - 1) as f32),
        )
    }

    /// Fills a disc centred at `(cx, cy)`.
    ///
    /// The centre is clamped into the buffer first; pixels of the disc that fall
    /// outside the buffer are clipped. A pixel is covered when its centre
    /// (`x + 0.5`, `y + 0.5`) lies within `radius` of the disc centre.
    ///
    /// Sets the dirty flag when at least one pixel is written; with a clamped
    /// centre and a non-negative radius the centre pixel always is.
    ///
    /// Returns the number of pixels written. Non-finite input writes nothing.
    pub fn fill_disc(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba8) -> usize {
        if !(cx.is_finite() && cy.is_finite() && radius.is_finite()) || radius < 0.0 {
            return 0;
        }

        let (cx, cy) = self.clamp_point(cx, cy);
        let r2 = radius * radius;

        let x0 = (cx - radius).floor().max(0.0) as u32;
        let y0 = (cy - radius).floor().max(0.0) as u32;
        let x1 = ((cx + radius).ceil() as u32).min(self.width - 1);
        let y1 = ((cy + radius).ceil() as u32).min(self.height - 1);

        let mut written = 0;
        for y in y0..=y1 {
            let dy = y as f32 + 0.5 - cy;
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                if dx * dx + dy * dy <= r2 {
                    let i = self.index(x, y);
                    self.pixels[i] = self.pixels[i].over(color, 255);
                    written += 1;
                }
            }
        }

        if written > 0 {
            self.dirty = true;
        }
        written
    }

    /// Composites an 8-bit coverage mask tinted with `color`.
    ///
    /// `(left, top)` is the mask's top-left corner in buffer pixels and may be
    /// negative; the mask is clipped to the buffer. `coverage.len()` must be at
    /// least `mask_width * mask_height`.
    pub fn blit_mask(
        &mut self,
        left: i32,
        top: i32,
        mask_width: u32,
        mask_height: u32,
        coverage: &[u8],
        color: Rgba8,
    ) {
        debug_assert!(coverage.len() >= mask_width as usize * mask_height as usize);

        for my in 0..mask_height {
            let y = top + my as i32;
            if y < 0 || y >= self.height as i32 {
                continue;
            }
            for mx in 0..mask_width {
                let x = left + mx as i32;
                if x < 0 || x >= self.width as i32 {
                    continue;
                }
                let Some(&c) = coverage.get((my * mask_width + mx) as usize) else { continue };
                if c == 0 {
                    continue;
                }
                let i = self.index(x as u32, y as u32);
                self.pixels[i] = self.pixels[i].over(color, c);
            }
        }

        self.dirty = true;
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> SurfaceBuffer {
        let mut buf = SurfaceBuffer::new(320, 180, Rgba8::WHITE);
        buf.take_dirty();
        buf
    }

    // ── Rgba8 ─────────────────────────────────────────────────────────────

    #[test]
    fn from_hex_splits_channels() {
        assert_eq!(Rgba8::from_hex(0x505050), Rgba8::new(0x50, 0x50, 0x50, 0xff));
        assert_eq!(Rgba8::from_hex(0xff0000), Rgba8::RED);
    }

    #[test]
    fn over_with_half_coverage_mixes() {
        let out = Rgba8::WHITE.over(Rgba8::BLACK, 128);
        assert!(out.r > 120 && out.r < 135);
        assert_eq!(out.a, 255);
    }

    #[test]
    fn over_with_zero_coverage_is_identity() {
        assert_eq!(Rgba8::WHITE.over(Rgba8::RED, 0), Rgba8::WHITE);
    }

    // ── construction / dirty flag ─────────────────────────────────────────

    #[test]
    fn new_buffer_is_filled_and_dirty() {
        let mut buf = SurfaceBuffer::new(4, 3, Rgba8::WHITE);
        assert_eq!(buf.pixels().len(), 12);
        assert_eq!(buf.as_bytes().len(), 48);
        assert!(buf.pixels().iter().all(|p| *p == Rgba8::WHITE));
        assert!(buf.take_dirty());
        assert!(!buf.is_dirty());
    }

    #[test]
    fn zero_size_is_bumped() {
        let buf = SurfaceBuffer::new(0, 0, Rgba8::WHITE);
        assert_eq!((buf.width(), buf.height()), (1, 1));
    }

    #[test]
    fn pixel_outside_is_none() {
        let buf = blank();
        assert!(buf.pixel(320, 0).is_none());
        assert!(buf.pixel(0, 180).is_none());
    }

    // ── fill_disc ─────────────────────────────────────────────────────────

    #[test]
    fn disc_covers_centre_and_radius() {
        let mut buf = blank();
        let written = buf.fill_disc(160.0, 90.0, 5.0, Rgba8::RED);
        assert!(written > 0);
        assert!(buf.is_dirty());

        assert_eq!(buf.pixel(160, 90), Some(Rgba8::RED));
        assert_eq!(buf.pixel(159, 89), Some(Rgba8::RED));
        assert_eq!(buf.pixel(160, 94), Some(Rgba8::RED));
        // (160.5, 96.5) is 6.5 px away.
        assert_eq!(buf.pixel(160, 96), Some(Rgba8::WHITE));
        assert_eq!(buf.pixel(150, 90), Some(Rgba8::WHITE));
    }

    #[test]
    fn disc_pixel_count_is_roughly_circle_area() {
        let mut buf = blank();
        let written = buf.fill_disc(100.0, 100.0, 5.0, Rgba8::RED) as f32;
        let area = std::f32::consts::PI * 25.0;
        assert!((written - area).abs() < 10.0, "written = {written}");
    }

    #[test]
    fn disc_at_corner_is_clamped_and_clipped() {
        let mut buf = blank();
        let written = buf.fill_disc(0.0, 180.0, 5.0, Rgba8::RED);
        assert!(written > 0);
        assert_eq!(buf.pixel(0, 179), Some(Rgba8::RED));
        assert_eq!(buf.pixel(0, 170), Some(Rgba8::WHITE));
    }

    #[test]
    fn disc_far_outside_lands_on_edge() {
        let mut buf = blank();
        buf.fill_disc(-1.0e6, 1.0e6, 5.0, Rgba8::RED);
        assert_eq!(buf.pixel(0, 179), Some(Rgba8::RED));
    }

    #[test]
    fn disc_with_nan_is_noop() {
        let mut buf = blank();
        assert_eq!(buf.fill_disc(f32::NAN, 10.0, 5.0, Rgba8::RED), 0);
        assert!(!buf.is_dirty());
    }

    #[test]
    fn clamp_point_keeps_last_pixel() {
        let buf = blank();
        assert_eq!(buf.clamp_point(0.0, 180.0), (0.0, 179.0));
        assert_eq!(buf.clamp_point(400.0, -3.0), (319.0, 0.0));
        assert_eq!(buf.clamp_point(160.0, 90.0), (160.0, 90.0));
    }

    // ── blit_mask ─────────────────────────────────────────────────────────

    #[test]
    fn blit_mask_tints_covered_pixels() {
        let mut buf = blank();
        let mask = [255u8, 0, 0, 255];
        buf.blit_mask(10, 20, 2, 2, &mask, Rgba8::BLACK);
        assert_eq!(buf.pixel(10, 20), Some(Rgba8::BLACK));
        assert_eq!(buf.pixel(11, 20), Some(Rgba8::WHITE));
        assert_eq!(buf.pixel(11, 21), Some(Rgba8::BLACK));
        assert!(buf.is_dirty());
    }

    #[test]
    fn blit_mask_clips_negative_origin() {
        let mut buf = blank();
        let mask = [255u8; 9];
        buf.blit_mask(-2, -2, 3, 3, &mask, Rgba8::BLACK);
        assert_eq!(buf.pixel(0, 0), Some(Rgba8::BLACK));
        assert_eq!(buf.pixel(1, 0), Some(Rgba8::WHITE));
    }
}
