use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

/// 8-bit coverage for a line of text.
///
/// Row 0 is the top of the line box; `baseline` is measured down from it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMask {
    pub width: u32,
    pub height: u32,
    pub baseline: f32,
    pub coverage: Vec<u8>,
}

impl TextMask {
    pub(crate) fn new(width: u32, height: u32, baseline: f32) -> Self {
        Self {
            width,
            height,
            baseline,
            coverage: vec![0; width as usize * height as usize],
        }
    }

    pub fn coverage_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.coverage[(y * self.width + x) as usize]
    }

    /// Max-combines a glyph bitmap with its top-left corner at (`left`, `top`).
    pub(crate) fn stamp(&mut self, left: i32, top: i32, gw: usize, gh: usize, bitmap: &[u8]) {
        for gy in 0..gh {
            let y = top + gy as i32;
            if y < 0 || y >= self.height as i32 {
                continue;
            }
            for gx in 0..gw {
                let x = left + gx as i32;
                if x < 0 || x >= self.width as i32 {
                    continue;
                }
                let Some(&c) = bitmap.get(gy * gw + gx) else { continue };
                let dst = &mut self.coverage[y as usize * self.width as usize + x as usize];
                *dst = (*dst).max(c);
            }
        }
    }
}

pub(crate) fn rasterize_line(font: &fontdue::Font, text: &str, px: f32) -> Option<TextMask> {
    if !(px.is_finite() && px > 0.0) {
        return None;
    }

    let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings::default());
    layout.append(&[font], &TextStyle::new(text, px, 0));

    let baseline = layout
        .lines()
        .and_then(|lines| lines.first().map(|l| l.baseline_y))
        .unwrap_or(px);

    let glyphs = layout.glyphs();
    let visible = || glyphs.iter().filter(|g| g.width > 0 && g.height > 0);

    let width = visible().map(|g| g.x + g.width as f32).fold(0.0f32, f32::max).ceil();
    let height = visible().map(|g| g.y + g.height as f32).fold(0.0f32, f32::max).ceil();
    if width < 1.0 || height < 1.0 {
        return None;
    }

    let mut mask = TextMask::new(width as u32, height as u32, baseline);
    for g in visible() {
        let (metrics, bitmap) = font.rasterize_config(g.key);
        mask.stamp(
            g.x.round() as i32,
            g.y.round() as i32,
            metrics.width,
            metrics.height,
            &bitmap,
        );
    }

    log::trace!("rasterized {:?} at {px}px: {}x{}", text, mask.width, mask.height);
    Some(mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_clips_and_keeps_max() {
        let mut mask = TextMask::new(4, 3, 2.0);
        mask.stamp(-1, 1, 2, 2, &[9, 200, 9, 50]);
        mask.stamp(0, 1, 1, 1, &[100]);

        assert_eq!(mask.coverage_at(0, 1), 200);
        assert_eq!(mask.coverage_at(0, 2), 50);
        assert_eq!(mask.coverage_at(1, 1), 0);
        assert_eq!(mask.coverage_at(9, 9), 0);
    }
}
