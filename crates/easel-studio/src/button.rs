//! The session entry button drawn in the window's top-right corner.

use easel_engine::coords::{ScreenRect, Viewport};
use glam::Vec2;
use easel_engine::text::{FontId, FontSystem};
use easel_engine::xr::XrSupport;
use easel_paint::{Rgba8, SurfaceBuffer};

pub const BUTTON_WIDTH: u32 = 200;
pub const BUTTON_HEIGHT: u32 = 40;
const MARGIN: f32 = 20.0;
const LABEL_PX: f32 = 16.0;

const FILL: Rgba8 = Rgba8::new(0x00, 0x00, 0x00, 0x66);
const BORDER: Rgba8 = Rgba8::WHITE;
const TEXT: Rgba8 = Rgba8::WHITE;

/// What clicking the button would do.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EntryState {
    /// Flat mode; a session can be requested.
    Available,
    /// An immersive session is running.
    Active,
    /// Capability check said no, or the last entry attempt failed.
    Unavailable,
}

impl EntryState {
    pub fn from_support(support: XrSupport) -> Self {
        if support.is_unsupported() {
            Self::Unavailable
        } else {
            Self::Available
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Available => "ENTER VR",
            Self::Active => "EXIT VR",
            Self::Unavailable => "VR NOT SUPPORTED",
        }
    }
}

/// Button state plus its rasterized face.
#[derive(Debug)]
pub struct EntryButton {
    state: EntryState,
    face: SurfaceBuffer,
}

impl EntryButton {
    pub fn new(state: EntryState, fonts: &FontSystem, font: Option<FontId>) -> Self {
        Self {
            state,
            face: render_face(state, fonts, font),
        }
    }

    #[inline]
    pub fn state(&self) -> EntryState {
        self.state
    }

    /// Switches state, redrawing the face if it changed.
    pub fn set_state(&mut self, state: EntryState, fonts: &FontSystem, font: Option<FontId>) {
        if state != self.state {
            log::debug!("entry button: {} -> {}", self.state.label(), state.label());
            self.state = state;
            self.face = render_face(state, fonts, font);
        }
    }

    /// Face pixels pending upload, if redrawn since the last call.
    pub fn take_face_upload(&mut self) -> Option<&SurfaceBuffer> {
        if self.face.take_dirty() {
            Some(&self.face)
        } else {
            None
        }
    }

    /// Placement in logical pixels for the current window size.
    pub fn rect(viewport: Viewport) -> ScreenRect {
        let size = Vec2::new(BUTTON_WIDTH as f32, BUTTON_HEIGHT as f32);
        ScreenRect::top_right(viewport, size, MARGIN)
    }

    pub fn hit(viewport: Viewport, x: f32, y: f32) -> bool {
        Self::rect(viewport).contains(Vec2::new(x, y))
    }
}

fn render_face(state: EntryState, fonts: &FontSystem, font: Option<FontId>) -> SurfaceBuffer {
    let mut face = SurfaceBuffer::new(BUTTON_WIDTH, BUTTON_HEIGHT, FILL);

    // 1px border.
    let edge = [BORDER.a; BUTTON_WIDTH as usize];
    face.blit_mask(0, 0, BUTTON_WIDTH, 1, &edge, BORDER);
    face.blit_mask(0, BUTTON_HEIGHT as i32 - 1, BUTTON_WIDTH, 1, &edge, BORDER);
    let side = [BORDER.a; BUTTON_HEIGHT as usize];
    face.blit_mask(0, 0, 1, BUTTON_HEIGHT, &side, BORDER);
    face.blit_mask(BUTTON_WIDTH as i32 - 1, 0, 1, BUTTON_HEIGHT, &side, BORDER);

    let mask = font.and_then(|id| fonts.rasterize_line(state.label(), id, LABEL_PX));
    if let Some(mask) = mask {
        let left = (BUTTON_WIDTH as i32 - mask.width as i32) / 2;
        let top = (BUTTON_HEIGHT as i32 - mask.height as i32) / 2;
        face.blit_mask(left, top, mask.width, mask.height, &mask.coverage, TEXT);
    }

    face
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(state: EntryState) -> EntryButton {
        EntryButton::new(state, &FontSystem::new(), None)
    }

    // ── labels ────────────────────────────────────────────────────────────

    #[test]
    fn support_maps_to_initial_state() {
        assert_eq!(EntryState::from_support(XrSupport::Supported), EntryState::Available);
        assert_eq!(EntryState::from_support(XrSupport::Unknown), EntryState::Available);
        assert_eq!(
            EntryState::from_support(XrSupport::Unsupported),
            EntryState::Unavailable
        );
    }

    #[test]
    fn labels() {
        assert_eq!(EntryState::Available.label(), "ENTER VR");
        assert_eq!(EntryState::Active.label(), "EXIT VR");
        assert_eq!(EntryState::Unavailable.label(), "VR NOT SUPPORTED");
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn sits_in_top_right_corner() {
        let vp = Viewport::new(1280.0, 720.0);
        let r = EntryButton::rect(vp);
        assert_eq!(r.max().x, 1260.0);
        assert_eq!(r.min.y, 20.0);

        assert!(EntryButton::hit(vp, 1250.0, 30.0));
        assert!(!EntryButton::hit(vp, 100.0, 30.0));
        assert!(!EntryButton::hit(vp, 1250.0, 70.0));
    }

    // ── face ──────────────────────────────────────────────────────────────

    #[test]
    fn face_uploads_once_per_change() {
        let mut b = button(EntryState::Available);
        assert!(b.take_face_upload().is_some());
        assert!(b.take_face_upload().is_none());

        b.set_state(EntryState::Available, &FontSystem::new(), None);
        assert!(b.take_face_upload().is_none());

        b.set_state(EntryState::Active, &FontSystem::new(), None);
        assert_eq!(b.state(), EntryState::Active);
        assert!(b.take_face_upload().is_some());
    }

    #[test]
    fn face_has_border_and_translucent_fill() {
        let mut b = button(EntryState::Unavailable);
        let face = b.take_face_upload().unwrap();
        assert_eq!(face.width(), BUTTON_WIDTH);
        assert_eq!(face.pixel(0, 0), Some(BORDER));
        assert_eq!(face.pixel(BUTTON_WIDTH - 1, BUTTON_HEIGHT - 1), Some(BORDER));
        assert_eq!(face.pixel(BUTTON_WIDTH / 2, BUTTON_HEIGHT / 2), Some(FILL));
    }
}
