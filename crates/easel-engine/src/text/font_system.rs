use std::fmt;

use crate::text::raster::{self, TextMask};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontLoadError {
    Empty,
    /// fontdue rejected the data.
    Parse(&'static str),
}

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("font data is empty"),
            Self::Parse(why) => write!(f, "font data rejected: {why}"),
        }
    }
}

impl std::error::Error for FontLoadError {}

/// Opaque handle to a font loaded into a [`FontSystem`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub(crate) usize);

/// Owns a collection of loaded fonts.
///
/// Fonts are immutable after loading.
pub struct FontSystem {
    fonts: Vec<fontdue::Font>,
}

impl FontSystem {
    pub fn new() -> Self {
        Self { fonts: Vec::new() }
    }

    /// Parses and stores a TrueType or OpenType font from raw bytes.
    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        if bytes.is_empty() {
            return Err(FontLoadError::Empty);
        }
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(FontLoadError::Parse)?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        Ok(id)
    }

    pub(crate) fn get(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Rasterizes `text` on one line at `px` pixels into a coverage mask.
    ///
    /// Returns `None` for an unknown font or text with no visible glyphs.
    pub fn rasterize_line(&self, text: &str, id: FontId, px: f32) -> Option<TextMask> {
        let font = self.get(id)?;
        raster::rasterize_line(font, text, px)
    }
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}
