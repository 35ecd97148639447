//! Color palettes for RATTA_RLE bitmaps.
//!
//! Layer bitmaps store one color byte per run. The byte values are fixed by the
//! device; the RGBA color each one is rendered with is chosen by the caller.

use super::error::{Result, SnoteError};

/// An RGBA pixel.
pub type Rgba = [u8; 4];

/// Fully transparent black, used for the background slot and blank layers.
pub const TRANSPARENT: Rgba = [0, 0, 0, 0];
const BLACK: Rgba = [0, 0, 0, 255];
const DARK_GRAY: Rgba = [169, 169, 169, 255];
const GRAY: Rgba = [128, 128, 128, 255];
const WHITE: Rgba = [255, 255, 255, 255];

/// Number of bytes in a `width` x `height` RGBA image.
///
/// Fails with [`SnoteError::MalformedRecord`] when the size does not fit in `usize`.
pub fn rgba_len(width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(|| {
            SnoteError::MalformedRecord(format!(
                "Image of {}x{} pixels is too large",
                width, height
            ))
        })
}

/// Color bytes as they appear in RATTA_RLE streams.
pub mod encoded {
    pub const BLACK: u8 = 0x61;
    pub const BACKGROUND: u8 = 0x62;
    pub const DARK_GRAY: u8 = 0x63;
    pub const GRAY: u8 = 0x64;
    pub const WHITE: u8 = 0x65;
    pub const MARKER_BLACK: u8 = 0x66;
    pub const MARKER_DARK_GRAY: u8 = 0x67;
    pub const MARKER_GRAY: u8 = 0x68;
    pub const DARK_GRAY_X2: u8 = 0x9D;
    pub const GRAY_X2: u8 = 0xC9;
    pub const MARKER_DARK_GRAY_X2: u8 = 0x9E;
    pub const MARKER_GRAY_X2: u8 = 0xCA;
}

/// RGBA colors substituted for each encoded color slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgba,
    pub black: Rgba,
    pub dark_gray: Rgba,
    pub gray: Rgba,
    pub white: Rgba,
    pub marker_black: Rgba,
    pub marker_dark_gray: Rgba,
    pub marker_gray: Rgba,
    pub dark_gray_x2: Rgba,
    pub gray_x2: Rgba,
    pub marker_dark_gray_x2: Rgba,
    pub marker_gray_x2: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: TRANSPARENT,
            black: BLACK,
            dark_gray: DARK_GRAY,
            gray: GRAY,
            white: WHITE,
            marker_black: BLACK,
            marker_dark_gray: DARK_GRAY,
            marker_gray: GRAY,
            dark_gray_x2: DARK_GRAY,
            gray_x2: GRAY,
            marker_dark_gray_x2: DARK_GRAY,
            marker_gray_x2: GRAY,
        }
    }
}

impl Palette {
    /// Pairs every encoded color byte with its RGBA substitute.
    pub fn entries(&self) -> [(u8, Rgba); 12] {
        [
            (encoded::BLACK, self.black),
            (encoded::BACKGROUND, self.background),
            (encoded::DARK_GRAY, self.dark_gray),
            (encoded::GRAY, self.gray),
            (encoded::WHITE, self.white),
            (encoded::MARKER_BLACK, self.marker_black),
            (encoded::MARKER_DARK_GRAY, self.marker_dark_gray),
            (encoded::MARKER_GRAY, self.marker_gray),
            (encoded::DARK_GRAY_X2, self.dark_gray_x2),
            (encoded::GRAY_X2, self.gray_x2),
            (encoded::MARKER_DARK_GRAY_X2, self.marker_dark_gray_x2),
            (encoded::MARKER_GRAY_X2, self.marker_gray_x2),
        ]
    }
}
