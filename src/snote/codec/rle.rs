//! RATTA_RLE bitmap decoding.
//!
//! A layer bitmap is a stream of `(color, length)` byte pairs:
//!
//! ```text
//! length == 0xFF      run of a fixed special length (0x4000, or 0x400 for blank pages)
//! length & 0x80 != 0  held: merged with the next pair if it has the same color
//! otherwise           run of length + 1 pixels
//! ```
//!
//! A held pair followed by a pair of the same color forms one long run of
//! `1 + next + (((held & 0x7F) + 1) << 7)` pixels. Followed by a different color,
//! it is flushed on its own as `((held & 0x7F) + 1) << 7` pixels. A pair still
//! held at the end of the stream is sized to fit the remaining output.

use log::trace;

use super::super::types::error::{Result, SnoteError};
use super::super::types::palette::{self, Palette, Rgba, TRANSPARENT};

const SPECIAL_LENGTH_MARKER: u8 = 0xFF;
const SPECIAL_LENGTH: usize = 0x4000;
const SPECIAL_LENGTH_FOR_BLANK: usize = 0x400;
/// Upper bound on the output reserved before any run is decoded.
const MAX_INITIAL_CAPACITY: usize = 1 << 24;

/// A color to emit: an encoded color byte, or the transparent fill used for
/// substitute layers. The fill never appears in bitmap data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunColor {
    Encoded(u8),
    Transparent,
}

/// Decoder for RATTA_RLE layer bitmaps.
///
/// Holds the translation from encoded color bytes to RGBA, so one decoder can
/// be reused for every layer of a document.
#[derive(Debug, Clone)]
pub struct RattaRleDecoder {
    translation: [Option<Rgba>; 256],
}

impl Default for RattaRleDecoder {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RattaRleDecoder {
    /// Builds a decoder for `palette`, or for [`Palette::default`] when `None`.
    pub fn new(palette: Option<&Palette>) -> Self {
        let palette = palette.copied().unwrap_or_default();
        let mut translation = [None; 256];
        for (encoded, color) in palette.entries() {
            translation[encoded as usize] = Some(color);
        }
        Self { translation }
    }

    /// Decodes one layer into exactly `width * height * 4` RGBA bytes.
    ///
    /// `blank` selects the shorter special run length used on blank pages.
    ///
    /// # Errors
    /// - [`SnoteError::UnknownColor`] for a color byte outside the palette
    /// - [`SnoteError::LengthMismatch`] when the runs do not cover the page exactly
    /// - [`SnoteError::MalformedRecord`] when `width * height * 4` overflows
    pub fn decode(&self, bytes: &[u8], width: usize, height: usize, blank: bool) -> Result<Vec<u8>> {
        let mut out = RunWriter::new(palette::rgba_len(width, height)?);
        let mut held: Option<(u8, u8)> = None;
        let mut runs = 0usize;

        for pair in bytes.chunks_exact(2) {
            let (color, length) = (pair[0], pair[1]);

            if let Some((held_color, held_length)) = held.take() {
                if color == held_color {
                    let merged = 1 + length as usize + continuation_length(held_length);
                    self.emit(&mut out, RunColor::Encoded(color), merged)?;
                    runs += 1;
                    continue;
                }
                self.emit(&mut out, RunColor::Encoded(held_color), continuation_length(held_length))?;
                runs += 1;
            }

            if length == SPECIAL_LENGTH_MARKER {
                let special = if blank { SPECIAL_LENGTH_FOR_BLANK } else { SPECIAL_LENGTH };
                self.emit(&mut out, RunColor::Encoded(color), special)?;
            } else if length & 0x80 != 0 {
                held = Some((color, length));
                continue;
            } else {
                self.emit(&mut out, RunColor::Encoded(color), length as usize + 1)?;
            }
            runs += 1;
        }

        if let Some((color, length)) = held {
            let tail = adjust_tail_length(length, out.emitted, out.expected);
            trace!("Held tail pair {:#04x}/{:#04x} sized to {} pixels", color, length, tail);
            if tail > 0 {
                self.emit(&mut out, RunColor::Encoded(color), tail)?;
                runs += 1;
            }
        }

        trace!(
            "Decoded {} runs from {} bytes: {} of {} output bytes",
            runs,
            bytes.len(),
            out.emitted,
            out.expected
        );
        out.finish()
    }

    /// A fully transparent layer, for callers substituting a layer that failed
    /// to decode.
    pub fn blank(&self, width: usize, height: usize) -> Result<Vec<u8>> {
        let expected = palette::rgba_len(width, height)?;
        let mut out = RunWriter::new(expected);
        self.emit(&mut out, RunColor::Transparent, expected / 4)?;
        out.finish()
    }

    fn emit(&self, out: &mut RunWriter, color: RunColor, length: usize) -> Result<()> {
        let rgba = match color {
            RunColor::Transparent => TRANSPARENT,
            RunColor::Encoded(byte) => self.translation[byte as usize]
                .ok_or(SnoteError::UnknownColor(byte))?,
        };
        // Hide the color channels behind full transparency
        let rgba = if rgba[3] == 0 { TRANSPARENT } else { rgba };
        out.push(rgba, length);
        Ok(())
    }
}

/// Pixel count carried by a held length byte.
fn continuation_length(held_length: u8) -> usize {
    ((held_length & 0x7F) as usize + 1) << 7
}

/// Sizes a held pair left over at the end of the stream.
///
/// Tries `((length & 0x7F) + 1) << shift` for shifts 7 down to 0 and keeps the
/// first that fits the gap between the bytes emitted and the bytes expected.
/// Returns 0 when none fits.
fn adjust_tail_length(tail_length: u8, emitted: usize, expected: usize) -> usize {
    let Some(gap) = expected.checked_sub(emitted) else {
        return 0;
    };
    (0..=7)
        .rev()
        .map(|shift| ((tail_length & 0x7F) as usize + 1) << shift)
        .find(|&length| length <= gap)
        .unwrap_or(0)
}

/// Output buffer that never grows past the expected size but keeps counting,
/// so an over-long stream reports its real length.
struct RunWriter {
    pixels: Vec<u8>,
    expected: usize,
    emitted: usize,
}

impl RunWriter {
    fn new(expected: usize) -> Self {
        Self {
            pixels: Vec::with_capacity(expected.min(MAX_INITIAL_CAPACITY)),
            expected,
            emitted: 0,
        }
    }

    fn push(&mut self, rgba: Rgba, length: usize) {
        let room = (self.expected - self.pixels.len()) / 4;
        for _ in 0..length.min(room) {
            self.pixels.extend_from_slice(&rgba);
        }
        self.emitted = self.emitted.saturating_add(length.saturating_mul(4));
    }

    fn finish(self) -> Result<Vec<u8>> {
        if self.emitted != self.expected {
            return Err(SnoteError::LengthMismatch {
                actual: self.emitted,
                expected: self.expected,
            });
        }
        Ok(self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snote::types::palette::encoded;
    use proptest::prelude::*;

    const BLACK: Rgba = [0, 0, 0, 255];
    const DARK_GRAY: Rgba = [169, 169, 169, 255];

    fn pixels(runs: &[(Rgba, usize)]) -> Vec<u8> {
        runs.iter()
            .flat_map(|&(rgba, n)| std::iter::repeat_n(rgba, n).flatten())
            .collect()
    }

    fn decode(bytes: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
        RattaRleDecoder::default().decode(bytes, width, height, false)
    }

    #[test]
    fn plain_runs() {
        let out = decode(&[0x61, 0x02, 0x63, 0x00], 4, 1).unwrap();
        assert_eq!(out, pixels(&[(BLACK, 3), (DARK_GRAY, 1)]));
    }

    #[test]
    fn held_pair_merges_with_same_color() {
        let out = decode(&[0x61, 0x80, 0x61, 0x05], 134, 1).unwrap();
        assert_eq!(out, pixels(&[(BLACK, 134)]));
    }

    #[test]
    fn held_pair_flushes_before_other_color() {
        let out = decode(&[0x61, 0x80, 0x63, 0x05], 134, 1).unwrap();
        assert_eq!(out, pixels(&[(BLACK, 128), (DARK_GRAY, 6)]));
    }

    #[test]
    fn held_pair_flush_then_hold_again() {
        // Flushed held pair, then the new pair is held and merged with the next
        let out = decode(&[0x61, 0x80, 0x63, 0x80, 0x63, 0x00], 128 + 129, 1).unwrap();
        assert_eq!(out, pixels(&[(BLACK, 128), (DARK_GRAY, 129)]));
    }

    #[test]
    fn special_length_marker() {
        let out = decode(&[0x61, 0xFF], 128, 128).unwrap();
        assert_eq!(out.len(), 0x4000 * 4);
        assert!(out.chunks_exact(4).all(|px| px == BLACK));

        let blank = RattaRleDecoder::default()
            .decode(&[0x61, 0xFF], 32, 32, true)
            .unwrap();
        assert_eq!(blank.len(), 0x400 * 4);
    }

    #[test]
    fn tail_is_sized_to_the_largest_fitting_shift() {
        // Gap of 10 * 4 = 40 bytes: 1 << 7 and 1 << 6 are too large, 1 << 5 = 32 fits
        assert_eq!(adjust_tail_length(0x80, 0, 40), 32);
        assert_eq!(adjust_tail_length(0x80, 0, 512), 128);
        assert_eq!(adjust_tail_length(0x80, 40, 40), 0);
        assert_eq!(adjust_tail_length(0x80, 50, 40), 0);
    }

    #[test]
    fn held_tail_fills_the_page() {
        let out = decode(&[0x62, 0x05, 0x61, 0x80], 6 + 128, 1).unwrap();
        assert_eq!(out, pixels(&[(TRANSPARENT, 6), (BLACK, 128)]));
    }

    #[test]
    fn unknown_color_is_an_error() {
        assert_eq!(decode(&[0x99, 0x00], 1, 1), Err(SnoteError::UnknownColor(0x99)));
    }

    #[test]
    fn short_and_long_streams_are_rejected() {
        assert_eq!(
            decode(&[0x61, 0x00], 2, 1),
            Err(SnoteError::LengthMismatch { actual: 4, expected: 8 })
        );
        assert_eq!(
            decode(&[0x61, 0xFF], 2, 1),
            Err(SnoteError::LengthMismatch { actual: 0x4000 * 4, expected: 8 })
        );
    }

    #[test]
    fn trailing_odd_byte_is_ignored() {
        assert_eq!(decode(&[0x61, 0x00, 0x61], 1, 1).unwrap(), BLACK.to_vec());
    }

    #[test]
    fn transparent_colors_are_zeroed() {
        let palette = Palette {
            black: [10, 20, 30, 0],
            ..Palette::default()
        };
        let out = RattaRleDecoder::new(Some(&palette))
            .decode(&[encoded::BLACK, 0x01], 2, 1, false)
            .unwrap();
        assert_eq!(out, vec![0; 8]);
    }

    #[test]
    fn custom_palette_is_used() {
        let palette = Palette {
            gray_x2: [1, 2, 3, 4],
            ..Palette::default()
        };
        let out = RattaRleDecoder::new(Some(&palette))
            .decode(&[encoded::GRAY_X2, 0x00], 1, 1, false)
            .unwrap();
        assert_eq!(out, vec![1, 2, 3, 4]);
    }

    #[test]
    fn oversized_geometry_is_an_error() {
        assert!(matches!(
            decode(&[0x61, 0x00], usize::MAX / 2, 3),
            Err(SnoteError::MalformedRecord(_))
        ));
        assert!(matches!(
            RattaRleDecoder::default().blank(usize::MAX, 2),
            Err(SnoteError::MalformedRecord(_))
        ));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn large_page_with_short_stream_is_a_mismatch() {
        // 1 << 40 pixels fits in usize but is never allocated up front
        assert_eq!(
            decode(&[0x61, 0x00], 1 << 20, 1 << 20),
            Err(SnoteError::LengthMismatch { actual: 4, expected: 1 << 42 })
        );
    }

    #[test]
    fn blank_layer_is_transparent() {
        let out = RattaRleDecoder::default().blank(3, 2).unwrap();
        assert_eq!(out, vec![0; 24]);
    }

    fn palette_color(byte: u8) -> Rgba {
        Palette::default()
            .entries()
            .into_iter()
            .find(|(encoded, _)| *encoded == byte)
            .map(|(_, rgba)| rgba)
            .unwrap()
    }

    fn plain_pairs() -> impl Strategy<Value = Vec<(u8, u8)>> {
        let colors: Vec<u8> = Palette::default().entries().iter().map(|(e, _)| *e).collect();
        prop::collection::vec((prop::sample::select(colors), 0u8..0x80), 1..64)
    }

    proptest! {
        #[test]
        fn prop_plain_runs_concatenate(pairs in plain_pairs()) {
            let bytes: Vec<u8> = pairs.iter().flat_map(|&(c, l)| [c, l]).collect();
            let total: usize = pairs.iter().map(|&(_, l)| l as usize + 1).sum();
            let expected: Vec<u8> = pairs
                .iter()
                .flat_map(|&(c, l)| std::iter::repeat_n(palette_color(c), l as usize + 1).flatten())
                .collect();

            let out = decode(&bytes, total, 1).unwrap();
            prop_assert_eq!(out.len(), 4 * total);
            prop_assert_eq!(out, expected);
        }

        #[test]
        fn prop_success_means_exact_length(
            bytes in prop::collection::vec(any::<u8>(), 0..64),
            width in 1usize..64,
            height in 1usize..4,
        ) {
            if let Ok(out) = decode(&bytes, width, height) {
                prop_assert_eq!(out.len(), width * height * 4);
            }
        }
    }
}
