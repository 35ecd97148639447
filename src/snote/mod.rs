//! Core Supernote note reader module

pub mod codec;
pub mod format;
pub mod types;
mod reader;
mod utils;

pub use codec::RattaRleDecoder;
pub use reader::parse_document_with;
pub use types::error::{Result, SnoteError};
pub use types::models;
pub use types::palette;

use types::models::{Document, NoteLayout};
use types::palette::Palette;

/// Parses a note file laid out for the Supernote X series.
///
/// See [`parse_document_with`] for other page geometries and field widths.
pub fn parse_document(buffer: &[u8]) -> Result<Document<'_>> {
    parse_document_with(buffer, NoteLayout::default())
}

/// Decodes one RATTA_RLE layer bitmap into `width * height * 4` RGBA bytes.
///
/// `palette` falls back to [`Palette::default`]; `blank` selects the shorter
/// special run length used on blank pages.
pub fn decode_layer(
    bytes: &[u8],
    width: usize,
    height: usize,
    palette: Option<&Palette>,
    blank: bool,
) -> Result<Vec<u8>> {
    RattaRleDecoder::new(palette).decode(bytes, width, height, blank)
}
