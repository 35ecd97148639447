use log::{debug, info};

use super::codec::RattaRleDecoder;
use super::format;
use super::format::source::NoteSource;
use super::types::error::Result;
use super::types::models::*;
use super::types::palette::Palette;

/// Parses a whole note file held in memory.
///
/// Each stage reads from the buffer and returns its own part of the document;
/// the [`Document`] is only assembled once every stage has succeeded.
///
/// # Errors
/// Returns an error if:
/// - The layout widths are outside `1..=8`
/// - The file does not start with a `noteSN_FILE_VER_` signature
/// - Any address or length points outside the buffer
/// - A layer-info record, layer name, address or recognized-text block is malformed
pub fn parse_document_with(buffer: &[u8], layout: NoteLayout) -> Result<Document<'_>> {
    layout.validate()?;
    info!("Parsing note file: {} bytes", buffer.len());
    let source = NoteSource::new(buffer, layout);

    let (signature, version) = format::signature::parse(buffer)?;
    info!("Signature {} (version {})", signature, version);

    let footer = format::footer::parse(&source)?;
    let header = format::header::parse(&source, &footer)?;
    let pages = format::page::parse_pages(&source, &footer)?;
    let cover = format::records::parse_cover(&source, &footer)?;
    let keywords = format::records::parse_keywords(&source, &footer)?;
    let titles = format::records::parse_titles(&source, &footer)?;
    debug!(
        "{} keyword groups, {} title groups",
        keywords.len(),
        titles.len()
    );

    info!(
        "Note parsed: {} pages, device {}, app {}",
        pages.len(),
        header.apply_equipment,
        header.app_version
    );

    Ok(Document {
        layout,
        signature,
        version,
        footer,
        header,
        pages,
        cover,
        keywords,
        titles,
    })
}

impl<'a> Document<'a> {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page by 1-based number, the numbering used by `FINAL_OPERATION_PAGE`.
    pub fn page(&self, number: usize) -> Option<&Page<'a>> {
        number.checked_sub(1).and_then(|index| self.pages.get(index))
    }

    /// Decodes the RATTA_RLE layers of the page at `page_index` (0-based),
    /// bottom to top.
    ///
    /// Layers without bitmap data and the PNG background of a `user_*`
    /// template page are skipped. An index past the last page yields no layers.
    pub fn decode_page_layers(
        &self,
        page_index: usize,
        palette: Option<&Palette>,
    ) -> Result<Vec<(LayerName, Vec<u8>)>> {
        let Some(page) = self.pages.get(page_index) else {
            return Ok(Vec::new());
        };
        let decoder = RattaRleDecoder::new(palette);
        let custom_background = page.custom_background().is_some();

        page.layers_in_paint_order()
            .filter(|layer| !(custom_background && layer.name == LayerName::Background))
            .filter_map(|layer| layer.bitmap().map(|bitmap| (layer.name, bitmap)))
            .map(|(name, bitmap)| {
                debug!("Decoding page {} {}: {} bytes", page.key, name, bitmap.len());
                let rgba = decoder.decode(
                    bitmap,
                    self.layout.page_width,
                    self.layout.page_height,
                    false,
                )?;
                Ok((name, rgba))
            })
            .collect()
    }
}
