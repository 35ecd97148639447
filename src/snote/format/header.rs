//! The header block: device and application metadata.

use log::debug;

use crate::snote::types::error::Result;
use crate::snote::types::models::{Footer, Header, TagMap};
use crate::snote::utils;

use super::source::NoteSource;

/// Header address used when the footer does not name one.
pub const DEFAULT_HEADER_ADDRESS: u64 = 24;

/// Parses the header block named by `FILE_FEATURE` in the footer.
pub fn parse(source: &NoteSource, footer: &Footer) -> Result<Header> {
    let address = match footer.file.get("FEATURE") {
        Some(value) => utils::parse_address(value)?,
        None => DEFAULT_HEADER_ADDRESS,
    };
    debug!("Header address: {:#x}", address);

    let header = build_header(source.tags_at(address)?);
    debug!(
        "Header parsed: type={}, equipment={}, app version={}",
        header.file_type, header.apply_equipment, header.app_version
    );
    Ok(header)
}

/// Overlays parsed tags onto the default header.
///
/// Unknown tags are kept in `extra`; a repeated known tag keeps its last value.
fn build_header(tags: TagMap) -> Header {
    let mut header = Header::default();
    let mut extra = TagMap::new();

    for (key, value) in tags.iter() {
        let slot = match key {
            "MODULE_LABEL" => &mut header.module_label,
            "FILE_TYPE" => &mut header.file_type,
            "APPLY_EQUIPMENT" => &mut header.apply_equipment,
            "FINAL_OPERATION_PAGE" => &mut header.final_operation_page,
            "FINAL_OPERATION_LAYER" => &mut header.final_operation_layer,
            "ORIGINAL_STYLE" => &mut header.original_style,
            "ORIGINAL_STYLEMD5" => &mut header.original_style_md5,
            "DEVICE_DPI" => &mut header.device_dpi,
            "SOFT_DPI" => &mut header.soft_dpi,
            "FILE_PARSE_TYPE" => &mut header.file_parse_type,
            "RATTA_ETMD" => &mut header.ratta_etmd,
            "APP_VERSION" => &mut header.app_version,
            "FILE_RECOGN_TYPE" => &mut header.file_recogn_type,
            _ => {
                for occurrence in value.values() {
                    extra.append(key, occurrence);
                }
                continue;
            }
        };
        *slot = value.last().to_owned();
    }

    header.extra = extra;
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snote::format::tags::extract_tags;

    #[test]
    fn missing_fields_default_to_zero() {
        let header = build_header(extract_tags("<FILE_TYPE:NOTE><APPLY_EQUIPMENT:N6>"));
        assert_eq!(header.file_type, "NOTE");
        assert_eq!(header.apply_equipment, "N6");
        assert_eq!(header.module_label, "0");
        assert_eq!(header.file_recogn_type, "0");
        assert!(header.extra.is_empty());
    }

    #[test]
    fn unknown_tags_are_kept() {
        let header = build_header(extract_tags("<APP_VERSION:1><APP_VERSION:2><PDFSTYLE:none>"));
        assert_eq!(header.app_version, "2");
        assert_eq!(header.extra.value("PDFSTYLE"), Some("none"));
    }
}
