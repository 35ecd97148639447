//! The footer: the root address table of a note file.
//!
//! # Footer Structure
//! ```text
//! [.. end - address_width]  footer block: <FILE_FEATURE:24><PAGE1:1024><COVER_0:0>...
//! [address_width bytes]     trailer: absolute address of the footer block
//! ```
//!
//! Keys are grouped by their first `_` (`FILE_FEATURE` -> `FILE`/`FEATURE`);
//! page keys carry no delimiter and are grouped by their `PAGE` prefix.

use log::debug;

use crate::snote::types::error::Result;
use crate::snote::types::models::{Footer, TagMap, TagValue};
use crate::snote::utils;

use super::source::NoteSource;
use super::tags;

const DELIMITER: &str = "_";
const NUMBERED_PREFIXES: &[&str] = &["PAGE"];

/// Locates the footer through the trailer and parses it.
pub fn parse(source: &NoteSource) -> Result<Footer> {
    let bytes = source.bytes();
    let width = source.layout().address_width;
    let trailer = (bytes.len() as u64).saturating_sub(width as u64);
    let address = utils::read_uint_le(bytes, trailer, width)?;
    debug!("Footer address: {:#x}", address);

    let tags = source.tags_at(address)?;
    let footer = build_footer(&tags);

    debug!(
        "Footer parsed: {} pages, {} keyword groups, {} title groups, {} style entries",
        footer.page.len(),
        footer.keyword.len(),
        footer.title.len(),
        footer.style.len()
    );
    Ok(footer)
}

/// Overlays the grouped footer tags onto the default footer.
///
/// A group present in the file replaces the default group as a whole, so a
/// file declaring only `COVER_1` has no `COVER_0` entry.
fn build_footer(tags: &TagMap) -> Footer {
    let mut footer = Footer::default();

    for (group, fields) in tags::group_nested(tags, DELIMITER, NUMBERED_PREFIXES) {
        match group.as_str() {
            "FILE" => footer.file = fields,
            "COVER" => footer.cover = fields,
            "STYLE" => footer.style = fields,
            "PAGE" => footer.page = fields,
            "KEYWORD" => {
                footer.keyword = fields
                    .into_iter()
                    .map(|(key, value)| (key, TagValue::Single(value)))
                    .collect()
            }
            "TITLE" => {
                footer.title = fields
                    .into_iter()
                    .map(|(key, value)| (key, TagValue::Single(value)))
                    .collect()
            }
            _ => {
                footer.extra.insert(group, fields);
            }
        }
    }

    // Repeated keyword/title tags are lists, which nested grouping skips
    for (key, value) in tags.iter() {
        if !matches!(value, TagValue::List(_)) {
            continue;
        }
        if let Some(field) = key.strip_prefix("KEYWORD_").filter(|f| !f.is_empty()) {
            footer.keyword.insert(field.to_owned(), value.clone());
        } else if let Some(field) = key.strip_prefix("TITLE_").filter(|f| !f.is_empty()) {
            footer.title.insert(field.to_owned(), value.clone());
        }
    }

    footer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snote::types::models::NoteLayout;

    #[test]
    fn defaults_when_empty() {
        let footer = build_footer(&TagMap::new());
        assert_eq!(footer, Footer::default());
        assert_eq!(footer.file["FEATURE"], "24");
        assert_eq!(footer.cover["0"], "0");
    }

    #[test]
    fn groups_and_overlays() {
        let tags = tags::extract_tags(
            "<FILE_FEATURE:30><PAGE1:100><PAGE2:200><COVER_1:50><STYLE_style_white:7><DIRTY_X:1>",
        );
        let footer = build_footer(&tags);
        assert_eq!(footer.file["FEATURE"], "30");
        assert_eq!(footer.page.len(), 2);
        assert_eq!(footer.page["2"], "200");
        assert_eq!(footer.cover.get("0"), None);
        assert_eq!(footer.cover["1"], "50");
        assert_eq!(footer.style["style_white"], "7");
        assert_eq!(footer.extra["DIRTY"]["X"], "1");
    }

    #[test]
    fn collects_keyword_lists() {
        let tags = tags::extract_tags(
            "<KEYWORD_0001:10><KEYWORD_0002:20><KEYWORD_0002:30><TITLE_9:40><TITLE_9:50>",
        );
        let footer = build_footer(&tags);
        assert_eq!(footer.keyword["0001"], TagValue::Single("10".into()));
        assert_eq!(
            footer.keyword["0002"],
            TagValue::List(vec!["20".into(), "30".into()])
        );
        assert_eq!(footer.title["9"], TagValue::List(vec!["40".into(), "50".into()]));
    }

    #[test]
    fn trailer_beyond_buffer_fails() {
        let source = NoteSource::new(&[1, 2], NoteLayout::default());
        assert!(parse(&source).is_err());
    }
}
