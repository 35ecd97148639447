//! Cover, keyword and title records addressed from the footer.

use std::collections::BTreeMap;

use log::debug;

use crate::snote::types::error::Result;
use crate::snote::types::models::{Cover, Footer, Keyword, Rect, TagMap, TagValue, Title};
use crate::snote::utils;

use super::source::NoteSource;

/// Resolves the cover bitmap from `COVER_0`, or `COVER_1` when `COVER_0` is
/// missing. A zero address means the note has no cover.
pub fn parse_cover<'a>(source: &NoteSource<'a>, footer: &Footer) -> Result<Option<Cover<'a>>> {
    let Some(value) = footer.cover.get("0").or_else(|| footer.cover.get("1")) else {
        return Ok(None);
    };
    let address = utils::parse_address(value)?;
    let cover = source
        .block(address)?
        .map(|bitmap_buffer| Cover { bitmap_buffer });
    debug!("Cover: {}", if cover.is_some() { "present" } else { "absent" });
    Ok(cover)
}

/// Parses every keyword record, grouped by footer key.
pub fn parse_keywords<'a>(
    source: &NoteSource<'a>,
    footer: &Footer,
) -> Result<BTreeMap<String, Vec<Keyword<'a>>>> {
    parse_grouped(source, &footer.keyword, parse_keyword)
}

/// Parses every title record, grouped by footer key.
pub fn parse_titles<'a>(
    source: &NoteSource<'a>,
    footer: &Footer,
) -> Result<BTreeMap<String, Vec<Title<'a>>>> {
    parse_grouped(source, &footer.title, parse_title)
}

fn parse_grouped<'a, T>(
    source: &NoteSource<'a>,
    entries: &BTreeMap<String, TagValue>,
    parse_one: fn(&NoteSource<'a>, u64) -> Result<T>,
) -> Result<BTreeMap<String, Vec<T>>> {
    entries
        .iter()
        .map(|(key, addresses)| {
            let records = addresses
                .values()
                .map(|address| parse_one(source, utils::parse_address(address)?))
                .collect::<Result<Vec<T>>>()?;
            Ok((key.clone(), records))
        })
        .collect()
}

/// Parses one keyword block; its bitmap is addressed by `KEYWORDSITE`.
pub fn parse_keyword<'a>(source: &NoteSource<'a>, address: u64) -> Result<Keyword<'a>> {
    let tags = source.tags_at(address)?;
    let field = |key: &str, default: &str| tags.value(key).unwrap_or(default).to_owned();

    let keyword = Keyword {
        seq_no: field("KEYWORDSEQNO", "0"),
        page: field("KEYWORDPAGE", "1"),
        rect: parse_rect(&tags, "KEYWORDRECT"),
        rect_ori: parse_rect(&tags, "KEYWORDRECTORI"),
        site: field("KEYWORDSITE", "0"),
        len: field("KEYWORDLEN", "0"),
        keyword: field("KEYWORD", ""),
        bitmap_buffer: None,
    };
    let bitmap_buffer = source.tagged_block(Some(keyword.site.as_str()))?;
    Ok(Keyword { bitmap_buffer, ..keyword })
}

/// Parses one title block; its bitmap is addressed by `TITLEBITMAP`.
pub fn parse_title<'a>(source: &NoteSource<'a>, address: u64) -> Result<Title<'a>> {
    let tags = source.tags_at(address)?;
    let field = |key: &str, default: &str| tags.value(key).unwrap_or(default).to_owned();

    let title = Title {
        seq_no: field("TITLESEQNO", "0"),
        level: field("TITLELEVEL", "1"),
        rect: parse_rect(&tags, "TITLERECT"),
        rect_ori: parse_rect(&tags, "TITLERECTORI"),
        bitmap: field("TITLEBITMAP", "0"),
        protocol: field("TITLEPROTOCOL", "RATTA_RLE"),
        style: field("TITLESTYLE", "1000254"),
        bitmap_buffer: None,
    };
    let bitmap_buffer = source.tagged_block(Some(title.bitmap.as_str()))?;
    Ok(Title { bitmap_buffer, ..title })
}

/// Splits a comma-separated rectangle, padding missing coordinates with `"0"`.
fn parse_rect(tags: &TagMap, key: &str) -> Rect {
    let mut parts = tags.value(key).unwrap_or_default().split(',').map(str::trim);
    std::array::from_fn(|_| match parts.next() {
        Some(part) if !part.is_empty() => part.to_owned(),
        _ => "0".to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snote::format::tags::extract_tags;

    #[test]
    fn rect_pads_and_truncates() {
        let tags = extract_tags("<A:1,2,3,4,5><B:7,8>");
        assert_eq!(parse_rect(&tags, "A"), ["1", "2", "3", "4"].map(String::from));
        assert_eq!(parse_rect(&tags, "B"), ["7", "8", "0", "0"].map(String::from));
        assert_eq!(parse_rect(&tags, "C"), ["0", "0", "0", "0"].map(String::from));
    }
}
