//! `<KEY:VALUE>` tag scanning and nested key grouping.
//!
//! Footer, header, page, layer, keyword and title blocks are plain text made of
//! tags such as `<FILE_FEATURE:24><PAGE1:1024>`. Anything between tags, and any
//! `<` that does not open a well-formed tag, is ignored.

use super::super::types::models::{NestedMap, TagMap};

/// Extracts every `<key:value>` tag from `text`.
///
/// Keys and values are non-empty and may not contain `:`, `<` or `>`. A key seen
/// more than once collects its values into a list.
pub fn extract_tags(text: &str) -> TagMap {
    let bytes = text.as_bytes();
    let mut tags = TagMap::new();
    let mut pos = 0;

    while let Some(found) = bytes[pos..].iter().position(|&b| b == b'<') {
        let open = pos + found;
        match match_tag(bytes, open + 1) {
            Some((key_end, value_end)) => {
                tags.append(&text[open + 1..key_end], &text[key_end + 1..value_end]);
                pos = value_end + 1;
            }
            // Retry from the next '<'
            None => pos = open + 1,
        }
    }

    tags
}

/// Matches `key:value>` starting right after a `<`.
///
/// Returns the positions of the `:` and of the closing `>`.
fn match_tag(bytes: &[u8], start: usize) -> Option<(usize, usize)> {
    let key_end = scan_field(bytes, start);
    if key_end == start || bytes.get(key_end) != Some(&b':') {
        return None;
    }
    let value_end = scan_field(bytes, key_end + 1);
    if value_end == key_end + 1 || bytes.get(value_end) != Some(&b'>') {
        return None;
    }
    Some((key_end, value_end))
}

fn scan_field(bytes: &[u8], start: usize) -> usize {
    start
        + bytes[start..]
            .iter()
            .take_while(|&&b| !matches!(b, b':' | b'<' | b'>'))
            .count()
}

/// Groups flat keys into `group -> field -> value`.
///
/// A key containing `delimiter` is split at its first occurrence
/// (`FILE_FEATURE` -> `FILE`/`FEATURE`). Otherwise the first matching entry of
/// `prefixes` becomes the group (`PAGE12` -> `PAGE`/`12`). Keys matching neither
/// rule, keys with an empty group or field, and list-valued tags are skipped.
pub fn group_nested(tags: &TagMap, delimiter: &str, prefixes: &[&str]) -> NestedMap {
    let mut nested = NestedMap::new();

    for (key, value) in tags.iter() {
        let Some(value) = value.as_single() else {
            continue;
        };
        let split = key.split_once(delimiter).or_else(|| {
            prefixes
                .iter()
                .find(|prefix| key.starts_with(**prefix))
                .map(|prefix| (*prefix, &key[prefix.len()..]))
        });
        let Some((group, field)) = split else {
            continue;
        };
        if group.is_empty() || field.is_empty() {
            continue;
        }
        nested
            .entry(group.to_owned())
            .or_default()
            .insert(field.to_owned(), value.to_owned());
    }

    nested
}
