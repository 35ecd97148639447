//! Parser for the `LAYERINFO` page tag.
//!
//! The tag holds one brace-delimited record per layer, with `"key"#value` pairs
//! separated by commas (`#` stands in for `:`, which tags cannot contain):
//!
//! ```text
//! [{"layerId"#0,"name"#"Main layer","isVisible"#true},{"layerId"#-1,...}]
//! ```

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use super::super::types::error::{Result, SnoteError};
use super::super::types::models::LayerInfo;

static RECORD_PATTERN: OnceLock<Regex> = OnceLock::new();
static PAIR_PATTERN: OnceLock<Regex> = OnceLock::new();

fn record_regex() -> &'static Regex {
    RECORD_PATTERN.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("Invalid layer record pattern"))
}

fn pair_regex() -> &'static Regex {
    PAIR_PATTERN.get_or_init(|| {
        Regex::new(r##""([^"\[{}\]]+)"#"?([^"\[{}\],]+)"##).expect("Invalid layer pair pattern")
    })
}

/// Parses every `{...}` record of a `LAYERINFO` value, in source order.
pub fn parse_layer_info(content: &str) -> Result<Vec<LayerInfo>> {
    record_regex()
        .captures_iter(content)
        .map(|record| {
            let fields: HashMap<&str, &str> = pair_regex()
                .captures_iter(&record[1])
                .filter_map(|pair| Some((pair.get(1)?.as_str(), pair.get(2)?.as_str())))
                .collect();
            build_layer_info(&fields)
        })
        .collect()
}

/// Projects the raw pairs of one record onto the fixed `LayerInfo` shape.
fn build_layer_info(fields: &HashMap<&str, &str>) -> Result<LayerInfo> {
    let layer_id = match fields.get("layerId") {
        Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
            SnoteError::MalformedRecord(format!("Invalid layer id in LAYERINFO: {:?}", raw))
        })?,
        None => 0,
    };
    let flag = |key: &str| fields.get(key).is_some_and(|value| *value == "true");

    Ok(LayerInfo {
        layer_id,
        name: fields
            .get("name")
            .map(|name| (*name).to_owned())
            .unwrap_or_else(|| "Main layer".to_owned()),
        is_background_layer: flag("isBackgroundLayer"),
        is_allow_add: flag("isAllowAdd"),
        is_current_layer: flag("isCurrentLayer"),
        is_visible: flag("isVisible"),
        is_deleted: flag("isDeleted"),
        is_allow_up: flag("isAllowUp"),
        is_allow_down: flag("isAllowDown"),
    })
}
