//! Page and layer blocks.
//!
//! A page block is a tag list naming its five layers, its paint order and the
//! addresses of its auxiliary blocks:
//!
//! ```text
//! <PAGESTYLE:style_white><MAINLAYER:2048><LAYER1:0><LAYER2:0><LAYER3:0><BGLAYER:4096>
//! <LAYERINFO:[{...},{...}]><LAYERSEQ:MAINLAYER,BGLAYER><TOTALPATH:0><RECOGNTEXT:0>...
//! ```
//!
//! Each layer address leads to a layer block whose `LAYERBITMAP` tag in turn
//! addresses the compressed bitmap.

use log::{debug, trace, warn};

use crate::snote::types::error::Result;
use crate::snote::types::models::{Footer, Layer, LayerName, Page, RecognitionStatus, TagMap};
use crate::snote::utils;

use super::layer_info;
use super::source::NoteSource;
use super::text;

/// Parses every page named in the footer, ordered by page key.
pub fn parse_pages<'a>(source: &NoteSource<'a>, footer: &Footer) -> Result<Vec<Page<'a>>> {
    // `footer.page` is a BTreeMap, so keys come out sorted
    footer
        .page
        .iter()
        .map(|(key, address)| parse_page(source, key, utils::parse_address(address)?))
        .collect()
}

/// Parses one page block and everything it addresses.
pub fn parse_page<'a>(source: &NoteSource<'a>, key: &str, address: u64) -> Result<Page<'a>> {
    debug!("Parsing page {} at {:#x}", key, address);
    let tags = source.tags_at(address)?;

    let layer = |name: LayerName| parse_layer(source, tags.value(name.as_str()), name);
    let main_layer = layer(LayerName::Main)?;
    let layer1 = layer(LayerName::Layer1)?;
    let layer2 = layer(LayerName::Layer2)?;
    let layer3 = layer(LayerName::Layer3)?;
    let bg_layer = layer(LayerName::Background)?;

    let layer_info = match tags.value("LAYERINFO") {
        Some(content) => layer_info::parse_layer_info(content)?,
        None => Vec::new(),
    };
    let layer_seq = match tags.value("LAYERSEQ") {
        Some(seq) => parse_layer_seq(seq)?,
        None => Vec::new(),
    };

    let text = parse_text(source, tags.value("RECOGNTEXT"))?;
    let total_path_buffer = source.tagged_block(tags.value("TOTALPATH"))?;

    let mut page = Page {
        key: key.to_owned(),
        address,
        page_style: "0".to_owned(),
        page_style_md5: "0".to_owned(),
        layer_switch: "0".to_owned(),
        total_path: "0".to_owned(),
        thumbnail_type: "0".to_owned(),
        recogn_status: RecognitionStatus::None,
        recogn_text: "0".to_owned(),
        recogn_file: "0".to_owned(),
        recogn_file_status: RecognitionStatus::None,
        main_layer,
        layer1,
        layer2,
        layer3,
        bg_layer,
        layer_info,
        layer_seq,
        text,
        total_path_buffer,
        extra: TagMap::new(),
    };
    overlay_page_fields(&mut page, &tags);

    for name in &page.layer_seq {
        if page.layer(*name).bitmap().is_none() {
            warn!("Page {}: {} is in LAYERSEQ but has no bitmap", key, name);
        }
    }
    trace!(
        "Page {}: style={}, {} layer infos, paint order {:?}",
        key,
        page.page_style,
        page.layer_info.len(),
        page.layer_seq
    );
    Ok(page)
}

/// Copies the scalar page tags over their defaults and keeps unknown tags.
fn overlay_page_fields(page: &mut Page, tags: &TagMap) {
    for (key, value) in tags.iter() {
        let last = value.last();
        match key {
            "PAGESTYLE" => page.page_style = last.to_owned(),
            "PAGESTYLEMD5" => page.page_style_md5 = last.to_owned(),
            "LAYERSWITCH" => page.layer_switch = last.to_owned(),
            "TOTALPATH" => page.total_path = last.to_owned(),
            "THUMBNAILTYPE" => page.thumbnail_type = last.to_owned(),
            "RECOGNSTATUS" => page.recogn_status = RecognitionStatus::from(last),
            "RECOGNTEXT" => page.recogn_text = last.to_owned(),
            "RECOGNFILE" => page.recogn_file = last.to_owned(),
            "RECOGNFILESTATUS" => page.recogn_file_status = RecognitionStatus::from(last),
            // Resolved into structured fields already
            "MAINLAYER" | "LAYER1" | "LAYER2" | "LAYER3" | "BGLAYER" | "LAYERINFO" | "LAYERSEQ" => {}
            _ => {
                for occurrence in value.values() {
                    page.extra.append(key, occurrence);
                }
            }
        }
    }
}

/// Parses a comma-separated `LAYERSEQ` value, bottom layer first.
fn parse_layer_seq(seq: &str) -> Result<Vec<LayerName>> {
    seq.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::parse::<LayerName>)
        .collect()
}

/// Resolves recognized text; `"0"` or a missing tag means none.
fn parse_text(source: &NoteSource, address: Option<&str>) -> Result<Option<String>> {
    let Some(address) = address.filter(|value| *value != "0") else {
        return Ok(None);
    };
    match source.tagged_block(Some(address))? {
        Some(block) => text::parse_recognized_text(block).map(Some),
        None => Ok(None),
    }
}

/// Parses the layer block at a tagged address.
///
/// `name` is used when the block does not carry its own `LAYERNAME`.
pub fn parse_layer<'a>(
    source: &NoteSource<'a>,
    address: Option<&str>,
    name: LayerName,
) -> Result<Layer<'a>> {
    let address = match address {
        Some(value) => utils::parse_address(value)?,
        None => 0,
    };
    let tags = source.tags_at(address)?;
    let mut layer = Layer::empty(name);

    for (key, value) in tags.iter() {
        let last = value.last();
        match key {
            "LAYERTYPE" => layer.layer_type = last.to_owned(),
            "LAYERPROTOCOL" => layer.protocol = last.to_owned(),
            "LAYERNAME" => layer.name = last.parse()?,
            "LAYERPATH" => layer.path = last.to_owned(),
            "LAYERBITMAP" => layer.bitmap = last.to_owned(),
            "LAYERVECTORGRAPH" => layer.vector_graph = last.to_owned(),
            "LAYERRECOGN" => layer.recogn = last.to_owned(),
            _ => {}
        }
    }

    layer.bitmap_buffer = source.tagged_block(Some(layer.bitmap.as_str()))?;
    trace!(
        "Layer {} at {:#x}: bitmap {} bytes",
        layer.name,
        address,
        layer.bitmap_buffer.map_or(0, <[u8]>::len)
    );
    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_seq_is_ordered_and_checked() {
        assert_eq!(
            parse_layer_seq("MAINLAYER,LAYER2,BGLAYER").unwrap(),
            vec![LayerName::Main, LayerName::Layer2, LayerName::Background]
        );
        assert!(parse_layer_seq("").unwrap().is_empty());
        assert!(parse_layer_seq("MAINLAYER,TOPLAYER").is_err());
    }
}
