//! Core data structures for the Supernote note format.
//!
//! This module defines the document model produced by the parser:
//! - Tag maps and their scalar/list values
//! - Footer, header, pages, layers and layer metadata
//! - Keywords, titles and the cover
//!
//! Every bitmap payload is a borrowed slice of the original file buffer.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use super::error::{Result, SnoteError};

/// Default page width of the Supernote X series, in pixels.
pub const DEFAULT_PAGE_WIDTH: usize = 1404;
/// Default page height of the Supernote X series, in pixels.
pub const DEFAULT_PAGE_HEIGHT: usize = 1872;

/// Geometry and field widths used to read a note file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteLayout {
    pub page_width: usize,
    pub page_height: usize,
    /// Width in bytes of the trailer holding the footer address.
    pub address_width: usize,
    /// Width in bytes of the length prefix of every addressed block.
    pub length_field_width: usize,
}

impl Default for NoteLayout {
    fn default() -> Self {
        Self {
            page_width: DEFAULT_PAGE_WIDTH,
            page_height: DEFAULT_PAGE_HEIGHT,
            address_width: 4,
            length_field_width: 4,
        }
    }
}

impl NoteLayout {
    /// Checks that both integer widths can be read as little-endian values and
    /// that the size of a decoded page fits in `usize`.
    pub fn validate(&self) -> Result<()> {
        self.page_bytes()?;
        for (name, width) in [
            ("address width", self.address_width),
            ("length field width", self.length_field_width),
        ] {
            if !(1..=8).contains(&width) {
                return Err(SnoteError::MalformedRecord(format!(
                    "{} must be between 1 and 8 bytes, got {}",
                    name, width
                )));
            }
        }
        Ok(())
    }

    /// Number of bytes in one decoded RGBA page.
    pub fn page_bytes(&self) -> Result<usize> {
        super::palette::rgba_len(self.page_width, self.page_height)
    }
}

/// The value of a `<KEY:VALUE>` tag.
///
/// A key seen once holds a single string; repeated keys coalesce into a list
/// in order of appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Single(String),
    List(Vec<String>),
}

impl TagValue {
    /// Returns the value if this tag appeared exactly once.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            TagValue::Single(value) => Some(value),
            TagValue::List(_) => None,
        }
    }

    /// Returns the most recent occurrence of the tag.
    pub fn last(&self) -> &str {
        match self {
            TagValue::Single(value) => value,
            TagValue::List(values) => values.last().map(String::as_str).unwrap_or_default(),
        }
    }

    /// Iterates over every occurrence of the tag.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            TagValue::Single(value) => std::slice::from_ref(value),
            TagValue::List(values) => values,
        };
        slice.iter().map(String::as_str)
    }

    fn push(&mut self, value: String) {
        match self {
            TagValue::Single(first) => {
                let first = std::mem::take(first);
                *self = TagValue::List(vec![first, value]);
            }
            TagValue::List(values) => values.push(value),
        }
    }
}

/// An ordered map of tags, keyed by tag name.
///
/// Iteration follows the order in which each key first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMap {
    entries: Vec<(String, TagValue)>,
    index: HashMap<String, usize>,
}

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one occurrence of `key`, coalescing repeats into a list.
    pub fn append(&mut self, key: &str, value: &str) {
        match self.index.get(key) {
            Some(&pos) => self.entries[pos].1.push(value.to_owned()),
            None => {
                self.index.insert(key.to_owned(), self.entries.len());
                self.entries
                    .push((key.to_owned(), TagValue::Single(value.to_owned())));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    /// Returns the last occurrence of `key`, if any.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(TagValue::last)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Two-level map produced by nested key grouping, e.g. `PAGE -> 1 -> "1024"`.
pub type NestedMap = BTreeMap<String, BTreeMap<String, String>>;

/// The root address table, stored at the end of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    /// `FILE_*` entries. `FEATURE` is the header address.
    pub file: BTreeMap<String, String>,
    /// `COVER_*` entries. Usually `0:0` or `1:<address>`.
    pub cover: BTreeMap<String, String>,
    /// `KEYWORD_*` entries, one address or a list of addresses per key.
    pub keyword: BTreeMap<String, TagValue>,
    /// `TITLE_*` entries, one address or a list of addresses per key.
    pub title: BTreeMap<String, TagValue>,
    /// `STYLE_*` entries.
    pub style: BTreeMap<String, String>,
    /// `PAGE<n>` entries, keyed by `n`.
    pub page: BTreeMap<String, String>,
    /// Groups not listed above, kept as found.
    pub extra: NestedMap,
}

impl Default for Footer {
    fn default() -> Self {
        Self {
            file: BTreeMap::from([("FEATURE".to_owned(), "24".to_owned())]),
            cover: BTreeMap::from([("0".to_owned(), "0".to_owned())]),
            keyword: BTreeMap::new(),
            title: BTreeMap::new(),
            style: BTreeMap::new(),
            page: BTreeMap::new(),
            extra: NestedMap::new(),
        }
    }
}

/// Device and application metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Usually `SNFILE_FEATURE`.
    pub module_label: String,
    /// Usually `NOTE`.
    pub file_type: String,
    /// Device model, e.g. `A5X` or `N6`.
    pub apply_equipment: String,
    /// Last opened page, 1-based.
    pub final_operation_page: String,
    /// Last opened layer, 1-based.
    pub final_operation_layer: String,
    pub original_style: String,
    pub original_style_md5: String,
    pub device_dpi: String,
    pub soft_dpi: String,
    pub file_parse_type: String,
    pub ratta_etmd: String,
    pub app_version: String,
    /// Whether handwriting recognition is enabled for the file.
    pub file_recogn_type: String,
    /// Tags that are not part of the fixed header shape.
    pub extra: TagMap,
}

impl Default for Header {
    fn default() -> Self {
        let zero = || "0".to_owned();
        Self {
            module_label: zero(),
            file_type: zero(),
            apply_equipment: zero(),
            final_operation_page: zero(),
            final_operation_layer: zero(),
            original_style: zero(),
            original_style_md5: zero(),
            device_dpi: zero(),
            soft_dpi: zero(),
            file_parse_type: zero(),
            ratta_etmd: zero(),
            app_version: zero(),
            file_recogn_type: zero(),
            extra: TagMap::new(),
        }
    }
}

/// The five fixed drawing planes of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerName {
    Main,
    Layer1,
    Layer2,
    Layer3,
    Background,
}

impl LayerName {
    pub const ALL: [LayerName; 5] = [
        LayerName::Main,
        LayerName::Layer1,
        LayerName::Layer2,
        LayerName::Layer3,
        LayerName::Background,
    ];

    /// The tag name used in page blocks and `LAYERSEQ`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerName::Main => "MAINLAYER",
            LayerName::Layer1 => "LAYER1",
            LayerName::Layer2 => "LAYER2",
            LayerName::Layer3 => "LAYER3",
            LayerName::Background => "BGLAYER",
        }
    }
}

impl FromStr for LayerName {
    type Err = SnoteError;

    fn from_str(s: &str) -> Result<Self> {
        LayerName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| SnoteError::MalformedRecord(format!("Unknown layer name: {:?}", s)))
    }
}

impl fmt::Display for LayerName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One drawing plane of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer<'a> {
    /// Usually `NOTE`.
    pub layer_type: String,
    /// Usually `RATTA_RLE`.
    pub protocol: String,
    pub name: LayerName,
    pub path: String,
    /// Address of the bitmap block, as written in the layer tags.
    pub bitmap: String,
    pub vector_graph: String,
    pub recogn: String,
    /// Compressed bitmap, absent when the layer was never drawn on.
    pub bitmap_buffer: Option<&'a [u8]>,
}

impl<'a> Layer<'a> {
    /// A layer with every field at its default.
    pub fn empty(name: LayerName) -> Self {
        Self {
            layer_type: "NOTE".to_owned(),
            protocol: "RATTA_RLE".to_owned(),
            name,
            path: "0".to_owned(),
            bitmap: "0".to_owned(),
            vector_graph: "0".to_owned(),
            recogn: "0".to_owned(),
            bitmap_buffer: None,
        }
    }

    /// Returns the bitmap when present and non-empty.
    pub fn bitmap(&self) -> Option<&'a [u8]> {
        self.bitmap_buffer.filter(|bytes| !bytes.is_empty())
    }
}

/// UI state of one layer, from the `LAYERINFO` page tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerInfo {
    /// -1 for the background, 0 for the main layer, 1..=3 for the others.
    pub layer_id: i64,
    pub name: String,
    pub is_background_layer: bool,
    pub is_allow_add: bool,
    pub is_current_layer: bool,
    pub is_visible: bool,
    pub is_deleted: bool,
    pub is_allow_up: bool,
    pub is_allow_down: bool,
}

/// Handwriting recognition state of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionStatus {
    None,
    Done,
    Running,
    Other(String),
}

impl From<&str> for RecognitionStatus {
    fn from(value: &str) -> Self {
        match value {
            "0" => RecognitionStatus::None,
            "1" => RecognitionStatus::Done,
            "2" => RecognitionStatus::Running,
            other => RecognitionStatus::Other(other.to_owned()),
        }
    }
}

/// One note page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a> {
    /// Key of this page in the footer `PAGE` group, e.g. `"1"`.
    pub key: String,
    /// Absolute address of the page block.
    pub address: u64,
    /// Template name. `user_*` styles carry a PNG background.
    pub page_style: String,
    pub page_style_md5: String,
    pub layer_switch: String,
    /// Address of the vector-ink block, as written in the page tags.
    pub total_path: String,
    pub thumbnail_type: String,
    pub recogn_status: RecognitionStatus,
    /// Address of the recognized-text block, as written in the page tags.
    pub recogn_text: String,
    pub recogn_file: String,
    pub recogn_file_status: RecognitionStatus,
    pub main_layer: Layer<'a>,
    pub layer1: Layer<'a>,
    pub layer2: Layer<'a>,
    pub layer3: Layer<'a>,
    pub bg_layer: Layer<'a>,
    pub layer_info: Vec<LayerInfo>,
    /// Paint order, bottom to top.
    pub layer_seq: Vec<LayerName>,
    /// Recognized handwriting, one line per text element.
    pub text: Option<String>,
    /// Opaque vector-ink payload.
    pub total_path_buffer: Option<&'a [u8]>,
    /// Tags that are not part of the fixed page shape.
    pub extra: TagMap,
}

impl<'a> Page<'a> {
    pub fn layer(&self, name: LayerName) -> &Layer<'a> {
        match name {
            LayerName::Main => &self.main_layer,
            LayerName::Layer1 => &self.layer1,
            LayerName::Layer2 => &self.layer2,
            LayerName::Layer3 => &self.layer3,
            LayerName::Background => &self.bg_layer,
        }
    }

    /// Layers in `LAYERSEQ` order, bottom to top.
    pub fn layers_in_paint_order(&self) -> impl Iterator<Item = &Layer<'a>> {
        self.layer_seq.iter().map(|&name| self.layer(name))
    }

    /// Returns the background bitmap of a `user_*` template page.
    ///
    /// Such backgrounds are stored as PNG rather than RATTA_RLE.
    pub fn custom_background(&self) -> Option<&'a [u8]> {
        if self.page_style.starts_with("user_") {
            self.bg_layer.bitmap()
        } else {
            None
        }
    }
}

/// Four rectangle coordinates as stored in the file.
pub type Rect = [String; 4];

/// A tagged region used for search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword<'a> {
    pub seq_no: String,
    /// Page number, 1-based.
    pub page: String,
    pub rect: Rect,
    pub rect_ori: Rect,
    /// Address of the keyword bitmap, as written in the tags.
    pub site: String,
    pub len: String,
    pub keyword: String,
    pub bitmap_buffer: Option<&'a [u8]>,
}

/// A tagged region used for navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title<'a> {
    pub seq_no: String,
    /// Heading level, 1-based.
    pub level: String,
    pub rect: Rect,
    pub rect_ori: Rect,
    /// Address of the title bitmap, as written in the tags.
    pub bitmap: String,
    /// Usually `RATTA_RLE`.
    pub protocol: String,
    pub style: String,
    pub bitmap_buffer: Option<&'a [u8]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cover<'a> {
    pub bitmap_buffer: &'a [u8],
}

/// A fully parsed note file.
///
/// Built once by [`parse_document`](crate::parse_document); it borrows every
/// payload from the input buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document<'a> {
    pub layout: NoteLayout,
    /// The first 24 bytes of the file.
    pub signature: String,
    /// Format version, e.g. `20230015`.
    pub version: u32,
    pub footer: Footer,
    pub header: Header,
    pub pages: Vec<Page<'a>>,
    pub cover: Option<Cover<'a>>,
    /// Keywords grouped by their footer key.
    pub keywords: BTreeMap<String, Vec<Keyword<'a>>>,
    /// Titles grouped by their footer key.
    pub titles: BTreeMap<String, Vec<Title<'a>>>,
}
