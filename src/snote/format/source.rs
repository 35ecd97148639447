//! Addressed block access over a note file buffer.

use log::trace;

use crate::snote::types::error::Result;
use crate::snote::types::models::{NoteLayout, TagMap};
use crate::snote::utils;

use super::tags;

/// A note file buffer together with the layout used to read it.
///
/// Every slice handed out borrows from the original buffer.
#[derive(Debug, Clone, Copy)]
pub struct NoteSource<'a> {
    bytes: &'a [u8],
    layout: NoteLayout,
}

impl<'a> NoteSource<'a> {
    pub fn new(bytes: &'a [u8], layout: NoteLayout) -> Self {
        Self { bytes, layout }
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn layout(&self) -> NoteLayout {
        self.layout
    }

    /// Payload of the block at `address`; `None` for address `0`.
    pub fn block(&self, address: u64) -> Result<Option<&'a [u8]>> {
        utils::resolve_block(self.bytes, address, self.layout.length_field_width)
    }

    /// Payload of the block whose address is written in a tag value.
    ///
    /// A missing tag and the address `"0"` both yield `None`.
    pub fn tagged_block(&self, address: Option<&str>) -> Result<Option<&'a [u8]>> {
        utils::resolve_tagged_block(self.bytes, address, self.layout.length_field_width)
    }

    /// Tags of the text block at `address`; empty for address `0`.
    pub fn tags_at(&self, address: u64) -> Result<TagMap> {
        let tags = match self.block(address)? {
            Some(block) => tags::extract_tags(&utils::decode_text(block)),
            None => TagMap::new(),
        };
        trace!("Block at {:#x}: {} tags", address, tags.len());
        Ok(tags)
    }
}
