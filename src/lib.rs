//! # snote-reader
//!
//! A reader for Supernote `.note` files.
//! Parses the addressed block container (signature, footer, header, pages,
//! layers, cover, keywords and titles) and decodes RATTA_RLE layer bitmaps
//! into RGBA pixels.
//!
//! The library works on an in-memory buffer and never touches the filesystem;
//! every bitmap in the returned [`Document`] borrows from that buffer.
pub mod snote;

// Re-export the main types for convenience
pub use snote::{
    RattaRleDecoder,
    Result,
    SnoteError,
    decode_layer,
    parse_document,
    parse_document_with,
    models::{
        Cover,
        Document,
        Footer,
        Header,
        Keyword,
        Layer,
        LayerInfo,
        LayerName,
        NoteLayout,
        Page,
        RecognitionStatus,
        TagMap,
        TagValue,
        Title,
    },
    palette::{Palette, Rgba},
};
