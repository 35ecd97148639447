//! Codec layer for layer bitmaps.
//!
//! # Submodules
//!
//! - [`rle`][]: RATTA_RLE run-length decoding into RGBA pixels

pub mod rle;

pub use rle::RattaRleDecoder;
