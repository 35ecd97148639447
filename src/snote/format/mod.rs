//! File format parsing layer for Supernote note files.
//!
//! This module provides the mid-level parsing layer that bridges between the
//! raw byte readers in `utils` and the document builder in `reader`.
//!
//! # Module Organization
//!
//! - [`source`]: Addressed block access over the input buffer
//! - [`tags`]: `<KEY:VALUE>` scanning and nested key grouping
//! - [`signature`]: The `noteSN_FILE_VER_` file prefix
//! - [`footer`]: The root address table
//! - [`header`]: Device and application metadata
//! - [`page`]: Pages and their five layers
//! - [`layer_info`]: The `LAYERINFO` record list
//! - [`text`]: Recognized handwriting text
//! - [`records`]: Cover, keywords and titles
//!
//! # Architecture
//!
//! ```text
//! File Structure:
//! ┌─────────────────┐
//! │  Signature      │ ← signature::parse()
//! ├─────────────────┤
//! │  Header block   │ ← header::parse()      (address from footer FILE_FEATURE)
//! ├─────────────────┤
//! │  Page, layer,   │ ← page::parse_pages()  (addresses from footer PAGE<n>)
//! │  bitmap, text,  │   records::parse_*()   (addresses from footer COVER/KEYWORD/TITLE)
//! │  keyword blocks │
//! ├─────────────────┤
//! │  Footer block   │ ← footer::parse()
//! ├─────────────────┤
//! │  Trailer        │   footer address
//! └─────────────────┘
//! ```

pub mod footer;
pub mod header;
pub mod layer_info;
pub mod page;
pub mod records;
pub mod signature;
pub mod source;
pub mod tags;
pub mod text;
