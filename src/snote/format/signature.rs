//! The file signature at the very start of a note file.
//!
//! ```text
//! noteSN_FILE_VER_20230015
//! └──── prefix ──┘└ date ┘
//! ```

use std::sync::OnceLock;

use regex::Regex;

use crate::snote::types::error::{Result, SnoteError};
use crate::snote::utils;

/// Length of the signature in bytes.
pub const SIGNATURE_LEN: usize = 24;

static SIGNATURE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn signature_regex() -> &'static Regex {
    SIGNATURE_PATTERN
        .get_or_init(|| Regex::new(r"^noteSN_FILE_VER_([0-9]{8})").expect("Invalid signature pattern"))
}

/// Reads the signature and returns it with its 8-digit version number.
pub fn parse(buffer: &[u8]) -> Result<(String, u32)> {
    let prefix = &buffer[..buffer.len().min(SIGNATURE_LEN)];
    let signature = utils::decode_text(prefix);

    let version = signature_regex()
        .captures(&signature)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .ok_or_else(|| SnoteError::SignatureMismatch(signature.clone()))?;

    Ok((signature, version))
}
