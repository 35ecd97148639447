//! Low-level byte reading utilities

use byteorder::{ByteOrder, LittleEndian};
use encoding_rs::UTF_8;
use log::trace;

use super::types::error::{Result, SnoteError};

/// Read a `width`-byte little-endian unsigned integer at `offset`.
///
/// Used for the footer trailer and for the length prefix of every addressed
/// block. `width` must be between 1 and 8.
pub fn read_uint_le(buffer: &[u8], offset: u64, width: usize) -> Result<u64> {
    if !(1..=8).contains(&width) {
        return Err(SnoteError::MalformedRecord(format!(
            "Invalid integer width: {}",
            width
        )));
    }
    let range = checked_range(buffer, offset, width as u64)?;
    Ok(LittleEndian::read_uint(&buffer[range], width))
}

/// Resolve an address into the payload of the block stored there.
///
/// Block layout:
/// ```text
/// [length_width bytes] payload length (little-endian)
/// [length bytes]       payload
/// ```
///
/// Address `0` means the field is not present and yields `None`.
pub fn resolve_block(buffer: &[u8], address: u64, length_width: usize) -> Result<Option<&[u8]>> {
    if address == 0 {
        return Ok(None);
    }
    let length = read_uint_le(buffer, address, length_width)?;
    let start = address + length_width as u64;
    let range = checked_range(buffer, start, length)?;
    trace!("Resolved block at {:#x}: {} bytes", address, length);
    Ok(Some(&buffer[range]))
}

/// Parse an address written as decimal text inside a tag value.
pub fn parse_address(value: &str) -> Result<u64> {
    value.trim().parse::<u64>().map_err(|_| {
        SnoteError::MalformedRecord(format!("Invalid address: {:?}", value))
    })
}

/// Resolve an address that is still in its textual tag form.
pub fn resolve_tagged_block<'a>(
    buffer: &'a [u8],
    address: Option<&str>,
    length_width: usize,
) -> Result<Option<&'a [u8]>> {
    match address {
        Some(value) => resolve_block(buffer, parse_address(value)?, length_width),
        None => Ok(None),
    }
}

/// Decode block bytes as UTF-8 text, replacing invalid sequences.
pub fn decode_text(bytes: &[u8]) -> String {
    let (text, _, _) = UTF_8.decode(bytes);
    text.into_owned()
}

fn checked_range(buffer: &[u8], offset: u64, width: u64) -> Result<std::ops::Range<usize>> {
    let out_of_bounds = || SnoteError::OutOfBounds {
        offset,
        width,
        len: buffer.len() as u64,
    };
    let end = offset.checked_add(width).ok_or_else(out_of_bounds)?;
    if end > buffer.len() as u64 {
        return Err(out_of_bounds());
    }
    Ok(offset as usize..end as usize)
}
