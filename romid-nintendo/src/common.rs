//! Byte-level helpers shared by the Nintendo parsers.

use std::io::{Read, SeekFrom};

use romid_core::error::short_read;
use romid_core::{AnalysisError, ReadSeek};

// ---------------------------------------------------------------------------
// Byte reading helpers
// ---------------------------------------------------------------------------

pub(crate) fn read_u16_le(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

pub(crate) fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

pub(crate) fn read_u64_le(buf: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}

pub(crate) fn read_u32_be(buf: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[offset..offset + 4]);
    u32::from_be_bytes(bytes)
}

pub(crate) fn read_u64_be(buf: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[offset..offset + 8]);
    u64::from_be_bytes(bytes)
}

/// Align a value up to a 64-byte boundary.
pub(crate) fn align64(val: u64) -> u64 {
    (val + 63) & !63
}

/// Format a 64-bit title id the way catalogs key it.
pub(crate) fn format_title_id(id: u64) -> String {
    format!("{:016X}", id)
}

// ---------------------------------------------------------------------------
// Reader helpers
// ---------------------------------------------------------------------------

/// Length of the stream.
pub(crate) fn stream_len(reader: &mut dyn ReadSeek) -> Result<u64, AnalysisError> {
    Ok(reader.seek(SeekFrom::End(0))?)
}

/// Seek to `offset` and return the stream length. An offset past the end
/// came from a bad header field and is reported as `CorruptedHeader`.
fn seek_within(reader: &mut dyn ReadSeek, offset: u64) -> Result<u64, AnalysisError> {
    let len = stream_len(reader)?;
    if offset > len {
        return Err(AnalysisError::corrupted_header(format!(
            "Offset 0x{:X} is past the end of the file (0x{:X} bytes)",
            offset, len
        )));
    }
    reader.seek(SeekFrom::Start(offset))?;
    Ok(len)
}

/// Read exactly `N` bytes at `offset`. A short file is reported as `TooSmall`.
pub(crate) fn read_block<const N: usize>(
    reader: &mut dyn ReadSeek,
    offset: u64,
) -> Result<[u8; N], AnalysisError> {
    let file_size = seek_within(reader, offset)?;
    let mut buf = [0u8; N];
    reader
        .read_exact(&mut buf)
        .map_err(|e| short_read(e, offset + N as u64, file_size))?;
    Ok(buf)
}

/// Read up to `max` bytes at `offset`; returns fewer at end of file.
pub(crate) fn read_up_to(
    reader: &mut dyn ReadSeek,
    offset: u64,
    max: usize,
) -> Result<Vec<u8>, AnalysisError> {
    seek_within(reader, offset)?;
    let mut buf = Vec::with_capacity(max);
    (&mut *reader).take(max as u64).read_to_end(&mut buf)?;
    Ok(buf)
}
