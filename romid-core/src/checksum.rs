//! Streaming CRC32 with a size ceiling.
//!
//! Every function here swallows read failures and oversized inputs and
//! reports them as "no checksum", so a pathological file can never stall or
//! abort identification.

use std::fs::File;
use std::io::{Read, SeekFrom};
use std::path::Path;

use crate::ReadSeek;

const CHUNK_SIZE: usize = 64 * 1024; // 64 KB

/// Rendering used when no checksum could be computed.
pub const UNKNOWN_CRC32: &str = "unknown";

pub const MIB: u64 = 1024 * 1024;
pub const GIB: u64 = 1024 * MIB;

/// Ceiling for cartridge formats (NES, SNES, GBA).
pub const CARTRIDGE_LIMIT: u64 = 64 * MIB;
/// Ceiling for NDS images.
pub const NDS_LIMIT: u64 = 256 * MIB;
/// Ceiling for 3DS images.
pub const N3DS_LIMIT: u64 = 4 * GIB;
/// Ceiling for the checksum stored in identified entries.
pub const ENTRY_LIMIT: u64 = GIB;

/// Format a CRC32 value the way reference tables key it.
pub fn format_crc32(value: u32) -> String {
    format!("{:08X}", value)
}

/// CRC32 of an in-memory buffer.
pub fn crc32_bytes(data: &[u8]) -> String {
    format_crc32(crc32fast::hash(data))
}

/// CRC32 of `reader` starting at `skip`, or `None` if the hashed span
/// exceeds `size_limit` or any read fails.
pub fn crc32_reader(reader: &mut dyn ReadSeek, skip: u64, size_limit: u64) -> Option<String> {
    let size = reader.seek(SeekFrom::End(0)).ok()?;
    if size.saturating_sub(skip) > size_limit || skip > size {
        return None;
    }
    reader.seek(SeekFrom::Start(skip)).ok()?;

    let mut hasher = crc32fast::Hasher::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::debug!("crc32 read failed: {e}");
                return None;
            }
        };
        hasher.update(&buf[..n]);
    }
    Some(format_crc32(hasher.finalize()))
}

/// CRC32 of a whole file, or `None` when too large or unreadable.
pub fn crc32_file(path: &Path, size_limit: u64) -> Option<String> {
    crc32_file_from(path, 0, size_limit)
}

/// CRC32 of a file after skipping `skip` leading bytes.
pub fn crc32_file_from(path: &Path, skip: u64, size_limit: u64) -> Option<String> {
    let size = std::fs::metadata(path).ok()?.len();
    if size.saturating_sub(skip) > size_limit {
        log::debug!(
            "skipping crc32 of {}: {} bytes exceeds limit",
            path.display(),
            size
        );
        return None;
    }
    let mut file = File::open(path).ok()?;
    crc32_reader(&mut file, skip, size_limit)
}

/// CRC32 of a file rendered as a string, `"unknown"` on any failure.
pub fn crc32_or_unknown(path: &Path, size_limit: u64) -> String {
    crc32_file(path, size_limit).unwrap_or_else(|| UNKNOWN_CRC32.to_string())
}

#[cfg(test)]
#[path = "tests/checksum_tests.rs"]
mod tests;
