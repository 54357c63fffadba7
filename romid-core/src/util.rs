use std::path::Path;

/// Format a byte count as a human-readable size string (e.g., "4 KB", "2 MB").
///
/// Uses exact integer division; values that aren't clean multiples of KB/MB
/// are shown in bytes.
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1024 * 1024 && bytes.is_multiple_of(1024 * 1024) {
        format!("{} MB", bytes / (1024 * 1024))
    } else if bytes >= 1024 && bytes.is_multiple_of(1024) {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Read a null-terminated ASCII string from a byte slice.
///
/// Stops at the first null byte, filters out non-printable characters,
/// and returns the result. No trimming is performed.
pub fn read_ascii(buf: &[u8]) -> String {
    buf.iter()
        .take_while(|&&b| b != 0)
        .filter(|&&b| (0x20..0x7F).contains(&b))
        .map(|&b| b as char)
        .collect()
}

/// Read a fixed-length ASCII string from a byte slice.
///
/// Non-printable bytes are replaced with spaces, then the result is trimmed.
/// Does not stop at null bytes, so fields padded with 0x00 or 0xFF work.
pub fn read_ascii_fixed(buf: &[u8]) -> String {
    let s: String = buf
        .iter()
        .map(|&b| {
            if (0x20..0x7F).contains(&b) {
                b as char
            } else {
                ' '
            }
        })
        .collect();
    s.trim().to_string()
}

/// Read a null-terminated UTF-8 string, replacing invalid sequences.
pub fn read_utf8(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).trim().to_string()
}

/// Decode a hex string (spaces ignored). Returns `None` on malformed input.
pub fn decode_hex(s: &str) -> Option<Vec<u8>> {
    let digits: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return None;
    }
    digits
        .chunks(2)
        .map(|pair| {
            let hi = (pair[0] as char).to_digit(16)?;
            let lo = (pair[1] as char).to_digit(16)?;
            Some((hi * 16 + lo) as u8)
        })
        .collect()
}

/// File stem as an owned string (empty when the path has none).
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Lowercase extension without the dot (empty when the path has none).
pub fn extension_lower(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// True when the string is exactly `len` hexadecimal digits.
pub fn is_hex_of_len(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_hexdigit())
}
