//! NCCH partition header parsing.

use romid_core::util::read_ascii;
use romid_core::{AnalysisError, ReadSeek};

use super::{MEDIA_UNIT, NCCH_MAGIC};
use crate::common::{read_block, read_u16_le, read_u32_le, read_u64_le};

pub(crate) const NCCH_HEADER_SIZE: usize = 0x200;

/// Parsed NCCH header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NcchHeader {
    pub(crate) content_size: u64,
    pub(crate) partition_id: u64,
    pub(crate) maker_code: String,
    pub(crate) version: u16,
    pub(crate) product_code: String,
}

/// Read and parse an NCCH header at the given absolute file offset.
pub(crate) fn parse_ncch(reader: &mut dyn ReadSeek, offset: u64) -> Result<NcchHeader, AnalysisError> {
    let buf: [u8; NCCH_HEADER_SIZE] = read_block(reader, offset)?;
    parse_ncch_bytes(&buf).ok_or_else(|| {
        AnalysisError::invalid_format(format!("Missing NCCH magic at 0x{:X}", offset + 0x100))
    })
}

pub(crate) fn parse_ncch_bytes(buf: &[u8; NCCH_HEADER_SIZE]) -> Option<NcchHeader> {
    if buf[0x100..0x104] != NCCH_MAGIC {
        return None;
    }
    Some(NcchHeader {
        content_size: read_u32_le(buf, 0x104) as u64 * MEDIA_UNIT,
        partition_id: read_u64_le(buf, 0x108),
        maker_code: read_ascii(&buf[0x110..0x112]).trim().to_string(),
        version: read_u16_le(buf, 0x112),
        product_code: read_ascii(&buf[0x150..0x160]).trim().to_string(),
    })
}
