//! NCSD (CCI) game card images.

use romid_core::{AnalysisError, ReadSeek};

use super::ncch::parse_ncch;
use super::{MEDIA_UNIT, N3dsContainer, N3dsHeader, NCSD_MAGIC};
use crate::common::{read_block, read_u32_le, read_u64_le};

const NCSD_HEADER_SIZE: usize = 0x200;

/// Parse the NCSD header and the NCCH in partition 0.
pub(crate) fn parse_ncsd(reader: &mut dyn ReadSeek) -> Result<N3dsHeader, AnalysisError> {
    let buf: [u8; NCSD_HEADER_SIZE] = read_block(reader, 0)?;
    if buf[0x100..0x104] != NCSD_MAGIC {
        return Err(AnalysisError::invalid_format("Missing NCSD magic at 0x100"));
    }

    // Partition table at 0x120: (offset, size) pairs in media units
    let part0_offset = read_u32_le(&buf, 0x120);
    let part0_size = read_u32_le(&buf, 0x124);
    if part0_offset == 0 || part0_size == 0 {
        return Err(AnalysisError::corrupted_header("NCSD partition 0 is empty"));
    }

    let ncch = parse_ncch(reader, part0_offset as u64 * MEDIA_UNIT)?;
    let title_id = if ncch.partition_id != 0 {
        ncch.partition_id
    } else {
        read_u64_le(&buf, 0x108)
    };
    Ok(N3dsHeader::from_ncch(N3dsContainer::Ncsd, &ncch, title_id))
}
