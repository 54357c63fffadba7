//! CIA (CTR importable archive) parsing.
//!
//! The title id comes from the TMD. The first content is usually an NCCH,
//! but eShop content is often encrypted; a CIA whose content cannot be read
//! still identifies by its TMD title id.

use romid_core::{AnalysisError, ReadSeek};

use super::ncch::{NCCH_HEADER_SIZE, parse_ncch_bytes};
use super::{N3dsContainer, N3dsHeader};
use crate::common::{align64, read_block, read_u32_be, read_u32_le, read_u64_be, read_up_to};

/// Largest header size accepted in the CIA header.
const MAX_HEADER_SIZE: u32 = 0x10000;

/// Offset of the title id inside the TMD header (after the signature block).
const TMD_TITLE_ID: usize = 0x4C;

/// Section offsets of a CIA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CiaLayout {
    pub(crate) tmd_offset: u64,
    pub(crate) tmd_size: u32,
    pub(crate) content_offset: u64,
}

/// Signature block size (type + signature + padding) for a signature type.
/// Unknown types are assumed to be RSA-2048.
pub(crate) fn signature_block_size(sig_type: u32) -> usize {
    match sig_type {
        0x0001_0000 | 0x0001_0003 => 4 + 0x200 + 0x3C, // RSA-4096
        0x0001_0001 | 0x0001_0004 => 4 + 0x100 + 0x3C, // RSA-2048
        0x0001_0002 | 0x0001_0005 => 4 + 0x3C + 0x40,  // ECDSA
        _ => 4 + 0x100 + 0x3C,
    }
}

pub(crate) fn parse_layout(reader: &mut dyn ReadSeek) -> Result<CiaLayout, AnalysisError> {
    let buf: [u8; 0x20] = read_block(reader, 0)?;
    let header_size = read_u32_le(&buf, 0x00);
    if header_size == 0 || header_size > MAX_HEADER_SIZE {
        return Err(AnalysisError::invalid_format(format!(
            "Implausible CIA header size: 0x{:X}",
            header_size
        )));
    }
    let cert_size = read_u32_le(&buf, 0x08);
    let ticket_size = read_u32_le(&buf, 0x0C);
    let tmd_size = read_u32_le(&buf, 0x10);

    let cert_offset = align64(header_size as u64);
    let ticket_offset = cert_offset + align64(cert_size as u64);
    let tmd_offset = ticket_offset + align64(ticket_size as u64);
    let content_offset = tmd_offset + align64(tmd_size as u64);
    Ok(CiaLayout {
        tmd_offset,
        tmd_size,
        content_offset,
    })
}

/// Title id from the TMD, or 0 when the TMD is too small to hold one.
///
/// The title id follows the signature block, whose size depends on the
/// signature type in the first four bytes.
pub(crate) fn tmd_title_id(reader: &mut dyn ReadSeek, layout: &CiaLayout) -> Result<u64, AnalysisError> {
    let tmd_size = layout.tmd_size as usize;
    if tmd_size < 4 {
        return Ok(0);
    }
    let sig = read_up_to(reader, layout.tmd_offset, 4)?;
    if sig.len() < 4 {
        return Ok(0);
    }
    let offset = signature_block_size(read_u32_be(&sig, 0)) + TMD_TITLE_ID;
    let needed = offset + 8;
    if tmd_size < needed {
        log::debug!("TMD of 0x{:X} bytes ends before the title id at 0x{:X}", tmd_size, offset);
        return Ok(0);
    }
    let tmd = read_up_to(reader, layout.tmd_offset, needed)?;
    if tmd.len() < needed {
        log::debug!("TMD title id at 0x{:X} is beyond the end of the file", offset);
        return Ok(0);
    }
    Ok(read_u64_be(&tmd, offset))
}

pub(crate) fn parse_cia(reader: &mut dyn ReadSeek) -> Result<N3dsHeader, AnalysisError> {
    let layout = parse_layout(reader)?;
    let tmd_title_id = tmd_title_id(reader, &layout)?;

    // Content past the end of a truncated file reads as empty.
    let content = match read_up_to(reader, layout.content_offset, NCCH_HEADER_SIZE) {
        Err(e) if e.is_format_mismatch() => Vec::new(),
        other => other?,
    };
    let ncch = <[u8; NCCH_HEADER_SIZE]>::try_from(content.as_slice())
        .ok()
        .and_then(|buf| parse_ncch_bytes(&buf));

    match ncch {
        Some(ncch) => {
            let title_id = if tmd_title_id != 0 {
                tmd_title_id
            } else {
                ncch.partition_id
            };
            Ok(N3dsHeader::from_ncch(N3dsContainer::Cia, &ncch, title_id))
        }
        None if tmd_title_id != 0 => {
            log::debug!("CIA content is not a readable NCCH; using the TMD title id");
            Ok(N3dsHeader::title_only(N3dsContainer::Cia, tmd_title_id))
        }
        None => Err(AnalysisError::invalid_format(
            "CIA has neither a TMD title id nor a readable NCCH",
        )),
    }
}
