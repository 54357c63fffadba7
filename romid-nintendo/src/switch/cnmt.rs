//! Content meta (CNMT) records and NCA header title ids.

use romid_core::{AnalysisError, ReadSeek};

use crate::common::{format_title_id, read_u32_le, read_u64_le, read_up_to};

/// Bytes needed for the fixed CNMT header fields.
pub(crate) const CNMT_HEADER_SIZE: usize = 0x20;

const NCA_HEADER_READ: usize = 0x400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaType {
    Application,
    Patch,
    AddOnContent,
    Other(u8),
}

impl From<u8> for MetaType {
    fn from(value: u8) -> Self {
        match value {
            0x80 => Self::Application,
            0x81 => Self::Patch,
            0x82 => Self::AddOnContent,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cnmt {
    pub title_id: String,
    pub version: u32,
    pub meta_type: MetaType,
}

impl Cnmt {
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < CNMT_HEADER_SIZE {
            return None;
        }
        Some(Self {
            title_id: format_title_id(read_u64_le(data, 0)),
            version: read_u32_le(data, 8),
            meta_type: MetaType::from(data[0x0C]),
        })
    }

    /// `major.minor.patch` packed into the high half of the version word.
    pub fn version_string(&self) -> String {
        let v = self.version;
        format!("{}.{}.{}", (v >> 26) & 0x3F, (v >> 20) & 0x3F, (v >> 16) & 0xF)
    }
}

/// Title id from the clear part of an NCA header at `offset`.
///
/// Returns `None` when the header is encrypted or truncated.
pub(crate) fn nca_title_id(reader: &mut dyn ReadSeek, offset: u64) -> Result<Option<String>, AnalysisError> {
    let header = read_up_to(reader, offset, NCA_HEADER_READ)?;
    if header.len() < NCA_HEADER_READ {
        return Ok(None);
    }
    if &header[0x200..0x204] != b"NCA3" && &header[0x200..0x204] != b"NCA2" {
        return Ok(None);
    }
    Ok(Some(format_title_id(read_u64_le(&header, 0x210))))
}
