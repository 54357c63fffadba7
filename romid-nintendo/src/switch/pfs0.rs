//! PFS0 and HFS0 partition tables.
//!
//! Both share a 16-byte header (`magic`, file count, string-table size,
//! reserved) followed by fixed-size entries, the string table and then the
//! file data. Only the entry size differs.

use romid_core::util::read_utf8;
use romid_core::{AnalysisError, ReadSeek};

use crate::common::{read_block, read_u32_le, read_u64_le, read_up_to, stream_len};

/// Upper bound on entries; real containers hold a handful.
const MAX_ENTRIES: u32 = 0x1000;

/// Upper bound on the string table size.
const MAX_STRING_TABLE: u32 = 0x10_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PartitionKind {
    /// NSP root: 24-byte entries.
    Pfs0,
    /// XCI partitions: 0x40-byte entries with a SHA-256 of the hashed region.
    Hfs0,
}

impl PartitionKind {
    fn magic(self) -> &'static [u8; 4] {
        match self {
            Self::Pfs0 => b"PFS0",
            Self::Hfs0 => b"HFS0",
        }
    }

    fn entry_size(self) -> usize {
        match self {
            Self::Pfs0 => 0x18,
            Self::Hfs0 => 0x40,
        }
    }
}

/// A file inside a partition, with its absolute position in the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PartitionEntry {
    pub(crate) name: String,
    pub(crate) offset: u64,
    pub(crate) size: u64,
}

/// Read the partition table at `base`.
pub(crate) fn read_partition(
    reader: &mut dyn ReadSeek,
    base: u64,
    kind: PartitionKind,
) -> Result<Vec<PartitionEntry>, AnalysisError> {
    let header: [u8; 0x10] = read_block(reader, base)?;
    if &header[0..4] != kind.magic() {
        return Err(AnalysisError::invalid_format(format!(
            "Missing {} magic at 0x{:X}",
            String::from_utf8_lossy(kind.magic()),
            base
        )));
    }

    let file_count = read_u32_le(&header, 4);
    let string_table_size = read_u32_le(&header, 8);
    if file_count > MAX_ENTRIES || string_table_size > MAX_STRING_TABLE {
        return Err(AnalysisError::corrupted_header(format!(
            "Implausible partition table: {} files, {} byte string table",
            file_count, string_table_size
        )));
    }

    let entries_len = file_count as usize * kind.entry_size();
    let table_len = entries_len + string_table_size as usize;
    let table = read_up_to(reader, base + 0x10, table_len)?;
    if table.len() < table_len {
        return Err(AnalysisError::TooSmall {
            expected: base + 0x10 + table_len as u64,
            actual: base + 0x10 + table.len() as u64,
        });
    }
    let strings = &table[entries_len..];
    let data_start = base + 0x10 + table_len as u64;
    let file_size = stream_len(reader)?;

    let mut entries = Vec::with_capacity(file_count as usize);
    for i in 0..file_count as usize {
        let at = i * kind.entry_size();
        let data_offset = read_u64_le(&table, at);
        let size = read_u64_le(&table, at + 8);
        let name_offset = read_u32_le(&table, at + 16) as usize;
        let name = strings.get(name_offset..).map(read_utf8).unwrap_or_default();
        let offset = data_start
            .checked_add(data_offset)
            .filter(|offset| offset.checked_add(size).is_some_and(|end| end <= file_size))
            .ok_or_else(|| {
                AnalysisError::corrupted_header(format!(
                    "Partition entry {:?} (0x{:X} + 0x{:X} bytes) lies outside the file",
                    name, data_offset, size
                ))
            })?;
        entries.push(PartitionEntry { name, offset, size });
    }
    Ok(entries)
}
