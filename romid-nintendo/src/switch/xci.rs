//! XCI game card images.

use romid_core::{AnalysisError, ReadSeek};

use super::pfs0::{PartitionEntry, PartitionKind, read_partition};
use crate::common::{read_block, read_u64_le};

const XCI_MAGIC: &[u8; 4] = b"HEAD";

/// Entries of the `secure` partition, which holds the game's NCAs.
///
/// Returns an empty list when the root HFS0 has no `secure` partition.
pub(crate) fn secure_entries(reader: &mut dyn ReadSeek) -> Result<Vec<PartitionEntry>, AnalysisError> {
    let header: [u8; 0x200] = read_block(reader, 0)?;
    if &header[0x100..0x104] != XCI_MAGIC {
        return Err(AnalysisError::invalid_format("Missing XCI magic at 0x100"));
    }
    let root_offset = read_u64_le(&header, 0x130);

    let root = read_partition(reader, root_offset, PartitionKind::Hfs0)?;
    match root.iter().find(|e| e.name == "secure") {
        Some(secure) => read_partition(reader, secure.offset, PartitionKind::Hfs0),
        None => {
            log::debug!("XCI root partition has no secure partition");
            Ok(Vec::new())
        }
    }
}
