//! Nintendo platform plugins.
//!
//! One [`GamePlugin`](romid_core::GamePlugin) per platform:
//!
//! - NES (Famicom)
//! - SNES (Super Famicom)
//! - Game Boy Advance
//! - Nintendo DS / DSi
//! - Nintendo 3DS
//! - Nintendo Switch
//!
//! Each module also exposes its raw header parser, so a file can be
//! inspected without touching the reference tables.

pub(crate) mod common;
pub mod ds;
pub mod gba;
pub(crate) mod licensee;
pub mod n3ds;
pub mod nes;
pub mod resolve;
pub mod snes;
pub mod switch;

#[cfg(test)]
mod test_support;

use std::fs::File;
use std::path::Path;

use romid_core::util::extension_lower;
use romid_core::{AnalysisError, Platform, recognized};

pub use ds::{DsPlugin, NdsHeader};
pub use gba::{GbaHeader, GbaPlugin};
pub use n3ds::{N3dsHeader, N3dsPlugin};
pub use nes::{NesHeader, NesPlugin};
pub use snes::{SnesHeader, SnesPlugin};
pub use switch::{SwitchHeader, SwitchPlugin};

/// A parsed header for any supported platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderRecord {
    Nes(NesHeader),
    Snes(SnesHeader),
    Gba(GbaHeader),
    Nds(NdsHeader),
    N3ds(N3dsHeader),
    Switch(SwitchHeader),
}

impl HeaderRecord {
    pub fn platform(&self) -> Platform {
        match self {
            Self::Nes(_) => Platform::Nes,
            Self::Snes(_) => Platform::Snes,
            Self::Gba(_) => Platform::Gba,
            Self::Nds(_) => Platform::Ds,
            Self::N3ds(_) => Platform::N3ds,
            Self::Switch(_) => Platform::Switch,
        }
    }
}

/// Parse `path` as a `platform` header without any table lookups.
///
/// Returns `Ok(None)` when the bytes are not in that platform's format.
pub fn parse_header_record(
    platform: Platform,
    path: &Path,
) -> Result<Option<HeaderRecord>, AnalysisError> {
    let mut file = File::open(path)?;
    let ext = extension_lower(path);
    let record = match platform {
        Platform::Nes => recognized(nes::parse_header(&mut file))?.map(HeaderRecord::Nes),
        Platform::Snes => recognized(snes::parse_header(&mut file))?.map(HeaderRecord::Snes),
        Platform::Gba => recognized(gba::parse_header(&mut file))?.map(HeaderRecord::Gba),
        Platform::Ds => recognized(ds::parse_header(&mut file))?.map(HeaderRecord::Nds),
        Platform::N3ds => recognized(n3ds::parse_header(&mut file, &ext))?.map(HeaderRecord::N3ds),
        Platform::Switch => {
            recognized(switch::parse_header(&mut file, &ext))?.map(HeaderRecord::Switch)
        }
    };
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_rom;

    #[test]
    fn header_record_dispatches_by_platform() {
        let dir = tempfile::tempdir().unwrap();
        let mut rom = vec![0u8; 16 + 16384];
        rom[0..4].copy_from_slice(b"NES\x1A");
        rom[4] = 1;
        let path = write_rom(dir.path(), "game.nes", &rom);

        let record = parse_header_record(Platform::Nes, &path).unwrap().unwrap();
        assert_eq!(record.platform(), Platform::Nes);
        let HeaderRecord::Nes(header) = record else {
            panic!("expected an NES header");
        };
        assert_eq!(header.prg_rom_size, 16384);

        assert!(parse_header_record(Platform::Snes, &path).unwrap().is_none());
    }
}
