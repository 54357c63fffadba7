use super::*;
use crate::test_support::{official_entry, provider, with_custom, write_rom};
use romid_core::checksum::crc32_bytes;
use romid_dat::PlatformTables;
use std::io::Cursor;

/// Build a synthetic NDS ROM with a plausible header.
fn make_nds_rom(code: &[u8; 4], unit_code: u8) -> Vec<u8> {
    let mut rom = vec![0u8; 0x1000];

    // Title at 0x000 (12 bytes, null-padded)
    rom[0x000..0x00C].copy_from_slice(b"TESTGAME\0\0\0\0");
    rom[0x00C..0x010].copy_from_slice(code);
    // Maker code "01" (Nintendo)
    rom[0x010..0x012].copy_from_slice(b"01");
    rom[0x012] = unit_code;
    // Device capacity: 7 = 16 MB
    rom[0x014] = 0x07;
    rom[0x01E] = 0x01;
    // Icon/title offset
    rom[0x068..0x06C].copy_from_slice(&0x800u32.to_le_bytes());
    rom
}

fn plugin(tables: PlatformTables) -> DsPlugin {
    DsPlugin::new(provider(Platform::Ds, tables))
}

#[test]
fn test_parse_header_fields() {
    let header = parse_header(&mut Cursor::new(make_nds_rom(b"ADME", 0x00))).unwrap();
    assert_eq!(header.title, "TESTGAME");
    assert_eq!(header.game_code, "ADME");
    assert_eq!(header.maker_code, "01");
    assert_eq!(header.device_type(), "NDS");
    assert_eq!(header.rom_size(), Some(16 * 1024 * 1024));
    assert_eq!(header.region(), "USA");
    assert_eq!(header.version_string(), "1.1");
    assert_eq!(header.serial().as_deref(), Some("NTR-ADME"));
    assert!(header.has_banner);
}

#[test]
fn test_device_types_and_regions() {
    let dsi = parse_header(&mut Cursor::new(make_nds_rom(b"IRBO", 0x03))).unwrap();
    assert_eq!(dsi.device_type(), "DSi");
    assert_eq!(dsi.region(), "International");

    let enhanced = parse_header(&mut Cursor::new(make_nds_rom(b"IPKW", 0x02))).unwrap();
    assert_eq!(enhanced.device_type(), "NDS+DSi");
    assert_eq!(enhanced.region(), "Europe (alt)");
}

#[test]
fn test_too_small() {
    let err = parse_header(&mut Cursor::new(vec![0u8; 0x100])).unwrap_err();
    assert!(matches!(err, AnalysisError::TooSmall { .. }));
}

#[test]
fn test_serial_lookup_fills_reference_crcs() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rom(dir.path(), "mario.nds", &make_nds_rom(b"ASME", 0x00));

    let mut tables = PlatformTables::default();
    let mut entry = official_entry("Super Mario 64 DS", Some(12));
    entry.crc32 = vec!["AAAA0001".into()];
    tables.official.insert("ASME", entry);

    let info = plugin(tables)
        .parse_header_info(&path, &AnalysisOptions::new())
        .unwrap()
        .unwrap();
    assert_eq!(info.title_name, "Super Mario 64 DS");
    assert_eq!(info.reference_crc32, vec!["AAAA0001"]);
    assert_eq!(info.reference_id, 12);
    assert_eq!(info.title_id, "NTR-ASME");
    assert_eq!(info.publisher, "Nintendo");
}

#[test]
fn test_custom_beats_serial() {
    let dir = tempfile::tempdir().unwrap();
    let rom = make_nds_rom(b"ASME", 0x00);
    let crc = crc32_bytes(&rom);
    let path = write_rom(dir.path(), "mario.nds", &rom);

    let mut tables = with_custom(PlatformTables::default(), &crc, "Mario 64 DS (Translated)", Some("China"));
    tables.official.insert("ASME", official_entry("Super Mario 64 DS", None));

    let info = plugin(tables)
        .parse_header_info(&path, &AnalysisOptions::new())
        .unwrap()
        .unwrap();
    assert_eq!(info.title_name, "Mario 64 DS (Translated)");
    assert_eq!(info.region, "China");
    assert_eq!(info.reference_crc32, vec![crc]);
}

#[test]
fn test_header_title_and_canonical_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rom(dir.path(), "game.nds", &make_nds_rom(b"ADME", 0x00));
    let plugin = plugin(PlatformTables::default());

    let info = plugin
        .parse_header_info(&path, &AnalysisOptions::new())
        .unwrap()
        .unwrap();
    assert_eq!(info.title_name, "TESTGAME");
    assert_eq!(plugin.extract_canonical_id(&path), "NTR-ADME");
}

#[test]
fn test_canonical_id_falls_back_to_crc() {
    let dir = tempfile::tempdir().unwrap();
    let mut rom = make_nds_rom(b"ADME", 0x00);
    rom[0x0C..0x10].fill(0);
    let path = write_rom(dir.path(), "blank.nds", &rom);
    assert_eq!(plugin(PlatformTables::default()).extract_canonical_id(&path), crc32_bytes(&rom));
}
