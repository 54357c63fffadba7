use super::*;
use crate::test_support::{provider, with_custom, with_official, write_rom};
use romid_core::checksum::crc32_bytes;
use romid_dat::PlatformTables;
use std::io::Cursor;

/// Write a consistent internal header at `base` (relative to the ROM image).
fn write_header(rom: &mut [u8], base: usize, title: &str, map_mode: u8) {
    let h = &mut rom[base..base + 0x30];
    h[0x10..0x10 + 21].fill(b' ');
    h[0x10..0x10 + title.len()].copy_from_slice(title.as_bytes());
    h[0x25] = map_mode;
    h[0x26] = 0x02; // ROM + RAM + battery
    h[0x27] = 0x0A; // 1 MB
    h[0x28] = 0x03; // 8 KB
    h[0x29] = 0x01; // USA
    h[0x2A] = 0x01; // Nintendo
    h[0x2B] = 0x02;
    let checksum: u16 = 0x1234;
    h[0x2C..0x2E].copy_from_slice(&(!checksum).to_le_bytes());
    h[0x2E..0x30].copy_from_slice(&checksum.to_le_bytes());
}

fn make_lorom() -> Vec<u8> {
    let mut rom = vec![0u8; 0x10000];
    write_header(&mut rom, LOROM_BASE, "TEST LOROM", 0x20);
    rom
}

fn make_hirom() -> Vec<u8> {
    let mut rom = vec![0u8; 0x10000];
    write_header(&mut rom, HIROM_BASE, "TEST HIROM", 0x21);
    rom
}

fn with_copier(rom: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; COPIER_HEADER_SIZE as usize];
    out.extend_from_slice(rom);
    out
}

fn plugin(tables: PlatformTables) -> SnesPlugin {
    SnesPlugin::new(provider(Platform::Snes, tables))
}

#[test]
fn test_parse_lorom() {
    let header = parse_header(&mut Cursor::new(make_lorom())).unwrap();
    assert_eq!(header.title, "TEST LOROM");
    assert_eq!(header.mapping_mode(), "LoROM");
    assert_eq!(header.rom_size, Some(1024 * 1024));
    assert_eq!(header.ram_size, Some(8 * 1024));
    assert!(header.has_battery());
    assert_eq!(header.region(), "USA");
    assert_eq!(header.version_string(), "1.2");
    assert_eq!(header.publisher(), "Nintendo");
    assert!(!header.has_copier_header);
    assert_eq!(header.header_offset, LOROM_BASE as u64);
}

#[test]
fn test_bad_lorom_pair_falls_through_to_hirom() {
    let mut rom = make_hirom();
    // LoROM area has a title but an inconsistent checksum pair
    rom[LOROM_BASE + 0x10..LOROM_BASE + 0x14].copy_from_slice(b"JUNK");
    rom[LOROM_BASE + 0x2C] = 0x11;
    let header = parse_header(&mut Cursor::new(rom)).unwrap();
    assert_eq!(header.mapping_mode(), "HiROM");
    assert_eq!(header.title, "TEST HIROM");
}

#[test]
fn test_blank_title_rejected() {
    let mut rom = vec![0u8; 0x10000];
    write_header(&mut rom, LOROM_BASE, "", 0x20);
    let err = parse_header(&mut Cursor::new(rom)).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidFormat(_)));
}

#[test]
fn test_copier_header_shifts_offsets() {
    let rom = with_copier(&make_lorom());
    let header = parse_header(&mut Cursor::new(rom)).unwrap();
    assert!(header.has_copier_header);
    assert_eq!(header.header_offset, LOROM_BASE as u64 + 0x200);
}

#[test]
fn test_extended_maker_code() {
    let mut rom = make_lorom();
    rom[LOROM_BASE + 0x2A] = 0x33;
    rom[LOROM_BASE..LOROM_BASE + 6].copy_from_slice(b"C3AFFJ");
    let header = parse_header(&mut Cursor::new(rom)).unwrap();
    assert_eq!(header.maker_code.as_deref(), Some("C3"));
    assert_eq!(header.game_code.as_deref(), Some("AFFJ"));
    assert_eq!(header.publisher(), "Square");
}

#[test]
fn test_too_small() {
    let err = parse_header(&mut Cursor::new(vec![0u8; 0x4000])).unwrap_err();
    assert!(matches!(err, AnalysisError::TooSmall { .. }));
}

#[test]
fn test_header_title_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let rom = make_lorom();
    let path = write_rom(dir.path(), "whatever.sfc", &rom);

    let info = plugin(PlatformTables::default())
        .parse_header_info(&path, &AnalysisOptions::new())
        .unwrap()
        .unwrap();
    assert_eq!(info.title_name, "TEST LOROM");
    assert_eq!(info.title_id, crc32_bytes(&rom));
    assert_eq!(info.region, "USA");
    assert_eq!(info.publisher, "Nintendo");
    assert_eq!(info.version, "1.2");
}

#[test]
fn test_headerless_crc_matches_copier_dump() {
    let dir = tempfile::tempdir().unwrap();
    let clean = make_lorom();
    let clean_crc = crc32_bytes(&clean);
    let path = write_rom(dir.path(), "copier.smc", &with_copier(&clean));

    let plugin = plugin(with_official(PlatformTables::default(), &clean_crc, "Clean Game"));
    let info = plugin
        .parse_header_info(&path, &AnalysisOptions::new())
        .unwrap()
        .unwrap();
    assert_eq!(info.title_name, "Clean Game");
    assert_eq!(info.title_id, clean_crc);
    assert_eq!(info.reference_crc32, vec![clean_crc.clone()]);
    assert_eq!(plugin.extract_canonical_id(&path), clean_crc);
}

#[test]
fn test_custom_match_without_header() {
    let dir = tempfile::tempdir().unwrap();
    let rom = vec![0x55u8; 0x9000];
    let crc = crc32_bytes(&rom);
    let path = write_rom(dir.path(), "Homebrew (Europe).sfc", &rom);

    let info = plugin(with_custom(PlatformTables::default(), &crc, "Homebrew", Some("Europe")))
        .parse_header_info(&path, &AnalysisOptions::new())
        .unwrap()
        .unwrap();
    assert_eq!(info.title_name, "Homebrew");
    assert_eq!(info.region, "Europe");
    assert_eq!(info.version, "1.0");
}

#[test]
fn test_no_header_no_match_uses_stem() {
    let dir = tempfile::tempdir().unwrap();
    let rom = vec![0x55u8; 0x9000];
    let crc = crc32_bytes(&rom);
    let path = write_rom(dir.path(), "noise.sfc", &rom);
    let plugin = plugin(PlatformTables::default());

    let info = plugin
        .parse_header_info(&path, &AnalysisOptions::new())
        .unwrap()
        .unwrap();
    assert_eq!(info.title_name, "noise");
    assert_eq!(info.title_id, crc);
    assert!(info.region.is_empty());
    assert!(info.publisher.is_empty());
    assert_eq!(info.reference_id, -1);
    assert_eq!(plugin.extract_canonical_id(&path), crc);
}
