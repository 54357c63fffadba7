use super::*;
use crate::common::align64;
use crate::test_support::{provider, with_custom, with_official, write_rom};
use romid_core::checksum::crc32_bytes;
use romid_dat::PlatformTables;
use std::io::Cursor;

const TITLE_ID: u64 = 0x0004_0000_0012_3400;

/// A 0x200-byte NCCH header.
fn make_ncch(product_code: &str, version: u16, title_id: u64) -> Vec<u8> {
    let mut ncch = vec![0u8; 0x200];
    ncch[0x100..0x104].copy_from_slice(b"NCCH");
    // Content size: 0x10 media units
    ncch[0x104..0x108].copy_from_slice(&0x10u32.to_le_bytes());
    ncch[0x108..0x110].copy_from_slice(&title_id.to_le_bytes());
    ncch[0x110..0x112].copy_from_slice(b"01");
    ncch[0x112..0x114].copy_from_slice(&version.to_le_bytes());
    ncch[0x150..0x150 + product_code.len()].copy_from_slice(product_code.as_bytes());
    ncch
}

/// NCSD image with partition 0 at media unit 4 (0x800).
fn make_ncsd(ncch: &[u8], media_id: u64) -> Vec<u8> {
    let mut rom = vec![0u8; 0x800];
    rom[0x100..0x104].copy_from_slice(b"NCSD");
    rom[0x108..0x110].copy_from_slice(&media_id.to_le_bytes());
    rom[0x120..0x124].copy_from_slice(&4u32.to_le_bytes());
    rom[0x124..0x128].copy_from_slice(&0x10u32.to_le_bytes());
    rom.extend_from_slice(ncch);
    rom
}

/// RSA-2048 TMD signature, the type eShop titles carry.
const SIG_RSA_2048: u32 = 0x0001_0004;

/// CIA whose TMD is signed with `sig_type`; `content` is appended at the
/// content offset.
fn make_cia(sig_type: u32, title_id: u64, content: &[u8]) -> Vec<u8> {
    let header_size = 0x2020u32;
    let cert_size = 0xA00u32;
    let ticket_size = 0x350u32;
    let sig_block = cia::signature_block_size(sig_type);
    // Signature block, TMD header and one content chunk record
    let tmd_size = (sig_block + 0xC4 + 0x24) as u32;

    let mut cia = vec![0u8; 0x2040];
    cia[0x00..0x04].copy_from_slice(&header_size.to_le_bytes());
    cia[0x08..0x0C].copy_from_slice(&cert_size.to_le_bytes());
    cia[0x0C..0x10].copy_from_slice(&ticket_size.to_le_bytes());
    cia[0x10..0x14].copy_from_slice(&tmd_size.to_le_bytes());

    cia.resize(cia.len() + align64(cert_size as u64) as usize, 0);
    cia.resize(cia.len() + align64(ticket_size as u64) as usize, 0);

    let mut tmd = vec![0u8; align64(tmd_size as u64) as usize];
    tmd[0..4].copy_from_slice(&sig_type.to_be_bytes());
    let tid_at = sig_block + 0x4C;
    tmd[tid_at..tid_at + 8].copy_from_slice(&title_id.to_be_bytes());
    cia.extend_from_slice(&tmd);

    cia.extend_from_slice(content);
    cia
}

fn plugin(tables: PlatformTables) -> N3dsPlugin {
    N3dsPlugin::new(provider(Platform::N3ds, tables))
}

#[test]
fn test_parse_ncsd() {
    let rom = make_ncsd(&make_ncch("CTR-P-ABCE", 0x0410, TITLE_ID), 0);
    let header = parse_header(&mut Cursor::new(rom), "3ds").unwrap();
    assert_eq!(header.container, N3dsContainer::Ncsd);
    assert_eq!(header.title_id_hex().as_deref(), Some("0004000000123400"));
    assert_eq!(header.product_code, "CTR-P-ABCE");
    assert_eq!(header.game_code(), "ABCE");
    assert_eq!(header.region(), "USA");
    assert_eq!(header.publisher(), "Nintendo");
    assert_eq!(header.version_string(), "1.1.0");
    assert_eq!(header.content_size, 0x10 * 0x200);
}

#[test]
fn test_ncsd_media_id_fallback() {
    let rom = make_ncsd(&make_ncch("CTR-P-ABCJ", 0, 0), 0x0004_0000_00AB_CD00);
    let header = parse_header(&mut Cursor::new(rom), "3ds").unwrap();
    assert_eq!(header.title_id_hex().as_deref(), Some("0004000000ABCD00"));
    assert_eq!(header.version_string(), "1.0");
    assert_eq!(header.region(), "Japan");
}

#[test]
fn test_ncsd_empty_partition_rejected() {
    let mut rom = make_ncsd(&make_ncch("CTR-P-ABCE", 0, TITLE_ID), 0);
    rom[0x120..0x124].fill(0);
    let err = parse_header(&mut Cursor::new(rom), "3ds").unwrap_err();
    assert!(matches!(err, AnalysisError::CorruptedHeader(_)));
}

#[test]
fn test_parse_cia_with_ncch() {
    let rom = make_cia(SIG_RSA_2048, TITLE_ID, &make_ncch("CTR-N-XYZP", 0x0020, 0x1111));
    let header = parse_header(&mut Cursor::new(rom), "cia").unwrap();
    assert_eq!(header.container, N3dsContainer::Cia);
    // TMD title id wins over the NCCH partition id
    assert_eq!(header.title_id, TITLE_ID);
    assert_eq!(header.game_code(), "XYZP");
    assert_eq!(header.region(), "Europe");
    assert_eq!(header.version_string(), "0.2.0");
}

#[test]
fn test_cia_encrypted_content_keeps_title_id() {
    let rom = make_cia(SIG_RSA_2048, TITLE_ID, &[0xAAu8; 0x200]);
    let header = parse_header(&mut Cursor::new(rom), "cia").unwrap();
    assert_eq!(header.title_id, TITLE_ID);
    assert!(header.product_code.is_empty());
}

#[test]
fn test_cia_bad_header_size() {
    let mut rom = make_cia(SIG_RSA_2048, TITLE_ID, &[]);
    rom[0..4].copy_from_slice(&0x20000u32.to_le_bytes());
    let err = parse_header(&mut Cursor::new(rom), "cia").unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidFormat(_)));
}

#[test]
fn test_signature_block_sizes() {
    assert_eq!(cia::signature_block_size(0x0001_0000), 0x240);
    assert_eq!(cia::signature_block_size(0x0001_0003), 0x240);
    assert_eq!(cia::signature_block_size(0x0001_0004), 0x140);
    assert_eq!(cia::signature_block_size(0x0001_0005), 0x80);
    assert_eq!(cia::signature_block_size(0xDEAD_BEEF), 0x140);
}

#[test]
fn test_bare_ncch_and_detection_order() {
    let ncch = make_ncch("CTR-P-QRSK", 0, TITLE_ID);
    let header = parse_header(&mut Cursor::new(ncch.clone()), "cxi").unwrap();
    assert_eq!(header.container, N3dsContainer::Ncch);
    assert_eq!(header.region(), "Korea");

    // Unknown extension: NCSD and CIA miss, NCCH matches
    let probed = parse_header(&mut Cursor::new(ncch), "bin").unwrap();
    assert_eq!(probed.container, N3dsContainer::Ncch);
}

#[test]
fn test_full_product_code() {
    let mut header = parse_header(
        &mut Cursor::new(make_ncch("CTR-P-ABCE", 0, 0)),
        "app",
    )
    .unwrap();
    assert_eq!(header.full_product_code(), Some("CTR-P-ABCE"));
    header.product_code = "HOMEBREW".into();
    assert_eq!(header.full_product_code(), None);
    assert_eq!(header.game_code(), "HOMEBREW");
}

#[test]
fn test_official_match_by_crc() {
    let dir = tempfile::tempdir().unwrap();
    let rom = make_ncsd(&make_ncch("CTR-P-ABCE", 0, TITLE_ID), 0);
    let crc = crc32_bytes(&rom);
    let path = write_rom(dir.path(), "game.3ds", &rom);

    let info = plugin(with_official(PlatformTables::default(), &crc, "Test Adventure"))
        .parse_header_info(&path, &AnalysisOptions::new())
        .unwrap()
        .unwrap();
    assert_eq!(info.title_name, "Test Adventure");
    assert_eq!(info.reference_id, 7);
    assert_eq!(info.reference_crc32, vec![crc]);
    assert_eq!(info.title_id, "0004000000123400");
    assert_eq!(info.content_type, ContentType::Cart3ds);
    assert_eq!(info.file_type, FileType::Base);
}

#[test]
fn test_custom_region_override() {
    let dir = tempfile::tempdir().unwrap();
    let rom = make_cia(SIG_RSA_2048, TITLE_ID, &make_ncch("CTR-P-ABCE", 0, 0));
    let crc = crc32_bytes(&rom);
    let path = write_rom(dir.path(), "game.cia", &rom);

    let info = plugin(with_custom(PlatformTables::default(), &crc, "Fan Translation", Some("China")))
        .parse_header_info(&path, &AnalysisOptions::new())
        .unwrap()
        .unwrap();
    assert_eq!(info.title_name, "Fan Translation");
    assert_eq!(info.region, "China");
    assert_eq!(info.content_type, ContentType::Cia);
}

#[test]
fn test_unmatched_title_falls_back_to_product_code() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rom(dir.path(), "game.cxi", &make_ncch("CTR-P-ABCE", 0, 0));
    let plugin = plugin(PlatformTables::default());

    let info = plugin
        .parse_header_info(&path, &AnalysisOptions::new())
        .unwrap()
        .unwrap();
    assert_eq!(info.title_name, "CTR-P-ABCE");
    assert_eq!(info.content_type, ContentType::Cxi);
    // Zero title id: canonical id is the product code
    assert_eq!(plugin.extract_canonical_id(&path), "CTR-P-ABCE");
}

#[test]
fn test_canonical_id_prefers_title_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rom(dir.path(), "game.cia", &make_cia(SIG_RSA_2048, TITLE_ID, &[0u8; 0x200]));
    assert_eq!(
        plugin(PlatformTables::default()).extract_canonical_id(&path),
        "0004000000123400"
    );
}

#[test]
fn test_unrecognized_file() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = vec![0x11u8; 0x400];
    let path = write_rom(dir.path(), "junk.3ds", &bytes);
    let plugin = plugin(PlatformTables::default());
    assert!(plugin
        .parse_header_info(&path, &AnalysisOptions::new())
        .unwrap()
        .is_none());
    assert_eq!(plugin.extract_canonical_id(&path), crc32_bytes(&bytes));
}

#[test]
fn test_cia_title_id_for_each_signature_type() {
    for sig_type in [0x0001_0003, 0x0001_0004, 0x0001_0005] {
        let rom = make_cia(sig_type, TITLE_ID, &[0xAAu8; 0x200]);
        let header = parse_header(&mut Cursor::new(rom), "cia").unwrap();
        assert_eq!(header.title_id, TITLE_ID, "signature type 0x{:X}", sig_type);

        let rom = make_cia(sig_type, TITLE_ID, &make_ncch("CTR-P-ABCE", 0, 0x1111));
        let header = parse_header(&mut Cursor::new(rom), "cia").unwrap();
        assert_eq!(header.title_id, TITLE_ID, "signature type 0x{:X}", sig_type);
        assert_eq!(header.game_code(), "ABCE");
    }
}

#[test]
fn test_cia_tmd_too_small_for_title_id() {
    // Declared TMD ends inside the RSA-4096 signature block
    let mut rom = make_cia(0x0001_0003, TITLE_ID, &make_ncch("CTR-P-ABCE", 0, 0x1111));
    rom[0x10..0x14].copy_from_slice(&0x200u32.to_le_bytes());
    let header = parse_header(&mut Cursor::new(rom), "cia");
    // The content offset moved, so neither a title id nor an NCCH is found
    assert!(matches!(header, Err(AnalysisError::InvalidFormat(_))));
}

#[test]
fn test_cia_truncated_after_tmd_keeps_title_id() {
    let mut rom = make_cia(0x0001_0003, TITLE_ID, &[]);
    let layout = cia::parse_layout(&mut Cursor::new(rom.clone())).unwrap();
    // Cut the alignment padding so the content offset lies past the end
    rom.truncate(layout.tmd_offset as usize + layout.tmd_size as usize);
    let header = parse_header(&mut Cursor::new(rom), "cia").unwrap();
    assert_eq!(header.title_id, TITLE_ID);
}
