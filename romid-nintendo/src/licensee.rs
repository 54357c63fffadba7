//! Publisher lookup from Nintendo licensee and maker codes.
//!
//! Two generations of codes exist:
//!
//! - **Old (byte) codes**: the SNES licensee byte. When it is 0x33 the
//!   extended header carries a 2-character maker code instead.
//! - **New (string) codes**: the 2-character maker code used by the SNES
//!   extended header, GBA (0xB0), NDS (0x010) and 3DS (NCCH 0x110).
//!
//! Sources: GBATEK (GBA/DS), 3DBrew (3DS), fullsnes (SNES).

/// 2-character maker codes, sorted by code.
const MAKER_CODES: &[(&str, &str)] = &[
    ("01", "Nintendo"),
    ("08", "Capcom"),
    ("0A", "Jaleco"),
    ("13", "Electronic Arts"),
    ("18", "Hudson Soft"),
    ("1P", "Creatures"),
    ("20", "Activision"),
    ("28", "Kemco Japan"),
    ("31", "Nintendo"),
    ("32", "Bandai"),
    ("34", "Konami"),
    ("37", "Taito"),
    ("38", "Hudson"),
    ("39", "Banpresto"),
    ("41", "Ubisoft"),
    ("42", "Atlus"),
    ("4F", "Eidos"),
    ("4Q", "Disney"),
    ("50", "Absolute"),
    ("51", "Acclaim"),
    ("52", "Atlus"),
    ("54", "Konami"),
    ("56", "LJN"),
    ("5D", "Midway"),
    ("5G", "Majesco"),
    ("5H", "Take-Two"),
    ("60", "Titus"),
    ("61", "Virgin"),
    ("64", "LucasArts"),
    ("67", "Ocean"),
    ("69", "Electronic Arts (Victor)"),
    ("6S", "TDK Mediactive"),
    ("70", "Atari"),
    ("71", "Interplay"),
    ("78", "THQ"),
    ("79", "Accolade"),
    ("7D", "Vivendi Universal"),
    ("8P", "Sega"),
    ("91", "Chunsoft"),
    ("95", "Varie"),
    ("99", "Pack-In-Video"),
    ("9B", "Tecmo"),
    ("A4", "Konami"),
    ("AF", "Namco Bandai"),
    ("B0", "Acclaim"),
    ("B1", "ASCII"),
    ("B2", "Bandai"),
    ("B4", "Enix"),
    ("B6", "HAL Laboratory"),
    ("BB", "Sunsoft"),
    ("C0", "Taito"),
    ("C3", "Square"),
    ("C5", "Data East"),
    ("C8", "Koei"),
    ("DA", "Tomy"),
    ("E5", "Epoch"),
    ("E7", "Athena"),
    ("E9", "Natsume"),
    ("EB", "Atlus"),
    ("G9", "D3 Publisher"),
    ("GD", "Square Enix"),
    ("GT", "GUST"),
    ("HB", "Happinet"),
    ("KA", "Kadokawa"),
    ("MR", "Marvelous"),
    ("MV", "Marvelous Entertainment"),
    ("NB", "Bandai Namco"),
    ("QH", "D3 Publisher"),
    ("SQ", "Square Enix"),
    ("VZ", "Level-5"),
    ("WR", "Warner Bros."),
    ("XB", "XSEED"),
    ("XS", "Aksys Games"),
];

/// SNES licensee bytes, sorted by code.
const OLD_LICENSEES: &[(u8, &str)] = &[
    (0x01, "Nintendo"),
    (0x08, "Capcom"),
    (0x0A, "Jaleco"),
    (0x0B, "Coconuts Japan"),
    (0x18, "Hudson Soft"),
    (0x28, "Kemco Japan"),
    (0x30, "Infogrames"),
    (0x31, "Nintendo"),
    (0x34, "Konami"),
    (0x35, "HectorSoft"),
    (0x38, "Capcom"),
    (0x41, "Ubisoft"),
    (0x42, "Atlus"),
    (0x44, "Malibu"),
    (0x4A, "Virgin Interactive"),
    (0x4F, "U.S. Gold"),
    (0x50, "Absolute"),
    (0x51, "Acclaim"),
    (0x52, "Activision"),
    (0x53, "American Sammy"),
    (0x54, "GameTek"),
    (0x56, "Majesco"),
    (0x5A, "Mindscape"),
    (0x60, "Titus Interactive"),
    (0x61, "Virgin Interactive"),
    (0x67, "Ocean Interactive"),
    (0x69, "Electronic Arts"),
    (0x6E, "Elite Systems"),
    (0x6F, "Electro Brain"),
    (0x70, "Infogrames"),
    (0x71, "Interplay"),
    (0x72, "Broderbund"),
    (0x75, "The Sales Curve"),
    (0x78, "THQ"),
    (0x79, "Accolade"),
    (0x7F, "Kemco"),
    (0x80, "Misawa Entertainment"),
    (0x83, "LOZC"),
    (0x86, "Tokuma Shoten"),
    (0x8B, "Bullet-Proof Software"),
    (0x8C, "Vic Tokai"),
    (0x91, "Chunsoft"),
    (0x95, "Varie"),
    (0x97, "Kaneko"),
    (0x99, "Pack-In-Video"),
    (0x9A, "Nichibutsu"),
    (0x9B, "Tecmo"),
    (0x9C, "Imagineer"),
    (0xA0, "Telenet"),
    (0xA4, "Konami"),
    (0xA7, "Takara"),
    (0xAF, "Namco"),
    (0xB0, "Acclaim"),
    (0xB1, "ASCII"),
    (0xB2, "Bandai"),
    (0xB4, "Enix"),
    (0xB6, "HAL Laboratory"),
    (0xBB, "Sunsoft"),
    (0xBD, "Sony Imagesoft"),
    (0xC0, "Taito"),
    (0xC3, "Square"),
    (0xC5, "Data East"),
    (0xC6, "Tonkin House"),
    (0xC8, "Koei"),
    (0xCE, "Pony Canyon"),
    (0xD1, "Sofel"),
    (0xD2, "Quest"),
    (0xDA, "Tomy"),
    (0xDE, "Human"),
    (0xE2, "Yutaka"),
    (0xE5, "Epoch"),
    (0xE7, "Athena"),
    (0xE8, "Asmik"),
    (0xE9, "Natsume"),
    (0xEB, "Atlus"),
];

/// Publisher name for a 2-character maker code (case-insensitive).
pub(crate) fn maker_code_name(code: &str) -> Option<&'static str> {
    let code = code.trim().to_ascii_uppercase();
    MAKER_CODES
        .binary_search_by(|(c, _)| (*c).cmp(code.as_str()))
        .ok()
        .map(|i| MAKER_CODES[i].1)
}

/// Publisher name for an old-style licensee byte.
pub(crate) fn old_licensee_name(code: u8) -> Option<&'static str> {
    OLD_LICENSEES
        .binary_search_by_key(&code, |(c, _)| *c)
        .ok()
        .map(|i| OLD_LICENSEES[i].1)
}

/// Publisher string for a record: the maker name, or empty when unknown.
pub(crate) fn publisher_for_maker(code: &str) -> String {
    maker_code_name(code).unwrap_or_default().to_string()
}
