use super::*;

const SAMPLE_XML_DAT: &str = r#"<?xml version="1.0"?>
<!DOCTYPE datafile SYSTEM "http://www.logiqx.com/Dats/datafile.dtd">
<datafile>
    <header>
        <name>Nintendo - Nintendo Entertainment System (Headered)</name>
        <description>Nintendo - Nintendo Entertainment System (Headered) (20240101-000000)</description>
        <version>20240101-000000</version>
    </header>
    <game name="Super Mario Bros. (World)" id="0001">
        <rom name="Super Mario Bros. (World).nes" size="40976" crc="3337ec46" header="4E 45 53 1A 02 01 01 00 00 00 00 00 00 00 00 00"/>
    </game>
    <game name="Tetris (USA)" id="0002">
        <rom name="Tetris (USA).nes" size="49168" crc="1394f57e" serial="NES-EI-USA"/>
    </game>
</datafile>"#;

#[test]
fn test_parse_xml_dat() {
    let dat = parse_dat(SAMPLE_XML_DAT.as_bytes()).unwrap();
    assert_eq!(dat.name, "Nintendo - Nintendo Entertainment System (Headered)");
    assert_eq!(dat.version, "20240101-000000");
    assert_eq!(dat.games.len(), 2);

    let smb = &dat.games[0];
    assert_eq!(smb.name, "Super Mario Bros. (World)");
    assert_eq!(smb.id.as_deref(), Some("0001"));
    assert_eq!(smb.roms[0].size, 40976);
    assert_eq!(smb.roms[0].crc, "3337EC46");
    assert_eq!(
        smb.roms[0].header.as_deref(),
        Some("4E 45 53 1A 02 01 01 00 00 00 00 00 00 00 00 00")
    );
}

#[test]
fn test_parse_xml_with_serial() {
    let dat = parse_dat(SAMPLE_XML_DAT.as_bytes()).unwrap();
    assert_eq!(dat.games[1].roms[0].serial.as_deref(), Some("NES-EI-USA"));
    assert!(dat.games[1].roms[0].header.is_none());
}

#[test]
fn test_parse_empty_xml() {
    let xml = r#"<?xml version="1.0"?><datafile></datafile>"#;
    assert!(parse_dat(xml.as_bytes()).is_err());
}

#[test]
fn test_invalid_size_is_error() {
    let xml = r#"<datafile><header><name>T</name></header>
        <game name="G"><rom name="g.nes" size="big" crc="00000000"/></game></datafile>"#;
    assert!(matches!(
        parse_dat(xml.as_bytes()),
        Err(DatError::InvalidDat(_))
    ));
}

#[test]
fn test_rom_with_closing_tag_and_entities() {
    let xml = r#"<datafile><header><name>Nintendo - Game Boy Advance</name></header>
        <game name="Mario &amp; Luigi (USA)">
            <rom name="m.gba" size="16777216" crc="a1b2c3d4"></rom>
        </game></datafile>"#;
    let dat = parse_dat(xml.as_bytes()).unwrap();
    assert_eq!(dat.name, "Nintendo - Game Boy Advance");
    assert_eq!(dat.games[0].name, "Mario & Luigi (USA)");
    assert_eq!(dat.games[0].roms[0].crc, "A1B2C3D4");
    assert!(dat.description.is_empty());
}
