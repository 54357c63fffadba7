//! Logiqx XML DAT reader.
//!
//! Only the parts the table importer needs are kept: the header's
//! name/description/version and, per game, the `rom` elements with their
//! size, CRC32, serial and (for headered NES sets) header bytes.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::DatError;

/// A parsed DAT file.
#[derive(Debug, Clone, Default)]
pub struct DatFile {
    pub name: String,
    pub description: String,
    pub version: String,
    pub games: Vec<DatGame>,
}

#[derive(Debug, Clone, Default)]
pub struct DatGame {
    pub name: String,
    /// Database id (`id` attribute), if present.
    pub id: Option<String>,
    pub roms: Vec<DatRom>,
}

#[derive(Debug, Clone, Default)]
pub struct DatRom {
    pub name: String,
    pub size: u64,
    /// CRC32, uppercase hex.
    pub crc: String,
    pub serial: Option<String>,
    /// Hex-encoded file header for headered sets (the 16-byte iNES header).
    pub header: Option<String>,
}

/// Where the reader currently is in the document.
enum Section {
    Top,
    Header { field: Option<HeaderField> },
    Game(DatGame),
}

#[derive(Clone, Copy)]
enum HeaderField {
    Name,
    Description,
    Version,
}

/// Parse a DAT from any buffered reader.
pub fn parse_dat<R: BufRead>(reader: R) -> Result<DatFile, DatError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut dat = DatFile::default();
    let mut section = Section::Top;
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(e) => match (&mut section, e.name().as_ref()) {
                (Section::Top, b"header") => section = Section::Header { field: None },
                (Section::Top, b"game" | b"machine") => section = Section::Game(read_game(&e)?),
                (Section::Header { field }, tag) => {
                    *field = match tag {
                        b"name" => Some(HeaderField::Name),
                        b"description" => Some(HeaderField::Description),
                        b"version" => Some(HeaderField::Version),
                        _ => None,
                    }
                }
                (Section::Game(game), b"rom") => game.roms.push(read_rom(&e)?),
                _ => {}
            },
            Event::Empty(e) => {
                if let (Section::Game(game), b"rom") = (&mut section, e.name().as_ref()) {
                    game.roms.push(read_rom(&e)?);
                }
            }
            Event::Text(t) => {
                if let Section::Header { field: Some(field) } = section {
                    let text = t.unescape()?.into_owned();
                    match field {
                        HeaderField::Name => dat.name = text,
                        HeaderField::Description => dat.description = text,
                        HeaderField::Version => dat.version = text,
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"header" => section = Section::Top,
                b"game" | b"machine" => {
                    if let Section::Game(game) = std::mem::replace(&mut section, Section::Top) {
                        dat.games.push(game);
                    }
                }
                _ => {
                    if let Section::Header { field } = &mut section {
                        *field = None;
                    }
                }
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if dat.name.is_empty() && dat.games.is_empty() {
        return Err(DatError::invalid_dat("no header or games in DAT"));
    }
    Ok(dat)
}

/// Parse a DAT file from disk.
pub fn parse_dat_file(path: &Path) -> Result<DatFile, DatError> {
    parse_dat(BufReader::new(File::open(path)?))
}

/// Visit every attribute as `(key, value)`.
fn for_each_attr(
    e: &BytesStart<'_>,
    mut f: impl FnMut(&[u8], String) -> Result<(), DatError>,
) -> Result<(), DatError> {
    for attr in e.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?.into_owned();
        f(attr.key.as_ref(), value)?;
    }
    Ok(())
}

fn read_game(e: &BytesStart<'_>) -> Result<DatGame, DatError> {
    let mut game = DatGame::default();
    for_each_attr(e, |key, value| {
        match key {
            b"name" => game.name = value,
            b"id" => game.id = Some(value),
            _ => {}
        }
        Ok(())
    })?;
    Ok(game)
}

fn read_rom(e: &BytesStart<'_>) -> Result<DatRom, DatError> {
    let mut rom = DatRom::default();
    for_each_attr(e, |key, value| {
        match key {
            b"name" => rom.name = value,
            b"size" => {
                rom.size = value
                    .trim()
                    .parse()
                    .map_err(|_| DatError::invalid_dat(format!("bad rom size '{value}'")))?
            }
            b"crc" => rom.crc = value.trim().to_ascii_uppercase(),
            b"serial" => rom.serial = Some(value),
            b"header" => rom.header = Some(value),
            _ => {}
        }
        Ok(())
    })?;
    Ok(rom)
}

#[cfg(test)]
#[path = "tests/dat_tests.rs"]
mod tests;
