//! Readers for the files produced by Game Boy toolchains (SDCC/GBDK and
//! RGBDS). Each reader turns a file into a list of areas, which can then be
//! fed into `banks::Banks`.

pub mod cdb;
mod errors;
pub mod ihx;
pub mod map;
pub mod noi;
pub mod rgbds;

pub use errors::{Error, Result};

use banks::{Area, InputSource};
use std::io::Read;
use std::path::Path;

/// Supported input formats.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    /// SDCC linker map.
    Map,

    /// SDCC no$gmb symbol file.
    Noi,

    /// SDCC debug information.
    Cdb,

    /// Intel HEX.
    Ihx,

    /// RGBDS linker map.
    Rgbds,
}

impl Format {
    /// Guesses the format of the file at `path` out of its extension. Both
    /// SDCC and RGBDS produce .map files, so the contents of the file are
    /// needed to tell them apart.
    pub fn detect(path: &Path, contents: &str) -> Result<Format> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "map" => {
                if contents.lines().any(rgbds::is_bank_line) {
                    Ok(Format::Rgbds)
                } else {
                    Ok(Format::Map)
                }
            }
            "noi" => Ok(Format::Noi),
            "cdb" => Ok(Format::Cdb),
            "ihx" | "hex" => Ok(Format::Ihx),
            _ => Err(Error::UnknownFormat(path.display().to_string())),
        }
    }

    /// The input source to be set on the bank engine options for this format.
    pub fn input_source(&self) -> InputSource {
        match self {
            Format::Map => InputSource::Map,
            Format::Noi => InputSource::Noi,
            Format::Cdb => InputSource::Cdb,
            Format::Ihx => InputSource::Ihx,
            Format::Rgbds => InputSource::Rgbds,
        }
    }

    /// Parses the areas out of the given `reader` for this format.
    pub fn parse(&self, reader: impl Read) -> Result<Vec<Area>> {
        match self {
            Format::Map => map::parse(reader),
            Format::Noi => noi::parse(reader),
            Format::Cdb => cdb::parse(reader),
            Format::Ihx => ihx::parse(reader),
            Format::Rgbds => rgbds::parse(reader),
        }
    }
}

/// Parses an hexadecimal value, with an optional "0x" or "$" prefix.
pub(crate) fn parse_hex(value: &str) -> Option<u32> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .or_else(|| value.strip_prefix('$'))
        .unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Parses an area given by the user as "NAME:HEXADDR:HEXLEN". A leading ':'
/// is ignored, and hexadecimal values might come with a "0x" or "$" prefix.
pub fn parse_manual_area(arg: &str, exclusive: bool) -> Result<Area> {
    let bad = |reason: &str| Error::ManualArea {
        arg: arg.to_string(),
        reason: reason.to_string(),
    };

    let fields = arg
        .strip_prefix(':')
        .unwrap_or(arg)
        .split(':')
        .collect::<Vec<_>>();
    if fields.len() != 3 {
        return Err(bad("expected NAME:HEXADDR:HEXLEN"));
    }

    let name = fields[0];
    if name.is_empty() {
        return Err(bad("empty name"));
    }
    let start = parse_hex(fields[1]).ok_or_else(|| bad("invalid address"))?;
    let length = parse_hex(fields[2]).ok_or_else(|| bad("invalid length"))?;
    if length == 0 {
        return Err(bad("the length cannot be zero"));
    }

    Ok(Area::with_length(name, start, length, exclusive))
}
