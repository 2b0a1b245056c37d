use crate::errors::Result;
use banks::Area;
use log::debug;
use std::io::{self, BufRead, Read};

/// Parses the area summary out of an SDCC .map file. Summary lines look like
/// this:
///
/// ```text
/// _CODE                  00000200    00006A62 =       27234. bytes (REL,CON)
/// ```
///
/// That is: the area name, its start address and its size (both in hex), and
/// then the size again in decimal. Empty areas and the ones not actually
/// located at the address being listed (SFR and HRAM10) are skipped.
pub fn parse(reader: impl Read) -> Result<Vec<Area>> {
    let mut areas = vec![];

    for line in io::BufReader::new(reader).lines() {
        let line = line?;
        if !line.starts_with('_') {
            continue;
        }
        if let Some(area) = parse_line(&line) {
            areas.push(area);
        }
    }

    Ok(areas)
}

fn parse_line(line: &str) -> Option<Area> {
    let words = line
        .split([' ', '=', '.'])
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>();
    if words.len() < 6 {
        return None;
    }

    let name = words[0];
    if name.contains("SFR") || name.contains("HRAM10") {
        return None;
    }

    let (Ok(start), Ok(size)) = (
        u32::from_str_radix(words[1], 16),
        u32::from_str_radix(words[2], 16),
    ) else {
        debug!("skipping malformed .map line: {}", line);
        return None;
    };
    if size == 0 {
        return None;
    }

    Some(Area::with_length(name, start, size, false))
}
