use crate::errors::Result;
use crate::parse_hex;
use banks::Area;
use std::io::{self, BufRead, Read};

/// Parses the sections from an RGBDS .map file. Bank lines set the bank for
/// the sections that follow them, and the bank number is stored in the upper
/// bits of the addresses of each area:
///
/// ```text
/// ROMX bank #1:
///   SECTION: $4000-$7eff ($3f00 bytes) ["AnotherBank"]
/// ```
///
/// Sections are ignored until a bank has been set, and also for HRAM banks.
pub fn parse(reader: impl Read) -> Result<Vec<Area>> {
    let mut areas = vec![];
    let mut bank: Option<u32> = None;

    for line in io::BufReader::new(reader).lines() {
        let line = line?;

        if is_bank_line(&line) {
            let words = line
                .split([' ', '#', ':'])
                .filter(|w| !w.is_empty())
                .collect::<Vec<_>>();
            if words.len() == 3 {
                bank = if words[0].contains("HRAM") {
                    None
                } else {
                    words[2].parse::<u32>().ok()
                };
            }
            continue;
        }

        let Some(bank) = bank else {
            continue;
        };
        if let Some(area) = parse_section(&line, bank) {
            areas.push(area);
        }
    }

    Ok(areas)
}

/// Returns true if the given line opens a new bank in a RGBDS .map file.
pub fn is_bank_line(line: &str) -> bool {
    line.contains(" bank #")
}

fn parse_section(line: &str, bank: u32) -> Option<Area> {
    let rest = line.trim_start().strip_prefix("SECTION:")?.trim_start();

    let (range, rest) = rest.split_once(' ')?;
    let (start, end) = range.split_once('-')?;
    let (start, end) = (parse_hex(start)?, parse_hex(end)?);
    if end < start {
        return None;
    }

    let (length, rest) = rest.trim_start().strip_prefix('(')?.split_once(" bytes)")?;
    if parse_hex(length)? == 0 {
        return None;
    }

    // Names are quoted inside of brackets, and they might contain spaces.
    let rest = rest.trim();
    let name = match (rest.find('"'), rest.rfind('"')) {
        (Some(first), Some(last)) if first < last => &rest[first + 1..last],
        _ => rest.trim_start_matches('[').trim_end_matches(']'),
    };

    Some(Area::new(name, start | (bank << 16), end | (bank << 16), false))
}
