use crate::errors::Result;
use banks::Area;
use log::warn;
use std::io::{self, BufRead, Read};

/// Name given to the areas built out of .ihx records, which are anonymous.
pub const RECORD_AREA_NAME: &str = "ihx record";

// Start token, byte count, address, record type and checksum.
const RECORD_LEN_MIN: usize = 1 + 2 + 4 + 2 + 2;

const RECORD_DATA: u8 = 0x00;
const RECORD_EOF: u8 = 0x01;

#[derive(Debug, PartialEq)]
struct Record {
    byte_count: u32,
    address: u32,
    kind: u8,
}

impl Record {
    fn end(&self) -> u32 {
        self.address + self.byte_count - 1
    }
}

// Parses and validates a single record of the form ":BBAAAARRDD..CC". Returns
// None if the record is not valid.
fn parse_record(line: &str) -> Option<Record> {
    let line = line.trim_end_matches(['\r', '\n']);

    if line.len() < RECORD_LEN_MIN {
        warn!(
            "ihx: too few characters on line '{}' (got {}, expected at least {})",
            line,
            line.len(),
            RECORD_LEN_MIN
        );
        return None;
    }
    let Some(hex) = line.strip_prefix(':') else {
        warn!("ihx: invalid start of record on line '{}'", line);
        return None;
    };
    if hex.len() % 2 != 0 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        warn!("ihx: non-hex characters on line '{}'", line);
        return None;
    }

    let bytes = (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16))
        .collect::<std::result::Result<Vec<u8>, _>>()
        .ok()?;

    let byte_count = bytes[0] as usize;
    if bytes.len() != byte_count + 5 {
        warn!(
            "ihx: byte count {} doesn't match the length of the record on line '{}'",
            byte_count, line
        );
        return None;
    }

    // All bytes including the checksum must add up to zero.
    let sum = bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != 0 {
        warn!("ihx: bad checksum on line '{}'", line);
        return None;
    }

    Some(Record {
        byte_count: byte_count as u32,
        address: (u32::from(bytes[1]) << 8) | u32::from(bytes[2]),
        kind: bytes[3],
    })
}

/// Parses the data records from an Intel .ihx file. Since records are
/// anonymous and rather small, records which are adjacent to the previous one
/// are merged into a single area. Invalid records are skipped.
pub fn parse(reader: impl Read) -> Result<Vec<Area>> {
    let mut areas = vec![];
    let mut pending: Option<(u32, u32)> = None;

    for line in io::BufReader::new(reader).lines() {
        let Some(record) = parse_record(&line?) else {
            continue;
        };

        match record.kind {
            RECORD_EOF => {
                if let Some((start, end)) = pending.take() {
                    areas.push(Area::new(RECORD_AREA_NAME, start, end, false));
                }
                continue;
            }
            RECORD_DATA if record.byte_count > 0 => {}
            _ => continue,
        }

        let (start, end) = (record.address, record.end());
        pending = match pending {
            Some((s, e)) if start == e + 1 => Some((s, end)),
            Some((s, e)) if end + 1 == s => Some((start, e)),
            Some((s, e)) => {
                areas.push(Area::new(RECORD_AREA_NAME, s, e, false));
                Some((start, end))
            }
            None => Some((start, end)),
        };
    }

    if let Some((start, end)) = pending {
        areas.push(Area::new(RECORD_AREA_NAME, start, end, false));
    }

    Ok(areas)
}
