use crate::errors::Result;
use crate::parse_hex;
use banks::Area;
use std::io::{self, BufRead, Read};

// Pending area while records are being read. Start and length come from
// different records which can be in any order.
#[derive(Default)]
struct Partial {
    name: String,
    start: Option<u32>,
    length: Option<u32>,
}

/// Parses the areas defined on an SDCC .noi file. Each area is defined by a
/// start record and a length record:
///
/// ```text
/// DEF s__CODE 0x200
/// DEF l__CODE 0x6A62
/// ```
///
/// Areas are returned in the order they were first seen, and only if both
/// records have been found for them.
pub fn parse(reader: impl Read) -> Result<Vec<Area>> {
    let mut partials: Vec<Partial> = vec![];

    for line in io::BufReader::new(reader).lines() {
        let line = line?;
        if !line.starts_with("DEF l__") && !line.starts_with("DEF s__") {
            continue;
        }

        let words = line.split_whitespace().collect::<Vec<_>>();
        if words.len() != 3 {
            continue;
        }

        // Skip the record kind and one of the underscores: "l__BSS" -> "_BSS".
        let (kind, name) = words[1].split_at(2);
        if name.contains("SFR") || name.contains("HRAM") {
            continue;
        }
        let Some(value) = parse_hex(words[2]) else {
            continue;
        };

        let idx = match partials.iter().position(|p| p.name == name) {
            Some(idx) => idx,
            None => {
                partials.push(Partial {
                    name: name.to_string(),
                    ..Default::default()
                });
                partials.len() - 1
            }
        };

        if kind.starts_with('s') {
            partials[idx].start = Some(value);
        } else if value > 0 {
            partials[idx].length = Some(value);
        }
    }

    Ok(partials
        .into_iter()
        .filter_map(|p| match (p.start, p.length) {
            (Some(start), Some(length)) => Some(Area::with_length(&p.name, start, length, false)),
            _ => None,
        })
        .collect())
}
