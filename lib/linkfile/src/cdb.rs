use crate::errors::Result;
use banks::Area;
use std::io::{self, BufRead, Read};

// Address spaces from symbol records which take up space in memory: code,
// code/static, internal RAM (lower 128 bytes), external RAM and internal RAM.
const ALLOWED_ADDRESS_SPACES: [char; 5] = ['C', 'D', 'E', 'F', 'G'];

#[derive(Default)]
struct Symbol {
    name: String,
    start: Option<u32>,
    length: Option<u32>,
}

// Splits a record into its fields. Fields are separated by any of the
// delimiters used by the format, and empty fields are ignored.
fn fields(line: &str) -> Vec<&str> {
    line.split([':', '$', '(', '{', '}', ')', ','])
        .filter(|w| !w.is_empty())
        .collect()
}

/// Parses the symbols from an SDCC .cdb (debug information) file. Symbols are
/// reconstructed out of linker records, which provide the address (with the
/// bank on the upper bits), and symbol records, which provide the size:
///
/// ```text
/// L:G$big_const_3$0_0$0:1784E
/// S:G$big_const_3$0_0$0({256}DA256d,SC:U),D,0,0
/// ```
///
/// Symbols are returned in the order they were first seen, and only if both
/// kinds of records have been found for them.
pub fn parse(reader: impl Read) -> Result<Vec<Area>> {
    let mut symbols: Vec<Symbol> = vec![];

    for line in io::BufReader::new(reader).lines() {
        let line = line?;

        // Linker records for the end of functions would overwrite the start
        // address.
        if line.starts_with("L:") && !line.starts_with("L:X") {
            let words = fields(&line);
            if words.len() != 6 {
                continue;
            }
            if let Ok(start) = u32::from_str_radix(words[5], 16) {
                symbol_mut(&mut symbols, words[2]).start = Some(start);
            }
        } else if line.starts_with("S:") {
            let words = fields(&line);
            if words.len() != 12 {
                continue;
            }
            if !words[9].starts_with(ALLOWED_ADDRESS_SPACES) {
                continue;
            }
            match words[5].parse::<u32>() {
                Ok(length) if length > 0 => {
                    symbol_mut(&mut symbols, words[2]).length = Some(length);
                }
                _ => {}
            }
        }
    }

    Ok(symbols
        .into_iter()
        .filter_map(|s| match (s.start, s.length) {
            (Some(start), Some(length)) => Some(Area::with_length(&s.name, start, length, false)),
            _ => None,
        })
        .collect())
}

fn symbol_mut<'a>(symbols: &'a mut Vec<Symbol>, name: &str) -> &'a mut Symbol {
    let idx = match symbols.iter().position(|s| s.name == name) {
        Some(idx) => idx,
        None => {
            symbols.push(Symbol {
                name: name.to_string(),
                ..Default::default()
            });
            symbols.len() - 1
        }
    };
    &mut symbols[idx]
}
