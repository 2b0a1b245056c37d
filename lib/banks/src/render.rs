use crate::engine::Bank;
use crate::options::{AreaSort, Options};
use crate::usage::used_bytes;
use std::io::{self, Write};

/// Width in characters of the small usage bar (inside of the brackets).
pub const MINIGRAPH_SIZE: u32 = 2 * 14;

/// Amount of bytes represented by each character of the large usage graph.
pub const LARGEGRAPH_BYTES_PER_CHAR: u32 = 16;

// Characters of the large usage graph before wrapping into a new line.
const LARGEGRAPH_LINE_WIDTH: u32 = 64;

/// Prints the given `banks` into `out`, along with their areas and usage
/// graphs as requested on the `options`.
pub fn print_banks(out: &mut impl Write, banks: &[Bank], options: &Options) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "Bank           Range             Size   Used   Used%   Free  Free% "
    )?;
    writeln!(
        out,
        "----------     ----------------  -----  -----  -----  -----  -----"
    )?;

    for bank in banks {
        print_bank_info(out, bank, options)?;

        if options.show_areas && options.area_sort != AreaSort::Hide {
            print_areas(out, bank, options)?;
        }
    }

    if options.show_largegraph {
        for bank in banks {
            print_large_graph(out, bank)?;
        }
    }

    Ok(())
}

fn print_bank_info(out: &mut impl Write, bank: &Bank, options: &Options) -> io::Result<()> {
    write!(
        out,
        "{:<15}0x{:04X} -> 0x{:04X}{:>7}{:>7}  {:>3}%{:>8}   {:>3}%",
        bank.name,
        bank.start,
        bank.end,
        bank.size_total,
        bank.size_used,
        bank.percent_used(),
        bank.size_free(),
        bank.percent_free(),
    )?;

    if options.show_minigraph {
        write!(out, " |")?;
        print_graph(out, bank, MINIGRAPH_SIZE)?;
        write!(out, "|")?;
    }

    writeln!(out)
}

fn print_areas(out: &mut impl Write, bank: &Bank, options: &Options) -> io::Result<()> {
    if !bank.areas.is_empty() {
        writeln!(out, "|")?;
    }

    for area in bank.areas.iter().filter(|a| options.displays_area(a)) {
        writeln!(
            out,
            "+{:<16}0x{:04X} -> 0x{:04X}{:>8}",
            area.name, area.start, area.end, area.length
        )?;
    }

    writeln!(out)
}

fn print_large_graph(out: &mut impl Write, bank: &Bank) -> io::Result<()> {
    writeln!(
        out,
        "\n\nStart: {}  0x{:04X} -> 0x{:04X}",
        bank.name, bank.start, bank.end
    )?;
    print_graph(out, bank, bank.size_total / LARGEGRAPH_BYTES_PER_CHAR)?;
    writeln!(out, "End: {}", bank.name)
}

/// Returns the character representing the given usage percentage on graphs.
pub fn graph_char(percent_used: u32) -> char {
    if percent_used > 95 {
        '#'
    } else if percent_used > 25 {
        '-'
    } else {
        '.'
    }
}

// Prints a usage graph for the given bank where the whole bank is split into
// `num_chars` buckets of equal size. Buckets span `size_total` rather than the
// address range of the bank so summarized banks are fully covered.
fn print_graph(out: &mut impl Write, bank: &Bank, num_chars: u32) -> io::Result<()> {
    if num_chars == 0 {
        return Ok(());
    }
    let range_size = bank.size_total / num_chars;
    if range_size == 0 {
        return Ok(());
    }

    let mut areas = bank.areas.clone();
    for c in 0..num_chars {
        let start = bank.start + c * range_size;
        let used = used_bytes(&mut areas, start, start + range_size - 1);

        write!(out, "{}", graph_char(used * 100 / range_size))?;
        if (c + 1) % LARGEGRAPH_LINE_WIDTH == 0 {
            writeln!(out)?;
        }
    }

    Ok(())
}
