use crate::area::Area;
use thiserror::Error;

/// Structural problems found while assigning areas to banks. None of them
/// stops the processing of further areas.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Two areas share bytes and at least one of them is exclusive.
    #[error("areas overlap by {size} bytes, possible bank overflow: {first} and {second}")]
    Overlap {
        size: u32,
        first: Area,
        second: Area,
    },

    /// The area extends past the end of the memory region it starts in.
    #[error(
        "area {name} at 0x{start:x} -> 0x{end:x} extends past end of memory region at 0x{limit:x} (overflow by {bytes} bytes)"
    )]
    RegionOverflow {
        name: String,
        start: u32,
        end: u32,
        limit: u32,
        bytes: u32,
    },

    /// The area extends past the end of the unbanked address space and would
    /// wrap around.
    #[error(
        "area {name} at 0x{start:x} -> 0x{end:x} extends past end of address space at 0x{limit:x} (underflow by {bytes} bytes)"
    )]
    Underflow {
        name: String,
        start: u32,
        end: u32,
        limit: u32,
        bytes: u32,
    },
}
