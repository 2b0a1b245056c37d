use crate::template::{bank_only, without_bank, MAX_ADDR_UNBANKED};
use std::cmp::Ordering;
use std::fmt;

/// A named and contiguous address range as reported by a compiler or linker.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Area {
    /// Name of the area. Also used when checking for duplicates.
    pub name: String,

    /// First address of the area. The bank number might be encoded on the
    /// upper 16 bits (virtual addressing).
    pub start: u32,

    /// Last address of the area (inclusive).
    pub end: u32,

    /// Same as `start` without the bank bits. Set by the bank engine.
    pub start_unbanked: u32,

    /// Last unbanked address, computed relative to `start` and capped at the
    /// end of the unbanked address space. Set by the bank engine.
    pub end_unbanked: u32,

    /// Size in bytes of the area.
    pub length: u32,

    /// Whether any overlap with this area is to be reported.
    pub exclusive: bool,
}

impl Area {
    /// Returns a new area spanning from `start` to `end` (inclusive).
    pub fn new(name: &str, start: u32, end: u32, exclusive: bool) -> Self {
        Self {
            name: name.to_string(),
            start,
            end,
            start_unbanked: without_bank(start),
            end_unbanked: without_bank(end),
            length: range_size(start, end),
            exclusive,
        }
    }

    /// Returns a new area of `length` bytes which starts at `start`. The
    /// length must be greater than zero.
    pub fn with_length(name: &str, start: u32, length: u32, exclusive: bool) -> Self {
        Self::new(
            name,
            start,
            start.wrapping_add(length.saturating_sub(1)),
            exclusive,
        )
    }

    /// Returns true if this is a header area. These almost always overlap with
    /// other areas, so they are treated specially.
    pub fn is_header(&self) -> bool {
        self.name.contains("HEADER")
    }

    /// Returns true if the end of the area goes beyond the unbanked address
    /// space of the bank it starts on, wrapping around.
    pub fn underflows(&self) -> bool {
        u64::from(self.end) > u64::from(bank_only(self.start)) + u64::from(MAX_ADDR_UNBANKED)
    }

    /// Sets the unbanked range for this area. The end is computed relative to
    /// the start so the full size is kept, and it gets capped at the end of
    /// the unbanked address space so there are no wraparound errors.
    pub fn calc_unbanked_range(&mut self) {
        self.start_unbanked = without_bank(self.start);
        self.end_unbanked = if self.underflows() {
            MAX_ADDR_UNBANKED
        } else {
            self.end.saturating_sub(self.start) + self.start_unbanked
        };
    }

    /// Returns a copy of this area restricted to the given inclusive range, or
    /// None if nothing is left of it.
    pub fn clipped(&self, start: u32, end: u32) -> Option<Area> {
        let new_start = self.start.max(start);
        let new_end = self.end.min(end);
        if new_end < new_start {
            return None;
        }

        Some(Area {
            name: self.name.clone(),
            start: new_start,
            end: new_end,
            start_unbanked: without_bank(new_start),
            end_unbanked: without_bank(new_end),
            length: range_size(new_start, new_end),
            exclusive: self.exclusive,
        })
    }

    /// Returns true if both areas share at least one byte.
    pub fn overlaps(&self, other: &Area) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Canonical ordering of areas: by start address, then by end address and
/// then by name. Merging in the usage calculator relies on it.
pub fn compare(a: &Area, b: &Area) -> Ordering {
    a.start
        .cmp(&b.start)
        .then(a.end.cmp(&b.end))
        .then_with(|| a.name.cmp(&b.name))
}

/// Size of the given inclusive range.
pub fn range_size(start: u32, end: u32) -> u32 {
    end.wrapping_sub(start).wrapping_add(1)
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} 0x{:04x} -> 0x{:04x} ({} bytes{})",
            self.name,
            self.start,
            self.end,
            self.length,
            if self.exclusive { ", EXCLUSIVE" } else { "" }
        )
    }
}
