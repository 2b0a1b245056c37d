use std::fmt;

/// Highest address reachable without bank-select bits.
pub const MAX_ADDR_UNBANKED: u32 = 0x0000_FFFF;

/// Mask for the virtual addressing bits where .noi/.cdb files and friends
/// store the bank number.
pub const BANK_ADDR_VADDR_MASK: u32 = 0xFFFF_0000;

// Window of the upper ROM region as seen from a fixed, non-switched bank.
const BANK_ADDR_ROM_UPPER_START: u32 = 0x4000;
const BANK_ADDR_ROM_UPPER_END: u32 = 0x7FFF;

/// Amount of switchable WRAM banks available on CGB hardware.
pub const WRAM_X_MAX_BANKS: u32 = 7;

/// Classification of a memory region.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MemKind {
    Rom,
    Vram,
    Sram,
    Wram,
    Hram,
}

impl fmt::Display for MemKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MemKind::Rom => write!(f, "ROM"),
            MemKind::Vram => write!(f, "VRAM"),
            MemKind::Sram => write!(f, "SRAM"),
            MemKind::Wram => write!(f, "WRAM"),
            MemKind::Hram => write!(f, "HRAM"),
        }
    }
}

/// Static description of a memory region type. Addresses are always
/// unbanked.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Template {
    /// Name of the region. Banked regions get the bank number appended to it.
    pub name: &'static str,

    /// First address of the region.
    pub start: u32,

    /// Last address of the region (inclusive).
    pub end: u32,

    /// Whether the region is switched through a bank controller.
    pub banked: bool,

    /// Legal upper bound for areas starting in this region. Non-banked regions
    /// with a banked region right above them are allowed to spill into it.
    pub overflow_end: u32,

    /// Kind of memory backing this region.
    pub kind: MemKind,

    /// First valid bank number for this region (either 0 or 1).
    pub base_num: u32,
}

impl Template {
    pub const fn new(
        name: &'static str,
        start: u32,
        end: u32,
        banked: bool,
        overflow_end: u32,
        kind: MemKind,
        base_num: u32,
    ) -> Self {
        Self {
            name,
            start,
            end,
            banked,
            overflow_end,
            kind,
            base_num,
        }
    }

    /// Size in bytes of a single instance of this region.
    pub const fn size(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Returns true if the given unbanked range shares at least one byte with
    /// this region.
    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        overlap_size(self.start, self.end, start, end) > 0
    }

    /// Returns true if the given unbanked address lies inside of this region.
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.start && addr <= self.end
    }
}

//  0000-3FFF   16KB ROM Bank 00     (fixed)
//  4000-7FFF   16KB ROM Bank 01..NN (switchable)
//  8000-9FFF   8KB Video RAM        (switchable bank 0-1 in CGB Mode)
//  A000-BFFF   8KB External RAM     (switchable, if any)
//  C000-CFFF   4KB Work RAM Bank 0
//  D000-DFFF   4KB Work RAM Bank 1  (switchable bank 1-7 in CGB Mode)
//  FF80-FFFE   High RAM
pub static TEMPLATES: [Template; 7] = [
    Template::new("ROM_0", 0x0000, 0x3FFF, false, 0x7FFF, MemKind::Rom, 0),
    Template::new("ROM_", 0x4000, 0x7FFF, true, 0x7FFF, MemKind::Rom, 1),
    Template::new("VRAM_", 0x8000, 0x9FFF, true, 0x9FFF, MemKind::Vram, 0),
    Template::new("SRAM_", 0xA000, 0xBFFF, true, 0xBFFF, MemKind::Sram, 0),
    Template::new("WRAM_LO", 0xC000, 0xCFFF, false, 0xDFFF, MemKind::Wram, 0),
    Template::new("WRAM_HI_", 0xD000, 0xDFFF, true, 0xDFFF, MemKind::Wram, 1),
    Template::new("HRAM", 0xFF80, 0xFFFE, false, 0xFFFE, MemKind::Hram, 0),
];

/// Strips the bank bits from the given address.
pub const fn without_bank(addr: u32) -> u32 {
    addr & MAX_ADDR_UNBANKED
}

/// Keeps only the bank bits from the given address.
pub const fn bank_only(addr: u32) -> u32 {
    addr & BANK_ADDR_VADDR_MASK
}

/// Returns the bank number encoded in the given virtual address.
pub const fn bank_get_num(addr: u32) -> u32 {
    (addr & BANK_ADDR_VADDR_MASK) >> 16
}

/// Returns the amount of bytes shared by the two given inclusive ranges, zero
/// if they don't overlap at all.
pub fn overlap_size(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> u32 {
    if b_start > a_end || b_end < a_start {
        0
    } else {
        a_end.min(b_end) - a_start.max(b_start) + 1
    }
}

/// Returns the bank number that owns an area starting at `area_start` (a
/// virtual address) once it has been matched against `template`.
///
/// An area can span multiple regions, so the base address is taken from the
/// matched template rather than from the area itself: the area might start in
/// a lower region which was handled before. Then, if the result falls into the
/// upper ROM window while claiming bank 0 (i.e. ROM0 overflowing into ROM1
/// without bank bits), it gets tagged as bank 1.
pub fn bank_num_for(template: &Template, area_start: u32) -> u32 {
    let mut addr = bank_only(area_start) | without_bank(template.start);

    if without_bank(addr) >= BANK_ADDR_ROM_UPPER_START
        && without_bank(addr) <= BANK_ADDR_ROM_UPPER_END
        && bank_get_num(addr) == 0
    {
        addr |= 1 << 16;
    }

    bank_get_num(addr)
}

/// Returns the template whose unbanked range contains the given address.
pub fn template_containing(addr: u32) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.contains(addr))
}

/// Rounds the given value up to the next power of two (or returns it as is if
/// it already is one).
pub fn round_up_power_of_2(val: u32) -> u32 {
    if val <= 1 {
        return 1;
    }
    val.next_power_of_two()
}
