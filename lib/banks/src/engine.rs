use crate::area::{range_size, Area};
use crate::options::{InputSource, Options};
use crate::render::print_banks;
use crate::summary::collapse;
use crate::template::{
    bank_num_for, bank_only, overlap_size, template_containing, Template, MAX_ADDR_UNBANKED,
    TEMPLATES,
};
use crate::usage::used_bytes;
use crate::warning::Warning;
use log::debug;
use std::io::{self, Write};

/// Name given to placeholder areas filling the gaps between symbols.
const UNKNOWN_AREA_NAME: &str = "-?-";

/// A concrete instance of a memory region, along with the areas that have been
/// assigned to it.
#[derive(Clone, Debug)]
pub struct Bank {
    /// Display name. For banked regions it's the template name followed by the
    /// bank number (e.g. "ROM_3").
    pub name: String,

    /// Template this bank has been created from.
    pub template: &'static Template,

    /// First unbanked address of the bank.
    pub start: u32,

    /// Last unbanked address of the bank (inclusive).
    pub end: u32,

    /// Capacity of the bank in bytes.
    pub size_total: u32,

    /// Bytes used by the areas of this bank. Only reliable after the bank
    /// list has been finalized, as overlapping areas are counted multiple
    /// times before that.
    pub size_used: u32,

    /// Bank number.
    pub bank_num: u32,

    /// Areas assigned to this bank. Addresses are unbanked and clipped to the
    /// bounds of the bank.
    pub areas: Vec<Area>,
}

impl Bank {
    pub fn new(template: &'static Template, bank_num: u32) -> Self {
        let name = if template.banked {
            format!("{}{}", template.name, bank_num)
        } else {
            template.name.to_string()
        };

        Self {
            name,
            template,
            start: template.start,
            end: template.end,
            size_total: range_size(template.start, template.end),
            size_used: 0,
            bank_num,
            areas: vec![],
        }
    }

    /// Appends the given `area` into this bank and returns the overlap
    /// warnings it caused. If `suppress_duplicates` is set and the area is
    /// already there, it's discarded.
    ///
    /// NOTE: an area is considered to be already present when there is
    /// another area with exactly the same range whose name is contained in
    /// the name of the new one (and not when names are equal). This is what
    /// catches the paginated duplicates from .map files, but it might also
    /// discard an unrelated area that happens to share both its range and
    /// part of its name.
    pub fn add_area(&mut self, area: Area, suppress_duplicates: bool) -> Vec<Warning> {
        if suppress_duplicates
            && self.areas.iter().any(|existing| {
                area.name.contains(existing.name.as_str())
                    && area.start == existing.start
                    && area.end == existing.end
            })
        {
            debug!("discarding duplicate area {} in {}", area, self.name);
            return vec![];
        }

        let warnings = self
            .areas
            .iter()
            .filter_map(|existing| check_overlap(&area, existing))
            .collect();

        self.size_used += area.length;
        self.areas.push(area);

        warnings
    }

    /// Returns the amount of bytes used by the areas of this bank inside of
    /// the given inclusive range of unbanked addresses.
    pub fn used_bytes(&mut self, start: u32, end: u32) -> u32 {
        used_bytes(&mut self.areas, start, end)
    }

    /// Free bytes on this bank. Negative if the bank has been overused.
    pub fn size_free(&self) -> i64 {
        i64::from(self.size_total) - i64::from(self.size_used)
    }

    pub fn percent_used(&self) -> i64 {
        i64::from(self.size_used) * 100 / i64::from(self.size_total)
    }

    pub fn percent_free(&self) -> i64 {
        self.size_free() * 100 / i64::from(self.size_total)
    }

    // Fills the gaps between the areas of this bank with placeholder areas.
    // Gaps after the last area are not filled, since symbols don't say where
    // the data of their section ends.
    fn fill_gaps(&mut self, options: &Options) -> Vec<Warning> {
        self.areas.sort_by_key(|area| area.start);

        let mut gaps = vec![];
        let mut next_free = self.start;
        for area in self.areas.iter() {
            if !options.show_headers && area.is_header() {
                continue;
            }
            if area.start > next_free {
                gaps.push(Area::new(UNKNOWN_AREA_NAME, next_free, area.start - 1, false));
            }
            next_free = next_free.max(area.end.saturating_add(1));
        }

        let mut warnings = vec![];
        for gap in gaps {
            warnings.extend(self.add_area(gap, options.suppress_duplicates));
        }
        warnings
    }
}

// Returns a warning if the two given areas overlap and at least one of them
// was supposed to be exclusive. Header areas almost always overlap, so they
// are ignored.
fn check_overlap(a: &Area, b: &Area) -> Option<Warning> {
    if a.is_header() || b.is_header() || !(a.exclusive || b.exclusive) {
        return None;
    }

    let size = overlap_size(a.start_unbanked, a.end_unbanked, b.start_unbanked, b.end_unbanked);
    if size == 0 {
        return None;
    }

    Some(Warning::Overlap {
        size,
        first: a.clone(),
        second: b.clone(),
    })
}

/// The list of banks being built out of the areas reported by the input
/// files. This is the main entry point of this crate: feed areas with `check`
/// and then call either `finalize` or `finalize_and_render`.
#[derive(Debug, Default)]
pub struct Banks {
    options: Options,
    list: Vec<Bank>,
    warnings: Vec<Warning>,
    exit_error: bool,
}

impl Banks {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            list: vec![],
            warnings: vec![],
            exit_error: false,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Banks that have been created so far.
    pub fn banks(&self) -> &[Bank] {
        &self.list
    }

    /// All the warnings that have been raised so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Returns true if warnings are to be treated as errors and at least one
    /// has been raised.
    pub fn exit_error(&self) -> bool {
        self.exit_error
    }

    /// Assigns the given `area` to the banks it overlaps with, creating them
    /// if needed, and returns the warnings raised while doing so. Meant for
    /// areas read from input files: non-header areas become exclusive if
    /// `all_areas_exclusive` is set.
    pub fn check(&mut self, mut area: Area) -> Vec<Warning> {
        if self.options.all_areas_exclusive && !area.is_header() {
            area.exclusive = true;
        }
        self.assign(area)
    }

    /// Same as `check` but for areas given by hand, which keep the exclusive
    /// flag they were given.
    pub fn check_manual(&mut self, area: Area) -> Vec<Warning> {
        self.assign(area)
    }

    fn assign(&mut self, mut area: Area) -> Vec<Warning> {
        // Set the unbanked address range for comparison with the (unbanked)
        // templates.
        area.calc_unbanked_range();

        let mut raised = vec![];
        let mut size_assigned = 0;

        // An area may overlap more than one template.
        for template in TEMPLATES.iter() {
            let size = overlap_size(
                template.start,
                template.end,
                area.start_unbanked,
                area.end_unbanked,
            );
            if size == 0 {
                continue;
            }

            let bank_num = bank_num_for(template, area.start);
            raised.extend(self.add_to_bank(template, &area, bank_num));
            size_assigned += size;

            // Only non-banked regions are allowed to spill into the next one.
            if template.banked {
                break;
            }
        }

        debug!("area {}: {} bytes assigned", area, size_assigned);

        raised.extend(validate(&area));
        self.record(&raised);

        raised
    }

    // Adds the given area into the bank identified by the template and the
    // bank number. The area is clipped to the bounds of the template.
    fn add_to_bank(&mut self, template: &'static Template, area: &Area, bank_num: u32) -> Vec<Warning> {
        let unbanked = Area::new(
            &area.name,
            area.start_unbanked,
            area.end_unbanked,
            area.exclusive,
        );
        let Some(clipped) = unbanked.clipped(template.start, template.end) else {
            return vec![];
        };

        let suppress = self.options.suppress_duplicates;
        match self
            .list
            .iter_mut()
            .find(|bank| bank.start == template.start && bank.bank_num == bank_num)
        {
            Some(bank) => bank.add_area(clipped, suppress),
            None => {
                let mut bank = Bank::new(template, bank_num);
                debug!("new bank {}", bank.name);

                let warnings = bank.add_area(clipped, suppress);
                self.list.push(bank);
                warnings
            }
        }
    }

    fn record(&mut self, raised: &[Warning]) {
        for warning in raised {
            debug!("warning: {}", warning);
            if self.options.error_on_warning {
                self.exit_error = true;
            }
        }
        self.warnings.extend_from_slice(raised);
    }

    /// Sorts banks and their areas, fills symbol gaps if the input requires it
    /// and computes the actual usage of each bank. Returns the warnings raised
    /// in the process.
    pub fn finalize(&mut self) -> Vec<Warning> {
        self.list
            .sort_by(|a, b| a.start.cmp(&b.start).then(a.bank_num.cmp(&b.bank_num)));

        let mut raised = vec![];
        if self.options.input_source == InputSource::Cdb {
            for bank in self.list.iter_mut() {
                raised.extend(bank.fill_gaps(&self.options));
            }
        }

        for bank in self.list.iter_mut() {
            bank.size_used = bank.used_bytes(bank.start, bank.end);
            self.options.area_sort.sort(&mut bank.areas);
        }

        self.record(&raised);
        raised
    }

    /// Returns the banks with all the instances of each banked region
    /// collapsed into a single one. Meant to be called after `finalize`.
    pub fn summarize(&self) -> Vec<Bank> {
        let mut summarized = collapse(&self.list);
        for bank in summarized.iter_mut() {
            self.options.area_sort.sort(&mut bank.areas);
        }
        summarized
    }

    /// Finalizes the bank list and renders it into `out`, unless quiet mode
    /// is on. Returns the warnings raised while finalizing.
    pub fn finalize_and_render(&mut self, out: &mut impl Write) -> io::Result<Vec<Warning>> {
        let raised = self.finalize();

        if !self.options.quiet {
            if self.options.summarized {
                print_banks(out, &self.summarize(), &self.options)?;
            } else {
                print_banks(out, &self.list, &self.options)?;
            }
        }

        Ok(raised)
    }
}

// Checks the original (unclipped) area for wraparounds and region overflows.
fn validate(area: &Area) -> Vec<Warning> {
    let mut warnings = vec![];

    if area.underflows() {
        let limit = bank_only(area.start) + MAX_ADDR_UNBANKED;
        warnings.push(Warning::Underflow {
            name: area.name.clone(),
            start: area.start,
            end: area.end,
            limit,
            bytes: area.end - limit,
        });
    }

    // Non-banked regions with banked ones above them have their upper bound
    // set to the end of the region above.
    if let Some(template) = template_containing(area.start_unbanked) {
        let limit = bank_only(area.start) + template.overflow_end;
        if area.end > limit {
            warnings.push(Warning::RegionOverflow {
                name: area.name.clone(),
                start: area.start,
                end: area.end,
                limit,
                bytes: area.end - limit,
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::AreaSort;
    use pretty_assertions::assert_eq;

    fn area(name: &str, start: u32, end: u32) -> Area {
        Area::new(name, start, end, false)
    }

    fn exclusive(name: &str, start: u32, end: u32) -> Area {
        Area::new(name, start, end, true)
    }

    fn bank<'a>(banks: &'a Banks, name: &str) -> &'a Bank {
        banks.banks().iter().find(|b| b.name == name).unwrap()
    }

    fn names(banks: &Banks) -> Vec<&str> {
        banks.banks().iter().map(|b| b.name.as_str()).collect()
    }

    #[test]
    fn banked_area() {
        let mut banks = Banks::new(Options::default());
        assert!(banks.check(area("CODE", 0x0001_4000, 0x0001_6000)).is_empty());
        banks.finalize();

        assert_eq!(names(&banks), &["ROM_1"]);
        let rom = bank(&banks, "ROM_1");
        assert_eq!(rom.bank_num, 1);
        assert_eq!(rom.size_total, 0x4000);
        assert_eq!(rom.size_used, 0x2001);
        assert_eq!(rom.areas[0].start, 0x4000);
        assert_eq!(rom.areas[0].end, 0x6000);
    }

    #[test]
    fn overlapping_areas_in_same_bank() {
        let mut banks = Banks::new(Options::default());
        banks.check(area("_A", 0x0001_4000, 0x0001_4100));
        banks.check(area("_B", 0x0001_4080, 0x0001_4200));

        // Provisional value counts the overlap twice.
        assert_eq!(bank(&banks, "ROM_1").size_used, 0x101 + 0x181);

        banks.finalize();
        assert_eq!(bank(&banks, "ROM_1").size_used, 0x201);
    }

    #[test]
    fn area_spanning_fixed_regions() {
        let mut banks = Banks::new(Options::default());
        let warnings = banks.check(area("_CODE", 0x0200, 0x51FF));
        banks.finalize();

        // ROM0 overflowing into the switchable window without bank bits ends
        // up in ROM_1, and this is allowed by its overflow bound.
        assert!(warnings.is_empty());
        assert_eq!(names(&banks), &["ROM_0", "ROM_1"]);
        assert_eq!(bank(&banks, "ROM_0").size_used, 0x3E00);
        assert_eq!(bank(&banks, "ROM_1").size_used, 0x1200);
    }

    #[test]
    fn banked_area_does_not_spill() {
        let mut banks = Banks::new(Options::default());
        let warnings = banks.check(area("_CODE_2", 0x0002_7F00, 0x0002_8010));
        banks.finalize();

        assert_eq!(names(&banks), &["ROM_2"]);
        assert_eq!(bank(&banks, "ROM_2").size_used, 0x100);
        assert_eq!(
            warnings,
            vec![Warning::RegionOverflow {
                name: String::from("_CODE_2"),
                start: 0x0002_7F00,
                end: 0x0002_8010,
                limit: 0x0002_7FFF,
                bytes: 0x11,
            }]
        );
    }

    #[test]
    fn area_inside_region_has_no_warnings() {
        let mut banks = Banks::new(Options::default());
        assert!(banks.check(area("_DATA", 0xC0A0, 0xD723)).is_empty());
        assert!(banks.check(area("_CODE_1", 0x0001_4000, 0x0001_7FFF)).is_empty());
        assert!(banks.check(area("_SRAM", 0x0003_A000, 0x0003_BFFF)).is_empty());
        assert!(banks.warnings().is_empty());
        assert!(!banks.exit_error());
    }

    #[test]
    fn wram_overflow_into_upper_bank() {
        let mut banks = Banks::new(Options::default());
        banks.check(area("_DATA", 0xC0A0, 0xD723));
        banks.finalize();

        assert_eq!(names(&banks), &["WRAM_LO", "WRAM_HI_0"]);
        assert_eq!(bank(&banks, "WRAM_LO").size_used, 0xF60);
        assert_eq!(bank(&banks, "WRAM_HI_0").size_used, 0x724);
    }

    #[test]
    fn underflow() {
        let mut banks = Banks::new(Options::default());
        let warnings = banks.check(area("_BIG", 0x0000_FFF0, 0x0001_0010));

        assert_eq!(warnings.len(), 2);
        assert_eq!(
            warnings[0],
            Warning::Underflow {
                name: String::from("_BIG"),
                start: 0xFFF0,
                end: 0x0001_0010,
                limit: 0xFFFF,
                bytes: 0x11,
            }
        );
        assert!(matches!(warnings[1], Warning::RegionOverflow { .. }));

        // The area was clipped to the unbanked address space before being
        // matched, so it ends up in HRAM.
        banks.finalize();
        assert_eq!(names(&banks), &["HRAM"]);
        let hram = bank(&banks, "HRAM");
        assert_eq!(hram.areas[0].start, 0xFFF0);
        assert_eq!(hram.areas[0].end, 0xFFFE);
    }

    #[test]
    fn duplicates_are_suppressed() {
        let mut banks = Banks::new(Options::default());
        banks.check(area("_CODE", 0x0200, 0x02FF));
        banks.check(area("_CODE", 0x0200, 0x02FF));
        banks.check(area("_CODE_0", 0x0200, 0x02FF));

        let rom = bank(&banks, "ROM_0");
        assert_eq!(rom.areas.len(), 1);
        assert_eq!(rom.size_used, 0x100);
    }

    #[test]
    fn duplicates_need_the_same_range() {
        let mut banks = Banks::new(Options::default());
        banks.check(area("_CODE", 0x0200, 0x02FF));
        banks.check(area("_CODE", 0x0200, 0x0300));

        assert_eq!(bank(&banks, "ROM_0").areas.len(), 2);
    }

    #[test]
    fn duplicates_when_suppression_is_off() {
        let mut banks = Banks::new(Options {
            suppress_duplicates: false,
            ..Default::default()
        });
        banks.check(area("_CODE", 0x0200, 0x02FF));
        banks.check(area("_CODE", 0x0200, 0x02FF));

        let rom = bank(&banks, "ROM_0");
        assert_eq!(rom.areas.len(), 2);
        assert_eq!(rom.size_used, 0x200);

        banks.finalize();
        assert_eq!(bank(&banks, "ROM_0").size_used, 0x100);
    }

    #[test]
    fn exclusive_overlap() {
        let mut banks = Banks::new(Options::default());
        assert!(banks.check(area("_CODE", 0x0001_4000, 0x0001_4FFF)).is_empty());
        assert!(banks.check(area("_DATA", 0x0001_4F00, 0x0001_5FFF)).is_empty());

        let warnings = banks.check(exclusive("_EXCL", 0x0001_4FF0, 0x0001_500F));
        assert_eq!(warnings.len(), 2);
        assert!(warnings
            .iter()
            .all(|w| matches!(w, Warning::Overlap { .. })));

        match &warnings[0] {
            Warning::Overlap {
                size,
                first,
                second,
            } => {
                assert_eq!(*size, 0x10);
                assert_eq!(first.name, "_EXCL");
                assert_eq!(second.name, "_CODE");
            }
            _ => unreachable!(),
        }
        assert!(!banks.exit_error());
    }

    #[test]
    fn exclusive_overlap_with_headers() {
        let mut banks = Banks::new(Options::default());
        banks.check(area("_HEADER0", 0x0000, 0x00FF));
        assert!(banks.check(exclusive("_CODE", 0x0000, 0x0FFF)).is_empty());
        assert!(banks.check(area("_BASE", 0x0F00, 0x10FF)).len() == 1);
    }

    #[test]
    fn exclusive_in_different_banks() {
        let mut banks = Banks::new(Options::default());
        banks.check(exclusive("_CODE_1", 0x0001_4000, 0x0001_4FFF));
        assert!(banks.check(exclusive("_CODE_2", 0x0002_4000, 0x0002_4FFF)).is_empty());
    }

    #[test]
    fn all_areas_exclusive() {
        let mut banks = Banks::new(Options {
            all_areas_exclusive: true,
            error_on_warning: true,
            ..Default::default()
        });
        banks.check(area("_HEADER", 0x0000, 0x01FF));
        banks.check(area("_CODE", 0x0100, 0x0FFF));
        assert!(!banks.exit_error());

        let warnings = banks.check(area("_HOME", 0x0F00, 0x10FF));
        assert_eq!(warnings.len(), 1);
        assert!(banks.exit_error());
        assert_eq!(banks.warnings().len(), 1);
    }

    #[test]
    fn manual_areas_keep_their_flag() {
        let mut banks = Banks::new(Options {
            all_areas_exclusive: true,
            ..Default::default()
        });
        banks.check_manual(area("_RESERVED", 0x0100, 0x01FF));
        let warnings = banks.check_manual(area("_SHARED", 0x0180, 0x02FF));
        assert!(warnings.is_empty());

        let bank = &banks.banks()[0];
        assert!(bank.areas.iter().all(|a| !a.exclusive));

        // Areas from input files still become exclusive.
        let warnings = banks.check(area("_CODE", 0x0200, 0x0FFF));
        assert_eq!(warnings.len(), 1);

        // And manual exclusive areas are still honored.
        let warnings = banks.check_manual(Area::new("_FIXED", 0x0F80, 0x10FF, true));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn banks_are_sorted() {
        let mut banks = Banks::new(Options::default());
        banks.check(area("_DATA", 0xC0A0, 0xC0FF));
        banks.check(area("_CODE_3", 0x0003_4000, 0x0003_40FF));
        banks.check(area("_CODE_1", 0x0001_4000, 0x0001_40FF));
        banks.check(area("_CODE", 0x0200, 0x02FF));
        banks.finalize();

        assert_eq!(names(&banks), &["ROM_0", "ROM_1", "ROM_3", "WRAM_LO"]);
    }

    #[test]
    fn areas_are_sorted_by_option() {
        let mut banks = Banks::new(Options {
            area_sort: AreaSort::SizeDesc,
            ..Default::default()
        });
        banks.check(area("_SMALL", 0x0200, 0x020F));
        banks.check(area("_BIG", 0x0300, 0x0FFF));
        banks.finalize();

        let rom = bank(&banks, "ROM_0");
        assert_eq!(rom.areas[0].name, "_BIG");
        assert_eq!(rom.areas[1].name, "_SMALL");
    }

    #[test]
    fn gaps_are_filled_for_symbol_files() {
        let mut banks = Banks::new(Options {
            input_source: InputSource::Cdb,
            ..Default::default()
        });
        banks.check(area("big_const_1", 0x0001_4010, 0x0001_401F));
        banks.check(area("big_const_2", 0x0001_4030, 0x0001_403F));
        banks.finalize();

        let rom = bank(&banks, "ROM_1");
        let areas = rom
            .areas
            .iter()
            .map(|a| (a.name.as_str(), a.start, a.end))
            .collect::<Vec<_>>();
        assert_eq!(
            areas,
            &[
                ("-?-", 0x4000, 0x400F),
                ("big_const_1", 0x4010, 0x401F),
                ("-?-", 0x4020, 0x402F),
                ("big_const_2", 0x4030, 0x403F),
            ]
        );
        assert_eq!(rom.size_used, 0x40);
    }

    #[test]
    fn gaps_are_not_filled_for_map_files() {
        let mut banks = Banks::new(Options {
            input_source: InputSource::Map,
            ..Default::default()
        });
        banks.check(area("_CODE_1", 0x0001_4010, 0x0001_401F));
        banks.finalize();

        assert_eq!(bank(&banks, "ROM_1").areas.len(), 1);
    }

    #[test]
    fn percentages() {
        let mut banks = Banks::new(Options::default());
        banks.check(area("_CODE", 0x0000, 0x0FFF));
        banks.finalize();

        let rom = bank(&banks, "ROM_0");
        assert_eq!(rom.percent_used(), 25);
        assert_eq!(rom.percent_free(), 75);
        assert_eq!(rom.size_free(), 0x3000);
    }

    #[test]
    fn quiet_mode_renders_nothing() {
        let mut banks = Banks::new(Options {
            quiet: true,
            ..Default::default()
        });
        banks.check(area("_CODE", 0x0000, 0x0FFF));

        let mut out = vec![];
        banks.finalize_and_render(&mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(bank(&banks, "ROM_0").size_used, 0x1000);
    }
}
