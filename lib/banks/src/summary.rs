use crate::engine::Bank;
use crate::template::{round_up_power_of_2, MemKind, WRAM_X_MAX_BANKS};
use log::debug;

/// Collapses all the instances of each banked region into a single bank.
/// Non-banked regions are copied as they are.
///
/// Areas are copied with their addresses moved up by one bank size for each
/// bank above the lowest one of the region, so areas from different banks
/// never collide. The given banks are expected to have been finalized.
pub fn collapse(banks: &[Bank]) -> Vec<Bank> {
    let mut summarized: Vec<Bank> = vec![];
    let mut groups: Vec<Vec<&Bank>> = vec![];

    for bank in banks {
        if !bank.template.banked {
            summarized.push(bank.clone());
            continue;
        }

        match groups.iter_mut().find(|g| g[0].start == bank.start) {
            Some(group) => group.push(bank),
            None => {
                groups.push(vec![bank]);

                // Placeholder so the order of the regions is kept.
                summarized.push(bank.clone());
            }
        }
    }

    for group in groups {
        let merged = merge_group(&group);
        if let Some(dest) = summarized
            .iter_mut()
            .find(|b| b.template.banked && b.start == merged.start)
        {
            *dest = merged;
        }
    }

    summarized
}

// Lowest bank number for the given group of banks from the same region. This
// is usually the first valid bank of the region, but regions starting at bank
// 1 might still have a bank 0 when a fixed region overflows into them.
fn lowest_bank_num(group: &[&Bank]) -> u32 {
    group
        .iter()
        .map(|b| b.bank_num)
        .fold(group[0].template.base_num, u32::min)
}

// Merges all the banks from the same region into a single one.
fn merge_group(group: &[&Bank]) -> Bank {
    let lowest = lowest_bank_num(group);
    let mut dest = Bank {
        areas: vec![],
        ..group[0].clone()
    };

    for bank in group {
        let offset = (bank.bank_num - lowest) * bank.template.size();

        for area in bank.areas.iter() {
            let mut new_area = area.clone();
            new_area.start += offset;
            new_area.end = new_area.start + (new_area.length - 1);
            dest.areas.push(new_area);
        }
        dest.bank_num = dest.bank_num.max(bank.bank_num);
    }

    fixup_size_and_name(&mut dest, lowest);
    dest
}

/// Returns the maximum bank number that can be available for a region of the
/// given kind, given that `bank_num` is the highest one being used.
pub fn max_bank_num(kind: MemKind, bank_num: u32) -> u32 {
    match kind {
        // Next power of two minus one.
        MemKind::Rom => round_up_power_of_2(bank_num + 1) - 1,
        // SRAM comes in 1, 4, 8 or 16 banks.
        MemKind::Sram => {
            if bank_num > 7 {
                15
            } else if bank_num > 3 {
                7
            } else if bank_num > 1 {
                3
            } else {
                bank_num
            }
        }
        MemKind::Wram => WRAM_X_MAX_BANKS,
        MemKind::Vram | MemKind::Hram => bank_num,
    }
}

// After banks have been merged, compute the size of the whole region and
// rename it as "<template name><max used>/<max available>". Regions where only
// bank 0 is used keep their name and size.
fn fixup_size_and_name(bank: &mut Bank, lowest: u32) {
    let max_used = bank.bank_num;
    let template = bank.template;

    if max_used > 0 {
        bank.bank_num = max_bank_num(template.kind, max_used);
        bank.size_total = (bank.bank_num - lowest + 1) * template.size();
        bank.name = format!("{}{}/{}", template.name, max_used, bank.bank_num);
    }

    // The end of the bank is kept as is so the region is displayed as usual,
    // but the usage spans the whole region.
    bank.size_used = bank.used_bytes(bank.start, bank.start + bank.size_total - 1);

    debug!(
        "summarized {} ({}) into {} bytes, {} used",
        bank.name, template.kind, bank.size_total, bank.size_used
    );
}
