use crate::area::{self, Area};

/// Returns the amount of bytes used by the given `areas` inside of the
/// inclusive range that goes from `range_start` to `range_end`.
///
/// Areas are allowed to overlap (e.g. a vector table inside of a bigger code
/// area), and shared bytes are only counted once. In order to do this, areas
/// are first sorted in their canonical order, which is also why this function
/// needs a mutable slice: new areas might have been pushed since the last
/// call.
pub fn used_bytes(areas: &mut [Area], range_start: u32, range_end: u32) -> u32 {
    areas.sort_by(area::compare);

    let mut total = 0;
    let mut window: Option<(u32, u32)> = None;

    for area in areas.iter() {
        // Clip the area into the requested range. Areas falling completely
        // outside of it don't count.
        let start = area.start.max(range_start);
        let end = area.end.min(range_end);
        if end < start {
            continue;
        }

        window = match window {
            // Overlapping or contiguous: extend the current window.
            Some((w_start, w_end)) if start <= w_end.saturating_add(1) => {
                Some((w_start, w_end.max(end)))
            }
            // The chain broke: account for the previous window and start a
            // new one.
            Some((w_start, w_end)) => {
                total += w_end - w_start + 1;
                Some((start, end))
            }
            None => Some((start, end)),
        };
    }

    if let Some((w_start, w_end)) = window {
        total += w_end - w_start + 1;
    }

    total
}
