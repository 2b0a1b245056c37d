use crate::area::{self, Area};
use std::cmp::Ordering;

/// Order in which areas are displayed inside of each bank.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AreaSort {
    /// Canonical order: start address, end address and name.
    #[default]
    Default,

    /// Biggest areas first, ties broken by name.
    SizeDesc,

    /// Start address only. Areas sharing a start address keep their relative
    /// order.
    AddrAsc,

    /// Areas are not displayed at all.
    Hide,
}

impl AreaSort {
    /// Sorts the given areas according to this strategy.
    pub fn sort(&self, areas: &mut [Area]) {
        match self {
            AreaSort::Default | AreaSort::Hide => areas.sort_by(area::compare),
            AreaSort::SizeDesc => areas.sort_by(compare_size_desc),
            AreaSort::AddrAsc => areas.sort_by_key(|a| a.start),
        }
    }
}

fn compare_size_desc(a: &Area, b: &Area) -> Ordering {
    b.length.cmp(&a.length).then_with(|| a.name.cmp(&b.name))
}

/// Format of the file where areas have been extracted from.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum InputSource {
    #[default]
    None,
    Cdb,
    Noi,
    Map,
    Ihx,
    Rgbds,
}

/// Options for a run. This is built once and then handed over to the bank
/// engine, which will pass it down to the summarizer and the renderer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Options {
    /// Discard areas with the same range as an existing one whose name is
    /// contained in the new one. Some formats list the same area twice.
    pub suppress_duplicates: bool,

    /// Treat all areas (except headers) as exclusive.
    pub all_areas_exclusive: bool,

    /// Flag the run as failed whenever a warning is raised.
    pub error_on_warning: bool,

    /// Ordering (or hiding) of areas when displaying them.
    pub area_sort: AreaSort,

    /// Display the areas of each bank.
    pub show_areas: bool,

    /// Areas smaller than this are not displayed.
    pub area_hide_size: u32,

    /// Display header areas, which are hidden by default.
    pub show_headers: bool,

    /// Don't render anything.
    pub quiet: bool,

    /// Format of the input. Symbol-based formats get their gaps filled with
    /// placeholder areas.
    pub input_source: InputSource,

    /// Collapse all instances of banked regions into a single record.
    pub summarized: bool,

    /// Display a small usage bar next to each bank.
    pub show_minigraph: bool,

    /// Display a large usage graph for each bank.
    pub show_largegraph: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            suppress_duplicates: true,
            all_areas_exclusive: false,
            error_on_warning: false,
            area_sort: AreaSort::Default,
            show_areas: false,
            area_hide_size: 0,
            show_headers: false,
            quiet: false,
            input_source: InputSource::None,
            summarized: false,
            show_minigraph: false,
            show_largegraph: false,
        }
    }
}

impl Options {
    /// Returns true if the given area should be listed when rendering.
    pub fn displays_area(&self, area: &Area) -> bool {
        (self.show_headers || !area.is_header()) && area.length >= self.area_hide_size
    }
}
