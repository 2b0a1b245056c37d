use anyhow::{anyhow, bail, Context, Result};
use banks::{AreaSort, Options};
use clap::ValueEnum;
use toml::{Table, Value};

/// Ordering of areas as given by the user.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Sort {
    /// By start address, then by end address and then by name.
    Default,

    /// Biggest areas first.
    Size,

    /// By start address only.
    Address,

    /// Don't show areas at all.
    Hide,
}

impl From<Sort> for AreaSort {
    fn from(sort: Sort) -> Self {
        match sort {
            Sort::Default => AreaSort::Default,
            Sort::Size => AreaSort::SizeDesc,
            Sort::Address => AreaSort::AddrAsc,
            Sort::Hide => AreaSort::Hide,
        }
    }
}

/// Applies the defaults given on a TOML configuration into `options`. Keys
/// are named after the long flags of the command line, e.g.:
///
/// ```toml
/// areas = true
/// sort = "size"
/// hide_size = 16
/// ```
pub fn apply(contents: &str, options: &mut Options) -> Result<()> {
    let table = contents
        .parse::<Table>()
        .context("malformed configuration")?;

    for (key, value) in table.iter() {
        match key.as_str() {
            "areas" => options.show_areas = boolean(key, value)?,
            "sort" => {
                let name = string(key, value)?;
                let sort = Sort::from_str(name, false)
                    .map_err(|_| anyhow!("unknown sorting '{}' for '{}'", name, key))?;
                options.area_sort = sort.into();
            }
            "hide_size" => options.area_hide_size = integer(key, value)?,
            "headers" => options.show_headers = boolean(key, value)?,
            "minigraph" => options.show_minigraph = boolean(key, value)?,
            "largegraph" => options.show_largegraph = boolean(key, value)?,
            "summarized" => options.summarized = boolean(key, value)?,
            "all_exclusive" => options.all_areas_exclusive = boolean(key, value)?,
            "error_on_warning" => options.error_on_warning = boolean(key, value)?,
            "quiet" => options.quiet = boolean(key, value)?,
            "dedup" => options.suppress_duplicates = boolean(key, value)?,
            _ => bail!("unknown configuration key '{}'", key),
        }
    }

    Ok(())
}

fn boolean(key: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| anyhow!("'{}' must be either true or false", key))
}

fn string<'a>(key: &str, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| anyhow!("'{}' must be a string", key))
}

fn integer(key: &str, value: &Value) -> Result<u32> {
    value
        .as_integer()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| anyhow!("'{}' must be a positive integer", key))
}
