mod config;

use anyhow::{bail, Context, Result};
use banks::{Banks, Options, Warning};
use clap::Parser as ClapParser;
use config::Sort;
use linkfile::{parse_manual_area, Format};
use log::{debug, LevelFilter};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Estimate the space used by a Game Boy ROM out of the files produced when
/// building it (.map, .noi, .cdb or .ihx).
#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File to be read. The format is guessed from the extension.
    file: PathBuf,

    /// Show the areas inside of each bank.
    #[arg(short = 'a', long)]
    areas: bool,

    /// Ordering of the areas when they are shown.
    #[arg(long, value_enum)]
    sort: Option<Sort>,

    /// Hide areas smaller than the given size in bytes.
    #[arg(long, value_name = "BYTES")]
    hide_size: Option<u32>,

    /// Show header areas, which are hidden by default.
    #[arg(long)]
    headers: bool,

    /// Show a small usage graph next to each bank.
    #[arg(short = 'g', long)]
    minigraph: bool,

    /// Show a large usage graph for each bank.
    #[arg(short = 'G', long)]
    largegraph: bool,

    /// Merge all the banks of each region into a single entry.
    #[arg(short = 's', long)]
    summarized: bool,

    /// Treat all areas as exclusive, so any overlap is reported.
    #[arg(short = 'E', long)]
    all_exclusive: bool,

    /// Treat warnings as errors.
    #[arg(short = 'R', long)]
    error_on_warning: bool,

    /// Don't show anything other than warnings and errors.
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Keep areas that look like duplicates of another one.
    #[arg(long)]
    no_dedup: bool,

    /// Add an area given as NAME:HEXADDR:HEXLEN. It can be repeated.
    #[arg(short = 'm', long = "manual", value_name = "NAME:ADDR:LEN")]
    manual: Vec<String>,

    /// Same as `--manual` but the area is exclusive.
    #[arg(short = 'e', long = "manual-exclusive", value_name = "NAME:ADDR:LEN")]
    manual_exclusive: Vec<String>,

    /// TOML file with default values for the flags above. Flags given on the
    /// command line take precedence.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Log what is being done into the standard error.
    #[arg(short = 'v', long, default_value_t = false)]
    verbose: bool,
}

// Builds the options for the bank engine: defaults first, then the
// configuration file (if any) and finally the command line flags.
fn build_options(args: &Args, config: Option<&str>, format: Format) -> Result<Options> {
    let mut options = Options::default();

    if let Some(contents) = config {
        config::apply(contents, &mut options)?;
    }

    options.show_areas |= args.areas;
    options.show_headers |= args.headers;
    options.show_minigraph |= args.minigraph;
    options.show_largegraph |= args.largegraph;
    options.summarized |= args.summarized;
    options.all_areas_exclusive |= args.all_exclusive;
    options.error_on_warning |= args.error_on_warning;
    options.quiet |= args.quiet;
    if args.no_dedup {
        options.suppress_duplicates = false;
    }
    if let Some(sort) = args.sort {
        options.area_sort = sort.into();
    }
    if let Some(size) = args.hide_size {
        options.area_hide_size = size;
    }
    options.input_source = format.input_source();

    Ok(options)
}

fn read_file(path: &Path) -> Result<String> {
    if !path.is_file() {
        bail!("'{}' is not a valid file", path.display());
    }
    fs::read_to_string(path).with_context(|| format!("could not read '{}'", path.display()))
}

fn report(warnings: &[Warning], warn_as_errors: bool) {
    for warning in warnings {
        if warn_as_errors {
            eprintln!("error: {}", warning);
        } else {
            eprintln!("warning: {}", warning);
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .parse_default_env()
        .init();

    let contents = read_file(&args.file)?;
    let format = Format::detect(&args.file, &contents)?;
    debug!("reading '{}' as {:?}", args.file.display(), format);

    let config = match &args.config {
        Some(path) => Some(read_file(path)?),
        None => None,
    };
    let options = build_options(&args, config.as_deref(), format)
        .context("could not load the configuration")?;
    let warn_as_errors = options.error_on_warning;

    // Manual areas go first, so they are there when checking overlaps with the
    // ones from the file. Warnings are reported as soon as they are raised.
    let mut banks = Banks::new(options);
    for arg in args.manual.iter() {
        report(&banks.check_manual(parse_manual_area(arg, false)?), warn_as_errors);
    }
    for arg in args.manual_exclusive.iter() {
        report(&banks.check_manual(parse_manual_area(arg, true)?), warn_as_errors);
    }
    for area in format.parse(contents.as_bytes())? {
        report(&banks.check(area), warn_as_errors);
    }

    let mut stdout = io::stdout().lock();
    let raised = banks.finalize_and_render(&mut stdout)?;
    stdout.flush()?;
    report(&raised, warn_as_errors);

    if banks.exit_error() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use banks::{AreaSort, InputSource};

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("romusage").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn flags() {
        let args = args(&[
            "game.map",
            "-a",
            "--sort",
            "address",
            "-g",
            "-m",
            "_A:C000:10",
            "-m",
            "_B:C100:10",
            "-e",
            "_C:D000:1",
        ]);

        assert_eq!(args.file, PathBuf::from("game.map"));
        assert!(args.areas && args.minigraph && !args.largegraph);
        assert_eq!(args.sort, Some(Sort::Address));
        assert_eq!(args.manual, vec!["_A:C000:10", "_B:C100:10"]);
        assert_eq!(args.manual_exclusive, vec!["_C:D000:1"]);
    }

    #[test]
    fn defaults() {
        let options = build_options(&args(&["game.cdb"]), None, Format::Cdb).unwrap();

        assert_eq!(
            options,
            Options {
                input_source: InputSource::Cdb,
                ..Default::default()
            }
        );
    }

    #[test]
    fn command_line_takes_precedence() {
        let config = "sort = \"size\"\nhide_size = 64\nareas = true\ndedup = true\n";
        let options = build_options(
            &args(&["game.noi", "--sort", "hide", "--no-dedup", "-R"]),
            Some(config),
            Format::Noi,
        )
        .unwrap();

        assert_eq!(options.area_sort, AreaSort::Hide);
        assert_eq!(options.area_hide_size, 64);
        assert!(options.show_areas);
        assert!(!options.suppress_duplicates);
        assert!(options.error_on_warning);
        assert_eq!(options.input_source, InputSource::Noi);
    }

    #[test]
    fn bad_configuration() {
        assert!(build_options(&args(&["game.map"]), Some("quiet = \"yes\""), Format::Map).is_err());
    }
}
