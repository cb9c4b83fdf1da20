//! Command handlers for the `gdsc` CLI.
//!
//! Each submodule implements one command. Shared option parsing and file
//! reading live here in the module root.

mod check;
mod debug;
mod render;
mod reparse;

pub use check::{check_file, check_source, Problem};
pub use debug::{dump_source, parse_file};
pub use render::{render_file, render_source};
pub use reparse::{reparse_files, reparse_source, single_edit, ReparseReport};

use gds_parse::{ParseError, ParserConfig, RenderMode};

/// Options shared by every command.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub config: ParserConfig,
    /// Render without carriage returns.
    pub canonical: bool,
}

impl CliOptions {
    pub fn render_mode(&self) -> RenderMode {
        if self.canonical {
            RenderMode::Canonical
        } else {
            RenderMode::Literal
        }
    }
}

/// Split `args` into options and positional arguments.
///
/// # Examples
///
/// ```
/// let args: Vec<String> = ["a.gd", "--indent-size=2", "--max-depth=none"]
///     .iter()
///     .map(ToString::to_string)
///     .collect();
/// let (options, paths) = gdsc::commands::parse_options(&args).unwrap();
/// assert_eq!(options.config.indentation_size, 2);
/// assert_eq!(options.config.max_reading_stack, None);
/// assert_eq!(paths, vec!["a.gd".to_string()]);
/// ```
pub fn parse_options(args: &[String]) -> Result<(CliOptions, Vec<String>), String> {
    let mut options = CliOptions::default();
    let mut positional = Vec::new();
    for arg in args {
        if let Some(size) = arg.strip_prefix("--indent-size=") {
            let size = parse_count(arg, size)?;
            options.config = options.config.with_indentation_size(size);
        } else if arg == "--no-space-indent" {
            options.config = options.config.with_spaces_as_indentation(false);
        } else if let Some(max) = arg.strip_prefix("--max-depth=") {
            options.config = options.config.with_max_reading_stack(parse_limit(arg, max)?);
        } else if let Some(max) = arg.strip_prefix("--max-frames=") {
            options.config = options.config.with_max_trace_frames(parse_limit(arg, max)?);
        } else if let Some(size) = arg.strip_prefix("--buffer-size=") {
            let size = parse_count(arg, size)?;
            options.config = options.config.with_read_buffer_size(size);
        } else if arg == "--canonical" {
            options.canonical = true;
        } else if arg.starts_with("--") {
            return Err(format!("unknown option '{arg}'"));
        } else {
            positional.push(arg.clone());
        }
    }
    Ok((options, positional))
}

fn parse_count(arg: &str, value: &str) -> Result<usize, String> {
    value
        .parse()
        .map_err(|_| format!("invalid number in '{arg}'"))
}

/// `none` lifts the limit.
fn parse_limit(arg: &str, value: &str) -> Result<Option<usize>, String> {
    if value.eq_ignore_ascii_case("none") {
        Ok(None)
    } else {
        parse_count(arg, value).map(Some)
    }
}

pub(super) fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                std::io::ErrorKind::InvalidData => {
                    format!("'{path}' contains invalid UTF-8 data")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("{msg}");
            std::process::exit(1);
        }
    }
}

/// Report a parse that produced no tree and exit.
pub(super) fn fail(path: &str, error: &ParseError) -> ! {
    eprintln!("error: {path}: {error}");
    if let Some(overflow) = error.depth_overflow() {
        eprintln!("note: raise the limit with --max-depth or --max-frames (currently {})", overflow.max);
    }
    std::process::exit(2);
}
