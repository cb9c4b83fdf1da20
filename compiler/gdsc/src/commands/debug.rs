//! Debug output: the syntax tree of a file.

use gds_parse::{ParseResult, Parser};

use super::{fail, read_file, CliOptions};

/// The tree dump of `source` parsed as a script.
pub fn dump_source(source: &str, options: &CliOptions) -> ParseResult<String> {
    let tree = Parser::new(options.config).parse_file(source)?;
    Ok(tree.dump())
}

/// Parse a file and print its tree.
pub fn parse_file(path: &str, options: &CliOptions) {
    let content = read_file(path);
    match dump_source(&content, options) {
        Ok(dump) => print!("{dump}"),
        Err(e) => fail(path, &e),
    }
}
