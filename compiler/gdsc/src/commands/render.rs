//! Print a file back from its tree.

use gds_parse::{ParseResult, Parser};

use super::{fail, read_file, CliOptions};

pub fn render_source(source: &str, options: &CliOptions) -> ParseResult<String> {
    let tree = Parser::new(options.config).parse_file(source)?;
    Ok(tree.render(options.render_mode()))
}

pub fn render_file(path: &str, options: &CliOptions) {
    let content = read_file(path);
    match render_source(&content, options) {
        Ok(text) => print!("{text}"),
        Err(e) => fail(path, &e),
    }
}
