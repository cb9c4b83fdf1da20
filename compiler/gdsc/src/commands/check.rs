//! Report text the parser could not place.

use std::fmt;

use gds_parse::{ParseResult, Parser, Position, RenderMode};

use super::{fail, read_file, CliOptions};

/// One run of invalid text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Problem {
    pub start: Position,
    pub text: String,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Editors expect 1-based lines and columns.
        write!(
            f,
            "{}:{}: unexpected {:?}",
            self.start.line + 1,
            self.start.column + 1,
            self.text
        )
    }
}

/// Every invalid leaf of `source`, in source order.
pub fn check_source(source: &str, options: &CliOptions) -> ParseResult<Vec<Problem>> {
    let tree = Parser::new(options.config).parse_file(source)?;
    Ok(tree
        .invalid_tokens()
        .into_iter()
        .map(|id| Problem {
            start: tree.arena().start(id),
            text: tree.render_token(id, RenderMode::Literal),
        })
        .collect())
}

/// Print problems for each file. Exits with status 1 when any were found.
pub fn check_file(paths: &[String], options: &CliOptions) {
    let mut found = 0usize;
    for path in paths {
        let content = read_file(path);
        let problems = match check_source(&content, options) {
            Ok(problems) => problems,
            Err(e) => fail(path, &e),
        };
        for problem in &problems {
            println!("{path}:{problem}");
        }
        found += problems.len();
    }
    if found > 0 {
        eprintln!("{found} problem(s) found");
        std::process::exit(1);
    }
}
