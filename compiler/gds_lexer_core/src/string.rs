//! String literal grammar.
//!
//! A literal is an optional prefix (`&` StringName, `^` NodePath), an opening
//! quote run (one or three `"` / `'`), a body with backslash escapes and the
//! matching closing run. Only triple-quoted literals may span lines.

use crate::{Feed, LiteralError};

/// Quote style of a string literal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StringStyle {
    Double,
    Single,
    TripleDouble,
    TripleSingle,
}

impl StringStyle {
    pub fn quote(self) -> char {
        match self {
            StringStyle::Double | StringStyle::TripleDouble => '"',
            StringStyle::Single | StringStyle::TripleSingle => '\'',
        }
    }

    pub fn is_triple(self) -> bool {
        matches!(self, StringStyle::TripleDouble | StringStyle::TripleSingle)
    }

    fn delimiter_len(self) -> usize {
        if self.is_triple() {
            3
        } else {
            1
        }
    }

    fn from_parts(quote: char, triple: bool) -> Self {
        match (quote, triple) {
            ('"', false) => StringStyle::Double,
            ('"', true) => StringStyle::TripleDouble,
            (_, false) => StringStyle::Single,
            (_, true) => StringStyle::TripleSingle,
        }
    }
}

/// Literal prefix selecting the runtime string flavor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum StringPrefix {
    #[default]
    None,
    /// `&"name"`
    StringName,
    /// `^"path"`
    NodePath,
}

impl StringPrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            StringPrefix::None => "",
            StringPrefix::StringName => "&",
            StringPrefix::NodePath => "^",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Start,
    AfterPrefix,
    /// Number of identical quotes seen in the opening run.
    Opening(u8),
    Body,
    Escape,
    /// Number of quotes seen in a potential triple closing run.
    Closing(u8),
    Done,
}

/// Character-fed recognizer for string literals.
#[derive(Clone, Debug)]
pub struct StringScanner {
    state: State,
    prefix: StringPrefix,
    quote: char,
    triple: bool,
}

impl Default for StringScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl StringScanner {
    pub fn new() -> Self {
        StringScanner {
            state: State::Start,
            prefix: StringPrefix::None,
            quote: '"',
            triple: false,
        }
    }

    /// Can a string literal begin with `c`?
    pub fn can_start(c: char) -> bool {
        matches!(c, '"' | '\'' | '&' | '^')
    }

    pub fn feed(&mut self, c: char) -> Feed {
        match self.state {
            State::Start => match c {
                '&' => self.prefixed(StringPrefix::StringName),
                '^' => self.prefixed(StringPrefix::NodePath),
                '"' | '\'' => self.open(c),
                _ => Feed::Stop,
            },
            State::AfterPrefix => match c {
                '"' | '\'' => self.open(c),
                _ => Feed::Stop,
            },
            State::Opening(1) if c == self.quote => {
                self.state = State::Opening(2);
                Feed::Accept
            }
            State::Opening(1) => self.body(c),
            State::Opening(_) if c == self.quote => {
                self.triple = true;
                self.state = State::Body;
                Feed::Accept
            }
            // `""` followed by anything else is a complete empty string.
            State::Opening(_) => {
                self.state = State::Done;
                Feed::Stop
            }
            State::Body => self.body(c),
            State::Escape => {
                self.state = State::Body;
                Feed::Accept
            }
            State::Closing(n) if c == self.quote => {
                if n + 1 == 3 {
                    self.state = State::Done;
                    Feed::Done
                } else {
                    self.state = State::Closing(n + 1);
                    Feed::Accept
                }
            }
            State::Closing(_) => self.body(c),
            State::Done => Feed::Stop,
        }
    }

    fn prefixed(&mut self, prefix: StringPrefix) -> Feed {
        self.prefix = prefix;
        self.state = State::AfterPrefix;
        Feed::Accept
    }

    fn open(&mut self, quote: char) -> Feed {
        self.quote = quote;
        self.state = State::Opening(1);
        Feed::Accept
    }

    fn body(&mut self, c: char) -> Feed {
        self.state = State::Body;
        match c {
            '\\' => {
                self.state = State::Escape;
                Feed::Accept
            }
            c if c == self.quote && self.triple => {
                self.state = State::Closing(1);
                Feed::Accept
            }
            c if c == self.quote => {
                self.state = State::Done;
                Feed::Done
            }
            '\n' | '\r' if !self.triple => Feed::Stop,
            _ => Feed::Accept,
        }
    }

    /// Has the closing quote run been consumed?
    ///
    /// Two quotes already form a complete empty string; a third one would
    /// reopen it as a triple-quoted literal.
    pub fn is_terminated(&self) -> bool {
        matches!(self.state, State::Done | State::Opening(2))
    }

    /// Does the literal continue across a line break?
    pub fn is_multiline(&self) -> bool {
        self.triple
    }

    pub fn style(&self) -> StringStyle {
        StringStyle::from_parts(self.quote, self.triple)
    }

    pub fn prefix(&self) -> StringPrefix {
        self.prefix
    }
}

/// Validate `text` as one complete string literal and return its value.
pub fn string_value(text: &str) -> Result<String, LiteralError> {
    let mut scanner = StringScanner::new();
    let mut consumed = 0;
    for c in text.chars() {
        match scanner.feed(c) {
            Feed::Accept | Feed::Done => consumed += c.len_utf8(),
            Feed::Stop => break,
        }
    }
    if !scanner.is_terminated() {
        return Err(LiteralError::UnterminatedString(text.to_owned()));
    }
    if consumed != text.len() {
        return Err(LiteralError::MalformedString(text.to_owned()));
    }
    let prefix_len = scanner.prefix().as_str().len();
    let delimiter = scanner.style().delimiter_len();
    let body = &text[prefix_len + delimiter..text.len() - delimiter];
    unescape(body)
}

/// Resolve backslash escapes in a literal body.
///
/// A backslash before a line break joins the lines.
pub fn unescape(body: &str) -> Result<String, LiteralError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            return Err(LiteralError::InvalidEscape(' '));
        };
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'v' => out.push('\u{0b}'),
            '"' | '\'' | '\\' => out.push(escaped),
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            'u' | 'U' => {
                let width = if escaped == 'u' { 4 } else { 6 };
                let digits: String = chars.by_ref().take(width).collect();
                let decoded = (digits.len() == width)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or_else(|| LiteralError::InvalidUnicodeEscape(format!("\\{escaped}{digits}")))?;
                out.push(decoded);
            }
            other => return Err(LiteralError::InvalidEscape(other)),
        }
    }
    Ok(out)
}

/// Render `value` as literal text of the given style and prefix.
pub fn quote_string(value: &str, style: StringStyle, prefix: StringPrefix) -> String {
    let quote = style.quote();
    let delimiter: String = std::iter::repeat(quote).take(style.delimiter_len()).collect();
    let mut out = String::with_capacity(value.len() + 8);
    out.push_str(prefix.as_str());
    out.push_str(&delimiter);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            '\n' if !style.is_triple() => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push_str(&delimiter);
    out
}

#[cfg(test)]
mod tests;
