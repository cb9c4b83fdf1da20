//! Numeric literal grammar.
//!
//! ```text
//! number   = decimal | "0x" hex | "0b" bin
//! decimal  = digits [ "." [ digits ] ] [ exponent ]
//!          | "." digits [ exponent ]
//! exponent = ( "e" | "E" ) [ "+" | "-" ] digits
//! digits   = digit { digit | "_" }
//! ```

use crate::{Feed, LiteralError};

/// Classification of a complete numeric literal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NumberKind {
    Int,
    HexInt,
    BinInt,
    Float,
}

/// Semantic value of a numeric literal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum NumberValue {
    Int(i64),
    Float(f64),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Radix {
    Hex,
    Bin,
}

impl Radix {
    fn accepts(self, c: char) -> bool {
        match self {
            Radix::Hex => c.is_ascii_hexdigit(),
            Radix::Bin => matches!(c, '0' | '1'),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Start,
    Zero,
    Int,
    /// After `0x` / `0b`, before the first digit.
    Prefix(Radix),
    Radix(Radix),
    LeadingDot,
    Fraction,
    Exponent,
    ExponentSign,
    ExponentDigits,
}

/// Character-fed recognizer for numeric literals.
///
/// Feed characters until [`Feed::Stop`]; then [`kind`](Self::kind) says
/// whether the consumed prefix forms a complete literal.
#[derive(Clone, Debug)]
pub struct NumberScanner {
    state: State,
}

impl Default for NumberScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl NumberScanner {
    pub fn new() -> Self {
        NumberScanner { state: State::Start }
    }

    /// Can a numeric literal begin with `c`?
    pub fn can_start(c: char) -> bool {
        c.is_ascii_digit() || c == '.'
    }

    pub fn feed(&mut self, c: char) -> Feed {
        let next = match (self.state, c) {
            (State::Start, '0') => State::Zero,
            (State::Start, '1'..='9') => State::Int,
            (State::Start, '.') => State::LeadingDot,

            (State::Zero, 'x' | 'X') => State::Prefix(Radix::Hex),
            (State::Zero, 'b' | 'B') => State::Prefix(Radix::Bin),
            (State::Zero | State::Int, '0'..='9' | '_') => State::Int,
            (State::Zero | State::Int, '.') => State::Fraction,
            (State::Zero | State::Int | State::Fraction, 'e' | 'E') => State::Exponent,

            (State::Prefix(radix), '_') => State::Prefix(radix),
            (State::Prefix(radix) | State::Radix(radix), c) if radix.accepts(c) || c == '_' => {
                State::Radix(radix)
            }

            (State::LeadingDot, '0'..='9') => State::Fraction,
            (State::Fraction, '0'..='9' | '_') => State::Fraction,

            (State::Exponent, '+' | '-') => State::ExponentSign,
            (State::Exponent | State::ExponentSign, '0'..='9') => State::ExponentDigits,
            (State::ExponentDigits, '0'..='9' | '_') => State::ExponentDigits,

            _ => return Feed::Stop,
        };
        self.state = next;
        Feed::Accept
    }

    /// Kind of the literal consumed so far, or `None` when it is incomplete
    /// (`0x`, `.`, `1e`, ...).
    pub fn kind(&self) -> Option<NumberKind> {
        match self.state {
            State::Zero | State::Int => Some(NumberKind::Int),
            State::Radix(Radix::Hex) => Some(NumberKind::HexInt),
            State::Radix(Radix::Bin) => Some(NumberKind::BinInt),
            State::Fraction | State::ExponentDigits => Some(NumberKind::Float),
            _ => None,
        }
    }
}

/// Validate `text` as one complete numeric literal and compute its value.
pub fn parse_number(text: &str) -> Result<NumberValue, LiteralError> {
    let malformed = || LiteralError::MalformedNumber(text.to_owned());
    let mut scanner = NumberScanner::new();
    for c in text.chars() {
        if scanner.feed(c) != Feed::Accept {
            return Err(malformed());
        }
    }
    let kind = scanner.kind().ok_or_else(malformed)?;
    let out_of_range = || LiteralError::NumberOutOfRange(text.to_owned());
    match kind {
        NumberKind::Int => int_value(text, 10).ok_or_else(out_of_range),
        NumberKind::HexInt => int_value(&text[2..], 16).ok_or_else(out_of_range),
        NumberKind::BinInt => int_value(&text[2..], 2).ok_or_else(out_of_range),
        NumberKind::Float => parse_float_skip_underscores(text)
            .map(NumberValue::Float)
            .ok_or_else(malformed),
    }
}

fn int_value(digits: &str, radix: u32) -> Option<NumberValue> {
    let value = parse_int_skip_underscores(digits, radix)?;
    i64::try_from(value).ok().map(NumberValue::Int)
}

/// Parse integer skipping underscores without allocation.
#[inline]
fn parse_int_skip_underscores(s: &str, radix: u32) -> Option<u64> {
    let mut result: u64 = 0;
    for c in s.chars() {
        if c == '_' {
            continue;
        }
        let digit = c.to_digit(radix)?;
        result = result.checked_mul(u64::from(radix))?;
        result = result.checked_add(u64::from(digit))?;
    }
    Some(result)
}

/// Parse float - only allocate if underscores present.
#[inline]
fn parse_float_skip_underscores(s: &str) -> Option<f64> {
    if s.contains('_') {
        s.replace('_', "").parse().ok()
    } else {
        s.parse().ok()
    }
}
