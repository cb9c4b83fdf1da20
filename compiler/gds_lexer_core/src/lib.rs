//! Character-level literal grammars for GDScript.
//!
//! Every scanner here is *fed* one character at a time and answers with a
//! [`Feed`] verdict, which lets the parser's reading automaton drive them
//! without lookahead. The same scanners back the validating functions
//! ([`parse_number`], [`string_value`], [`is_identifier`]) used when tokens
//! are built directly through the tree API.
//!
//! # Key Types
//!
//! - [`NumberScanner`]: decimal, hex (`0x`), binary (`0b`), `_` separators,
//!   fractions (including `.5` and `5.`) and exponents
//! - [`StringScanner`]: `'…'`, `"…"`, `'''…'''`, `"""…"""` with optional
//!   `&` (StringName) and `^` (NodePath) prefixes
//! - [`IndentLevel`]: indentation measurement in tab / N-space units

mod chars;
mod error;
mod indent;
mod number;
mod string;

pub use chars::{is_ident_continue, is_ident_start, is_identifier, is_inline_space};
pub use error::LiteralError;
pub use indent::{measure_indentation, IndentLevel};
pub use number::{parse_number, NumberKind, NumberScanner, NumberValue};
pub use string::{quote_string, string_value, unescape, StringPrefix, StringScanner, StringStyle};

/// Verdict of a character-fed scanner.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Feed {
    /// The character was consumed; the literal may continue.
    Accept,
    /// The character was consumed and closed the literal.
    Done,
    /// The character is not part of the literal and was not consumed.
    Stop,
}
