/// A literal's text does not follow its grammar.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LiteralError {
    #[error("malformed number literal `{0}`")]
    MalformedNumber(String),
    #[error("number literal `{0}` is out of range")]
    NumberOutOfRange(String),
    #[error("unterminated string literal `{0}`")]
    UnterminatedString(String),
    #[error("malformed string literal `{0}`")]
    MalformedString(String),
    #[error("invalid escape sequence `\\{0}`")]
    InvalidEscape(char),
    #[error("invalid unicode escape `{0}`")]
    InvalidUnicodeEscape(String),
    #[error("`{0}` is not a valid identifier")]
    InvalidIdentifier(String),
}
