use gds_ir::TokenError;
use gds_stack::DepthOverflow;

/// Why a parse produced no tree.
///
/// Malformed source text is never an error: it ends up in invalid leaves of
/// an otherwise complete tree.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    DepthOverflow(#[from] DepthOverflow),
    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),
    #[error("source is not valid UTF-8 at byte {offset}")]
    InvalidUtf8 { offset: usize },
    /// A grammar builder misused the tree API.
    #[error("internal tree construction error: {0}")]
    Tree(#[from] TokenError),
}

impl ParseError {
    /// The depth overflow, if that is what stopped the parse.
    pub fn depth_overflow(&self) -> Option<&DepthOverflow> {
        match self {
            ParseError::DepthOverflow(overflow) => Some(overflow),
            _ => None,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
