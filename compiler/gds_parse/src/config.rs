//! Parser configuration.

/// Settings shared by every parse and reparse.
///
/// # Examples
///
/// ```
/// use gds_parse::ParserConfig;
///
/// let config = ParserConfig::default()
///     .with_indentation_size(2)
///     .with_max_reading_stack(None);
/// assert_eq!(config.indentation_size, 2);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParserConfig {
    /// Spaces that make up one indentation unit.
    pub indentation_size: usize,
    /// Count groups of spaces as indentation units (tabs always count).
    pub spaces_as_indentation: bool,
    /// Chunk size used by [`Parser::parse_reader`](crate::Parser::parse_reader).
    pub read_buffer_size: usize,
    /// Maximum number of nested reading states. `None` disables the limit.
    pub max_reading_stack: Option<usize>,
    /// Maximum number of nested recursive frames. `None` disables the limit.
    pub max_trace_frames: Option<usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            indentation_size: 4,
            spaces_as_indentation: true,
            read_buffer_size: 4096,
            max_reading_stack: Some(64),
            max_trace_frames: Some(512),
        }
    }
}

impl ParserConfig {
    #[must_use]
    pub fn with_indentation_size(mut self, size: usize) -> Self {
        self.indentation_size = size;
        self
    }

    #[must_use]
    pub fn with_spaces_as_indentation(mut self, enabled: bool) -> Self {
        self.spaces_as_indentation = enabled;
        self
    }

    #[must_use]
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }

    #[must_use]
    pub fn with_max_reading_stack(mut self, max: Option<usize>) -> Self {
        self.max_reading_stack = max;
        self
    }

    #[must_use]
    pub fn with_max_trace_frames(mut self, max: Option<usize>) -> Self {
        self.max_trace_frames = max;
        self
    }
}
