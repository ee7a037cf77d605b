//! Parsing options.

/// Options for parsing PDF documents.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// What to extract from the document
    pub extract_mode: ExtractMode,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (pages whose text cannot be extracted are kept
    /// without text).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set extract mode.
    pub fn with_extract_mode(mut self, mode: ExtractMode) -> Self {
        self.extract_mode = mode;
        self
    }

    /// Skip text extraction; only geometry, outline and metadata are read.
    pub fn structure_only(mut self) -> Self {
        self.extract_mode = ExtractMode::StructureOnly;
        self
    }
}

/// Error handling mode during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Skip invalid content and continue
    Lenient,
}

/// What content to extract from the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractMode {
    /// Text, links, annotations, outline and metadata
    #[default]
    Full,
    /// Page sizes, outline and metadata only
    StructureOnly,
}
