use thiserror::Error;

/// Faults surfaced by document lookups, editing operations, and the
/// markdown codec.
#[derive(Debug, Error)]
pub enum DocError {
    /// A host address or node handle did not resolve to a live node of
    /// the expected kind.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// `link` was invoked without a current linkable selection.
    #[error("no linkable selection")]
    NoLinkableSelection,

    /// `unlink` was invoked without a current linked selection.
    #[error("no linked selection")]
    NoLinkedSelection,

    /// The input used markdown constructs outside the supported subset.
    #[error("malformed markdown: {0}")]
    MalformedMarkdown(String),

    /// A character range fell outside the run it was applied to.
    #[error("range {start}..{end} out of bounds for run of length {len}")]
    RangeOutOfBounds {
        start: usize,
        end: usize,
        len: usize,
    },

    /// A paragraph was observed with no content runs.
    #[error("paragraph has no content")]
    EmptyParagraph,
}

pub type Result<T> = std::result::Result<T, DocError>;
