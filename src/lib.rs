// richmark: a rich-text editing core for markdown-backed documents.
//
// The document is a tree of paragraphs holding plain text runs and
// inline links, edited at character granularity. A mapping layer
// translates the host surface's flat selection (leaf addresses plus
// character offsets) into model points and back; a strict codec turns
// the tree into a CommonMark-subset markdown string and back without
// loss. Rendering, key classification, and the surrounding application
// are the host's business, reached only through the small traits in
// `selection`.

pub mod document;
pub mod editor;
pub mod error;
pub mod markdown;
pub mod selection;

pub use document::{Address, Document, NodeId};
pub use editor::{Command, Editor};
pub use error::{DocError, Result};
pub use markdown::{from_markdown, to_markdown};
pub use selection::{
    CaretSink, HostSelection, LinkableSelection, LinkedSelection, Point, Selection,
    SelectionProvider, word_bounds,
};
