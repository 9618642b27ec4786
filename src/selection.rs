// Selection mapping
// Translates the host surface's flat notion of a selection (leaf address
// plus character offset) into model points, and derives the transient
// linkable / linked facts from it. Nothing here is authoritative state:
// everything is recomputed from the live document on each host event.

use crate::document::{Address, Document, NodeId};
use crate::error::{DocError, Result};

/// A cursor location: a text run plus a character offset into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub run: NodeId,
    pub offset: usize,
}

/// The host surface's selection: two (address, offset) leaf positions.
/// Start and end are as reported; document order is established when the
/// selection is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSelection {
    pub start: (Address, usize),
    pub end: (Address, usize),
}

impl HostSelection {
    pub fn new(start: (Address, usize), end: (Address, usize)) -> Self {
        HostSelection { start, end }
    }

    /// A collapsed cursor at a single position.
    pub fn collapsed(addr: Address, offset: usize) -> Self {
        HostSelection {
            start: (addr.clone(), offset),
            end: (addr, offset),
        }
    }
}

/// A resolved selection: two ordered points plus the whole text runs
/// strictly between them (populated only when the runs differ).
#[derive(Debug, Clone)]
pub struct Selection {
    pub start: Point,
    pub end: Point,
    pub between: Vec<NodeId>,
}

impl Selection {
    /// Resolves a host selection against the document, normalizing the
    /// two endpoints into document order.
    pub fn from_host(doc: &Document, host: &HostSelection) -> Result<Selection> {
        let a = resolve_endpoint(doc, &host.start)?;
        let b = resolve_endpoint(doc, &host.end)?;

        let (start, end) = if points_ordered(doc, a, b)? {
            (a, b)
        } else {
            (b, a)
        };

        let between = if start.run == end.run {
            Vec::new()
        } else {
            let runs = doc.runs_in_order();
            let from = doc.run_order_position(start.run)?;
            let to = doc.run_order_position(end.run)?;
            runs[from + 1..to].to_vec()
        };

        Ok(Selection {
            start,
            end,
            between,
        })
    }

    pub fn is_range(&self) -> bool {
        self.start.run != self.end.run || self.start.offset != self.end.offset
    }
}

fn resolve_endpoint(doc: &Document, endpoint: &(Address, usize)) -> Result<Point> {
    let run = doc.resolve(&endpoint.0)?;
    let len = doc.run_len(run)?;
    if endpoint.1 > len {
        return Err(DocError::InvalidAddress(format!(
            "offset {} beyond run length {}",
            endpoint.1, len
        )));
    }
    Ok(Point {
        run,
        offset: endpoint.1,
    })
}

fn points_ordered(doc: &Document, a: Point, b: Point) -> Result<bool> {
    if a.run == b.run {
        return Ok(a.offset <= b.offset);
    }
    Ok(doc.run_order_position(a.run)? < doc.run_order_position(b.run)?)
}

/// A selection eligible to become a link: both endpoints share a run that
/// is not already inside one. Carries the candidate substring bounds
/// (explicit range, or the word under a collapsed cursor) and the cursor
/// offset to restore after linking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkableSelection {
    pub run: NodeId,
    pub start: usize,
    pub end: usize,
    pub cursor: usize,
}

/// A selection sitting inside an existing link's text; carries the link
/// and the cursor offset to restore after unlinking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkedSelection {
    pub link: NodeId,
    pub run: NodeId,
    pub offset: usize,
}

/// Derives the linkable / linked facts for a selection. The two are
/// mutually exclusive; both are None when the endpoints span runs or no
/// candidate word surrounds a collapsed cursor.
pub fn classify(
    doc: &Document,
    sel: &Selection,
) -> Result<(Option<LinkableSelection>, Option<LinkedSelection>)> {
    if sel.start.run != sel.end.run {
        return Ok((None, None));
    }
    let run = sel.start.run;

    if let Some(link) = doc.link_of(run)? {
        return Ok((
            None,
            Some(LinkedSelection {
                link,
                run,
                offset: sel.end.offset,
            }),
        ));
    }

    let (start, end) = if sel.is_range() {
        (sel.start.offset, sel.end.offset)
    } else {
        match word_bounds(doc.run_text(run)?, sel.start.offset) {
            Some(bounds) => bounds,
            None => return Ok((None, None)),
        }
    };

    Ok((
        Some(LinkableSelection {
            run,
            start,
            end,
            cursor: sel.end.offset,
        }),
        None,
    ))
}

/// Bounds (in character offsets) of the maximal non-whitespace run
/// containing `offset`, or None when the cursor only touches whitespace.
pub fn word_bounds(text: &str, offset: usize) -> Option<(usize, usize)> {
    let chars: Vec<char> = text.chars().collect();
    let offset = offset.min(chars.len());

    let mut start = offset;
    while start > 0 && !chars[start - 1].is_whitespace() {
        start -= 1;
    }
    let mut end = offset;
    while end < chars.len() && !chars[end].is_whitespace() {
        end += 1;
    }

    if start == end { None } else { Some((start, end)) }
}

/// Supplies the host surface's current selection. Read fresh at the start
/// of every operation; never cached across operations.
pub trait SelectionProvider {
    fn host_selection(&self, doc: &Document) -> HostSelection;
}

/// Receives caret placement directives. Fire-and-forget: the core does
/// not query the caret back.
pub trait CaretSink {
    fn place_caret(&mut self, doc: &Document, caret: Point);
}
