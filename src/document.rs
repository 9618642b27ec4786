// Document tree model
// A sequence of paragraphs holding plain text runs and inline links,
// stored in a handle-addressed arena. Markdown is only the storage
// format; the tree itself knows nothing about syntax.

use std::collections::HashMap;

use crate::error::{DocError, Result};
use crate::selection::Point;

/// Handle to a node in the document arena. Handles are never reused, so a
/// handle to a removed node is detectably dangling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Path of child indices from the document root down to a text run:
/// paragraph index, content index, and — for a run inside a link — a
/// trailing 0 for the link's single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address(pub Vec<usize>);

impl Address {
    pub fn new(indices: Vec<usize>) -> Self {
        Address(indices)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Paragraph(Paragraph),
    Link(LinkNode),
    Text(TextRun),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Paragraph {
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub(crate) struct LinkNode {
    pub target: String,
    pub text: NodeId,
    pub parent: NodeId,
}

#[derive(Debug, Clone)]
pub(crate) struct TextRun {
    pub text: String,
    pub parent: NodeId,
}

/// A text run is never zero-length: storing an empty string yields a
/// single-space placeholder so the run stays addressable.
fn non_empty(text: String) -> String {
    if text.is_empty() { " ".into() } else { text }
}

fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(i, _)| i)
}

/// The document: an ordered sequence of paragraphs over a node arena.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) nodes: HashMap<NodeId, Node>,
    pub(crate) paragraphs: Vec<NodeId>,
    next_id: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Document {
            nodes: HashMap::new(),
            paragraphs: Vec::new(),
            next_id: 1,
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| DocError::InvalidAddress(format!("dangling node handle {:?}", id)))
    }

    fn text_run(&self, id: NodeId) -> Result<&TextRun> {
        match self.node(id)? {
            Node::Text(run) => Ok(run),
            _ => Err(DocError::InvalidAddress(format!(
                "{:?} is not a text run",
                id
            ))),
        }
    }

    fn text_run_mut(&mut self, id: NodeId) -> Result<&mut TextRun> {
        match self.nodes.get_mut(&id) {
            Some(Node::Text(run)) => Ok(run),
            _ => Err(DocError::InvalidAddress(format!(
                "{:?} is not a text run",
                id
            ))),
        }
    }

    fn paragraph(&self, id: NodeId) -> Result<&Paragraph> {
        match self.node(id)? {
            Node::Paragraph(p) => Ok(p),
            _ => Err(DocError::InvalidAddress(format!(
                "{:?} is not a paragraph",
                id
            ))),
        }
    }

    fn link_node(&self, id: NodeId) -> Result<&LinkNode> {
        match self.node(id)? {
            Node::Link(l) => Ok(l),
            _ => Err(DocError::InvalidAddress(format!("{:?} is not a link", id))),
        }
    }

    // -- construction --------------------------------------------------

    /// Appends an empty paragraph at the end of the document.
    pub fn push_paragraph(&mut self) -> NodeId {
        let id = self.alloc(Node::Paragraph(Paragraph::default()));
        self.paragraphs.push(id);
        id
    }

    /// Appends a plain text run to a paragraph.
    pub fn push_text(&mut self, para: NodeId, text: &str) -> Result<NodeId> {
        let len = self.paragraph(para)?.children.len();
        self.insert_plain_run(para, len, text)
    }

    /// Appends a link (with its single text run) to a paragraph and
    /// returns the link's text run.
    pub fn push_link(&mut self, para: NodeId, text: &str, target: &str) -> Result<NodeId> {
        let len = self.paragraph(para)?.children.len();
        self.insert_link_run(para, len, text, target)
    }

    pub(crate) fn insert_plain_run(
        &mut self,
        para: NodeId,
        index: usize,
        text: &str,
    ) -> Result<NodeId> {
        self.paragraph(para)?;
        let run = self.alloc(Node::Text(TextRun {
            text: non_empty(text.to_string()),
            parent: para,
        }));
        if let Some(Node::Paragraph(p)) = self.nodes.get_mut(&para) {
            p.children.insert(index, run);
        }
        Ok(run)
    }

    pub(crate) fn insert_link_run(
        &mut self,
        para: NodeId,
        index: usize,
        text: &str,
        target: &str,
    ) -> Result<NodeId> {
        self.paragraph(para)?;
        let link = self.alloc(Node::Link(LinkNode {
            target: target.to_string(),
            text: NodeId(0), // patched right below
            parent: para,
        }));
        let run = self.alloc(Node::Text(TextRun {
            text: non_empty(text.to_string()),
            parent: link,
        }));
        if let Some(Node::Link(l)) = self.nodes.get_mut(&link) {
            l.text = run;
        }
        if let Some(Node::Paragraph(p)) = self.nodes.get_mut(&para) {
            p.children.insert(index, link);
        }
        Ok(run)
    }

    /// Lazily seeds a paragraph-less document with one paragraph holding
    /// one placeholder text run; returns the cursor point for it.
    pub fn seed_if_empty(&mut self) -> Option<Point> {
        if !self.paragraphs.is_empty() {
            return None;
        }
        let para = self.push_paragraph();
        let run = self.push_text(para, "").ok()?;
        Some(Point { run, offset: 0 })
    }

    // -- read access ---------------------------------------------------

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn paragraph_ids(&self) -> &[NodeId] {
        &self.paragraphs
    }

    pub fn children(&self, para: NodeId) -> Result<&[NodeId]> {
        Ok(&self.paragraph(para)?.children)
    }

    pub fn run_text(&self, run: NodeId) -> Result<&str> {
        Ok(&self.text_run(run)?.text)
    }

    /// Character length of a text run.
    pub fn run_len(&self, run: NodeId) -> Result<usize> {
        Ok(self.text_run(run)?.text.chars().count())
    }

    pub fn link_target(&self, link: NodeId) -> Result<&str> {
        Ok(&self.link_node(link)?.target)
    }

    /// The link a run belongs to, if its parent is one.
    pub fn link_of(&self, run: NodeId) -> Result<Option<NodeId>> {
        let parent = self.text_run(run)?.parent;
        Ok(match self.node(parent)? {
            Node::Link(_) => Some(parent),
            _ => None,
        })
    }

    /// The paragraph a run ultimately belongs to, looking through a link.
    pub fn containing_paragraph(&self, run: NodeId) -> Result<NodeId> {
        let parent = self.text_run(run)?.parent;
        match self.node(parent)? {
            Node::Paragraph(_) => Ok(parent),
            Node::Link(l) => Ok(l.parent),
            Node::Text(_) => Err(DocError::InvalidAddress(format!(
                "{:?} parented to a text run",
                run
            ))),
        }
    }

    pub fn same_paragraph(&self, a: NodeId, b: NodeId) -> Result<bool> {
        Ok(self.containing_paragraph(a)? == self.containing_paragraph(b)?)
    }

    /// First text run of a paragraph, descending into a leading link.
    pub fn first_text_of(&self, para: NodeId) -> Result<NodeId> {
        let first = *self
            .paragraph(para)?
            .children
            .first()
            .ok_or(DocError::EmptyParagraph)?;
        self.run_of_child(first)
    }

    /// Last text run of a paragraph, descending into a trailing link.
    pub fn last_text_of(&self, para: NodeId) -> Result<NodeId> {
        let last = *self
            .paragraph(para)?
            .children
            .last()
            .ok_or(DocError::EmptyParagraph)?;
        self.run_of_child(last)
    }

    fn run_of_child(&self, child: NodeId) -> Result<NodeId> {
        match self.node(child)? {
            Node::Text(_) => Ok(child),
            Node::Link(l) => Ok(l.text),
            Node::Paragraph(_) => Err(DocError::InvalidAddress(format!(
                "{:?} is a paragraph nested in a paragraph",
                child
            ))),
        }
    }

    // -- addressing ----------------------------------------------------

    /// Walks an address path down to a text run. Faults if any index is
    /// out of range or the path depth does not match the node found
    /// (links take exactly one further index, plain runs take none).
    pub fn resolve(&self, addr: &Address) -> Result<NodeId> {
        let path = &addr.0;
        let (Some(&pi), Some(&ci)) = (path.first(), path.get(1)) else {
            return Err(DocError::InvalidAddress(format!(
                "address too short: {:?}",
                path
            )));
        };
        let para = *self.paragraphs.get(pi).ok_or_else(|| {
            DocError::InvalidAddress(format!("paragraph index {} out of range", pi))
        })?;
        let child = *self
            .paragraph(para)?
            .children
            .get(ci)
            .ok_or_else(|| DocError::InvalidAddress(format!("content index {} out of range", ci)))?;
        match self.node(child)? {
            Node::Text(_) => {
                if path.len() != 2 {
                    return Err(DocError::InvalidAddress(format!(
                        "plain text run takes no further indices: {:?}",
                        path
                    )));
                }
                Ok(child)
            }
            Node::Link(l) => {
                if path.len() != 3 || path[2] != 0 {
                    return Err(DocError::InvalidAddress(format!(
                        "link takes exactly one further index of 0: {:?}",
                        path
                    )));
                }
                Ok(l.text)
            }
            Node::Paragraph(_) => Err(DocError::InvalidAddress(format!(
                "{:?} is a paragraph nested in a paragraph",
                child
            ))),
        }
    }

    /// Inverse of `resolve`: the address path of a text run.
    pub fn address_of(&self, run: NodeId) -> Result<Address> {
        let parent = self.text_run(run)?.parent;
        match self.node(parent)? {
            Node::Paragraph(_) => {
                let pi = self.paragraph_index(parent)?;
                let ci = self.child_position(parent, run)?;
                Ok(Address(vec![pi, ci]))
            }
            Node::Link(l) => {
                let pi = self.paragraph_index(l.parent)?;
                let ci = self.child_position(l.parent, parent)?;
                Ok(Address(vec![pi, ci, 0]))
            }
            Node::Text(_) => Err(DocError::InvalidAddress(format!(
                "{:?} parented to a text run",
                run
            ))),
        }
    }

    fn paragraph_index(&self, para: NodeId) -> Result<usize> {
        self.paragraphs
            .iter()
            .position(|&p| p == para)
            .ok_or_else(|| DocError::InvalidAddress(format!("{:?} not in document", para)))
    }

    pub(crate) fn child_position(&self, para: NodeId, child: NodeId) -> Result<usize> {
        self.paragraph(para)?
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or_else(|| {
                DocError::InvalidAddress(format!("{:?} not a child of {:?}", child, para))
            })
    }

    // -- adjacency -----------------------------------------------------

    /// All text runs in document order, crossing link and paragraph
    /// boundaries.
    pub(crate) fn runs_in_order(&self) -> Vec<NodeId> {
        let mut runs = Vec::new();
        for para in &self.paragraphs {
            let Some(Node::Paragraph(p)) = self.nodes.get(para) else {
                continue;
            };
            for child in &p.children {
                match self.nodes.get(child) {
                    Some(Node::Text(_)) => runs.push(*child),
                    Some(Node::Link(l)) => runs.push(l.text),
                    _ => {}
                }
            }
        }
        runs
    }

    /// The text run immediately before `run` in document order, or None
    /// at the document start.
    pub fn preceding_text(&self, run: NodeId) -> Result<Option<NodeId>> {
        let pos = self.run_order_position(run)?;
        Ok(if pos == 0 {
            None
        } else {
            Some(self.runs_in_order()[pos - 1])
        })
    }

    /// The text run immediately after `run` in document order, or None
    /// at the document end.
    pub fn following_text(&self, run: NodeId) -> Result<Option<NodeId>> {
        let runs = self.runs_in_order();
        let pos = self.run_order_position(run)?;
        Ok(runs.get(pos + 1).copied())
    }

    pub(crate) fn run_order_position(&self, run: NodeId) -> Result<usize> {
        self.text_run(run)?;
        self.runs_in_order()
            .iter()
            .position(|&r| r == run)
            .ok_or_else(|| {
                DocError::InvalidAddress(format!("{:?} not reachable from the root", run))
            })
    }

    // -- text mutation -------------------------------------------------

    pub fn insert_text_in_run(
        &mut self,
        run: NodeId,
        char_offset: usize,
        insert: &str,
    ) -> Result<()> {
        let len = self.run_len(run)?;
        if char_offset > len {
            return Err(DocError::RangeOutOfBounds {
                start: char_offset,
                end: char_offset,
                len,
            });
        }
        let at = byte_index(&self.text_run(run)?.text, char_offset);
        self.text_run_mut(run)?.text.insert_str(at, insert);
        Ok(())
    }

    /// Deletes the character range [start, end) of a run. A deletion that
    /// empties the run leaves the single-space placeholder.
    pub fn delete_run_range(&mut self, run: NodeId, start: usize, end: usize) -> Result<()> {
        let len = self.run_len(run)?;
        if start > end || end > len {
            return Err(DocError::RangeOutOfBounds { start, end, len });
        }
        let text = &self.text_run(run)?.text;
        let (a, b) = (byte_index(text, start), byte_index(text, end));
        let run = self.text_run_mut(run)?;
        run.text.drain(a..b);
        if run.text.is_empty() {
            run.text.push(' ');
        }
        Ok(())
    }

    pub fn set_run_text(&mut self, run: NodeId, text: &str) -> Result<()> {
        self.text_run_mut(run)?.text = non_empty(text.to_string());
        Ok(())
    }

    // -- structural surgery --------------------------------------------

    /// Removes a text run, cascading to its link (a link's run is never
    /// removed independently) and to its paragraph when that empties it.
    pub fn remove_run(&mut self, run: NodeId) -> Result<()> {
        let parent = self.text_run(run)?.parent;
        self.nodes.remove(&run);
        let link_parent = match self.nodes.get(&parent) {
            Some(Node::Link(l)) => Some(l.parent),
            _ => None,
        };
        match link_parent {
            Some(para) => {
                self.nodes.remove(&parent);
                self.detach_child(para, parent);
            }
            None => self.detach_child(parent, run),
        }
        Ok(())
    }

    /// Drops a child from a paragraph's list; a paragraph emptied by the
    /// removal is itself removed from the document.
    fn detach_child(&mut self, para: NodeId, child: NodeId) {
        let Some(Node::Paragraph(p)) = self.nodes.get_mut(&para) else {
            return;
        };
        p.children.retain(|&c| c != child);
        if p.children.is_empty() {
            self.nodes.remove(&para);
            self.paragraphs.retain(|&q| q != para);
        }
    }

    fn reparent(&mut self, child: NodeId, para: NodeId) {
        match self.nodes.get_mut(&child) {
            Some(Node::Text(run)) => run.parent = para,
            Some(Node::Link(l)) => l.parent = para,
            _ => {}
        }
    }

    /// Splits the paragraph containing `run` at `char_offset`. A new
    /// paragraph holding the content before the split point is inserted
    /// in front of the original; the original keeps the remainder, with
    /// `run` reused in place for its right part (live handles to it stay
    /// valid). Returns the point at the start of the remainder.
    pub fn split_paragraph(&mut self, run: NodeId, char_offset: usize) -> Result<Point> {
        let para = self.containing_paragraph(run)?;
        let len = self.run_len(run)?;
        if char_offset > len {
            return Err(DocError::RangeOutOfBounds {
                start: char_offset,
                end: char_offset,
                len,
            });
        }

        let prefix = self.alloc(Node::Paragraph(Paragraph::default()));
        let at = self.paragraph_index(para)?;
        self.paragraphs.insert(at, prefix);

        // Content before the split run moves over to the prefix paragraph.
        let parent = self.text_run(run)?.parent;
        let split_child = if parent == para { run } else { parent };
        let children = self.paragraph(para)?.children.clone();
        let split_at = children
            .iter()
            .position(|&c| c == split_child)
            .ok_or_else(|| {
                DocError::InvalidAddress(format!("{:?} not a child of {:?}", split_child, para))
            })?;
        for &child in &children[..split_at] {
            self.reparent(child, prefix);
        }
        if let Some(Node::Paragraph(p)) = self.nodes.get_mut(&prefix) {
            p.children = children[..split_at].to_vec();
        }
        if let Some(Node::Paragraph(p)) = self.nodes.get_mut(&para) {
            p.children = children[split_at..].to_vec();
        }

        // Partition the split run's own text.
        let text = self.run_text(run)?.to_string();
        let (left, right) = text.split_at(byte_index(&text, char_offset));
        if !left.is_empty() {
            let left = left.to_string();
            self.push_text(prefix, &left)?;
        }
        self.set_run_text(run, right)?;

        if self.paragraph(prefix)?.children.is_empty() {
            self.push_text(prefix, "")?;
        }

        let first = self.first_text_of(para)?;
        Ok(Point {
            run: first,
            offset: 0,
        })
    }

    /// Appends `src`'s content onto the end of `dst` and removes `src`
    /// from the document. Adjacent plain runs at the seam are fused; a
    /// trailing placeholder run in `dst` is replaced outright so it never
    /// leaks a stray space into the merged text. Returns the point at the
    /// old paragraph boundary, or None for a self-merge.
    pub fn combine_paragraphs(&mut self, dst: NodeId, src: NodeId) -> Result<Option<Point>> {
        if dst == src {
            return Ok(None);
        }

        let last_child = *self
            .paragraph(dst)?
            .children
            .last()
            .ok_or(DocError::EmptyParagraph)?;
        let mut moved = self.paragraph(src)?.children.clone();
        let first_src = *moved.first().ok_or(DocError::EmptyParagraph)?;

        let both_plain = matches!(self.node(last_child)?, Node::Text(_))
            && matches!(self.node(first_src)?, Node::Text(_));

        let boundary = if both_plain {
            let last_text = self.run_text(last_child)?.to_string();
            let first_text = self.run_text(first_src)?.to_string();
            let point = if last_text.trim().is_empty() {
                self.set_run_text(last_child, &first_text)?;
                Point {
                    run: last_child,
                    offset: 0,
                }
            } else {
                self.text_run_mut(last_child)?.text.push_str(&first_text);
                Point {
                    run: last_child,
                    offset: last_text.chars().count(),
                }
            };
            self.nodes.remove(&first_src);
            moved.remove(0);
            point
        } else {
            let run = self.last_text_of(dst)?;
            let offset = if self.run_text(run)?.trim().is_empty() {
                0
            } else {
                self.run_len(run)?
            };
            Point { run, offset }
        };

        for &child in &moved {
            self.reparent(child, dst);
        }
        if let Some(Node::Paragraph(p)) = self.nodes.get_mut(&dst) {
            p.children.extend(moved.iter().copied());
        }
        self.paragraphs.retain(|&q| q != src);
        self.nodes.remove(&src);
        Ok(Some(boundary))
    }

    /// Collapses every maximal group of adjacent plain text runs into the
    /// group's first run. If `hint` points into a discarded run it is
    /// rewritten onto the surviving run, shifted by the text accumulated
    /// ahead of it.
    pub fn merge_adjacent_texts(&mut self, para: NodeId, hint: Point) -> Result<Point> {
        let children = self.paragraph(para)?.children.clone();
        let mut hint = hint;
        let mut kept: Vec<NodeId> = Vec::new();
        let mut survivor: Option<NodeId> = None;
        for child in children {
            if matches!(self.node(child)?, Node::Text(_)) {
                match survivor {
                    None => {
                        survivor = Some(child);
                        kept.push(child);
                    }
                    Some(into) => {
                        let absorbed = self.run_text(child)?.to_string();
                        if hint.run == child {
                            hint = Point {
                                run: into,
                                offset: self.run_len(into)? + hint.offset,
                            };
                        }
                        self.text_run_mut(into)?.text.push_str(&absorbed);
                        self.nodes.remove(&child);
                    }
                }
            } else {
                survivor = None;
                kept.push(child);
            }
        }
        if let Some(Node::Paragraph(p)) = self.nodes.get_mut(&para) {
            p.children = kept;
        }
        Ok(hint)
    }

    // -- flattened views -----------------------------------------------

    pub fn paragraph_text(&self, para: NodeId) -> Result<String> {
        let mut out = String::new();
        for &child in &self.paragraph(para)?.children {
            match self.node(child)? {
                Node::Text(run) => out.push_str(&run.text),
                Node::Link(l) => out.push_str(self.run_text(l.text)?),
                Node::Paragraph(_) => {}
            }
        }
        Ok(out)
    }

    pub fn to_plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .filter_map(|&p| self.paragraph_text(p).ok())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_paragraph(text: &str) -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let para = doc.push_paragraph();
        let run = doc.push_text(para, text).unwrap();
        (doc, para, run)
    }

    #[test]
    fn empty_text_stores_placeholder() {
        let (doc, _, run) = one_paragraph("");
        assert_eq!(doc.run_text(run).unwrap(), " ");
    }

    #[test]
    fn resolve_roundtrips_with_address_of() {
        let mut doc = Document::new();
        let para = doc.push_paragraph();
        doc.push_text(para, "before ").unwrap();
        let linked = doc.push_link(para, "inside", "http://x").unwrap();
        let after = doc.push_text(para, " after").unwrap();

        let addr = doc.address_of(linked).unwrap();
        assert_eq!(addr, Address(vec![0, 1, 0]));
        assert_eq!(doc.resolve(&addr).unwrap(), linked);

        let addr = doc.address_of(after).unwrap();
        assert_eq!(addr, Address(vec![0, 2]));
        assert_eq!(doc.resolve(&addr).unwrap(), after);
    }

    #[test]
    fn resolve_rejects_wrong_depth() {
        let mut doc = Document::new();
        let para = doc.push_paragraph();
        doc.push_text(para, "plain").unwrap();
        doc.push_link(para, "l", "t").unwrap();

        // plain run with a trailing index
        assert!(matches!(
            doc.resolve(&Address(vec![0, 0, 0])),
            Err(DocError::InvalidAddress(_))
        ));
        // link without the trailing index
        assert!(matches!(
            doc.resolve(&Address(vec![0, 1])),
            Err(DocError::InvalidAddress(_))
        ));
        // out of range paragraph
        assert!(matches!(
            doc.resolve(&Address(vec![3, 0])),
            Err(DocError::InvalidAddress(_))
        ));
    }

    #[test]
    fn adjacency_crosses_links_and_paragraphs() {
        let mut doc = Document::new();
        let p1 = doc.push_paragraph();
        let a = doc.push_text(p1, "a").unwrap();
        let b = doc.push_link(p1, "b", "t").unwrap();
        let p2 = doc.push_paragraph();
        let c = doc.push_text(p2, "c").unwrap();

        assert_eq!(doc.preceding_text(a).unwrap(), None);
        assert_eq!(doc.following_text(a).unwrap(), Some(b));
        assert_eq!(doc.following_text(b).unwrap(), Some(c));
        assert_eq!(doc.preceding_text(c).unwrap(), Some(b));
        assert_eq!(doc.following_text(c).unwrap(), None);
    }

    #[test]
    fn delete_that_empties_a_run_leaves_placeholder() {
        let (mut doc, _, run) = one_paragraph("x");
        doc.delete_run_range(run, 0, 1).unwrap();
        assert_eq!(doc.run_text(run).unwrap(), " ");
    }

    #[test]
    fn delete_out_of_bounds_faults() {
        let (mut doc, _, run) = one_paragraph("abc");
        assert!(matches!(
            doc.delete_run_range(run, 1, 9),
            Err(DocError::RangeOutOfBounds { .. })
        ));
        assert!(matches!(
            doc.delete_run_range(run, 2, 1),
            Err(DocError::RangeOutOfBounds { .. })
        ));
    }

    #[test]
    fn removing_last_run_removes_paragraph() {
        let (mut doc, _, run) = one_paragraph("only");
        doc.remove_run(run).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn removing_link_text_removes_link() {
        let mut doc = Document::new();
        let para = doc.push_paragraph();
        doc.push_text(para, "a").unwrap();
        let linked = doc.push_link(para, "b", "t").unwrap();
        doc.remove_run(linked).unwrap();
        assert_eq!(doc.children(para).unwrap().len(), 1);
        assert_eq!(doc.paragraph_text(para).unwrap(), "a");
    }

    #[test]
    fn split_keeps_suffix_in_original_paragraph() {
        let (mut doc, para, run) = one_paragraph("abcd");
        let point = doc.split_paragraph(run, 2).unwrap();
        assert_eq!(doc.paragraph_count(), 2);
        assert_eq!(doc.paragraph_text(doc.paragraph_ids()[0]).unwrap(), "ab");
        assert_eq!(doc.paragraph_ids()[1], para);
        assert_eq!(doc.paragraph_text(para).unwrap(), "cd");
        // the original run is reused for the suffix
        assert_eq!(point.run, run);
        assert_eq!(point.offset, 0);
    }

    #[test]
    fn split_at_start_seeds_prefix_with_placeholder() {
        let (mut doc, _, run) = one_paragraph("cd");
        doc.split_paragraph(run, 0).unwrap();
        assert_eq!(doc.paragraph_text(doc.paragraph_ids()[0]).unwrap(), " ");
        assert_eq!(doc.run_text(run).unwrap(), "cd");
    }

    #[test]
    fn split_inside_link_moves_prefix_out_as_plain_text() {
        let mut doc = Document::new();
        let para = doc.push_paragraph();
        doc.push_text(para, "see ").unwrap();
        let linked = doc.push_link(para, "example", "http://x").unwrap();

        doc.split_paragraph(linked, 3).unwrap();
        let prefix = doc.paragraph_ids()[0];
        assert_eq!(doc.paragraph_text(prefix).unwrap(), "see exa");
        // the prefix part of the link text left the link
        assert_eq!(doc.link_of(doc.last_text_of(prefix).unwrap()).unwrap(), None);
        // the suffix stays linked, in the reused run
        assert_eq!(doc.run_text(linked).unwrap(), "mple");
        assert!(doc.link_of(linked).unwrap().is_some());
    }

    #[test]
    fn split_then_combine_restores_text() {
        let (mut doc, para, run) = one_paragraph("hello world");
        doc.split_paragraph(run, 5).unwrap();
        let prefix = doc.paragraph_ids()[0];
        doc.combine_paragraphs(prefix, para).unwrap();
        assert_eq!(doc.paragraph_count(), 1);
        assert_eq!(doc.paragraph_text(prefix).unwrap(), "hello world");
    }

    #[test]
    fn combine_returns_boundary_point() {
        let mut doc = Document::new();
        let p1 = doc.push_paragraph();
        let abc = doc.push_text(p1, "abc").unwrap();
        let p2 = doc.push_paragraph();
        doc.push_text(p2, "def").unwrap();

        let point = doc.combine_paragraphs(p1, p2).unwrap().unwrap();
        assert_eq!(point.run, abc);
        assert_eq!(point.offset, 3);
        assert_eq!(doc.paragraph_text(p1).unwrap(), "abcdef");
        assert_eq!(doc.paragraph_count(), 1);
    }

    #[test]
    fn combine_replaces_trailing_placeholder() {
        let mut doc = Document::new();
        let p1 = doc.push_paragraph();
        let blank = doc.push_text(p1, " ").unwrap();
        let p2 = doc.push_paragraph();
        doc.push_text(p2, "tail").unwrap();

        let point = doc.combine_paragraphs(p1, p2).unwrap().unwrap();
        assert_eq!(doc.paragraph_text(p1).unwrap(), "tail");
        assert_eq!(point.run, blank);
        assert_eq!(point.offset, 0);
    }

    #[test]
    fn combine_self_is_noop() {
        let (mut doc, para, _) = one_paragraph("x");
        assert_eq!(doc.combine_paragraphs(para, para).unwrap(), None);
        assert_eq!(doc.paragraph_count(), 1);
    }

    #[test]
    fn merge_adjacent_texts_rewrites_hint() {
        let mut doc = Document::new();
        let para = doc.push_paragraph();
        let a = doc.push_text(para, "ab").unwrap();
        let b = doc.push_text(para, "cd").unwrap();
        doc.push_link(para, "x", "t").unwrap();
        let c = doc.push_text(para, "ef").unwrap();

        let hint = doc
            .merge_adjacent_texts(para, Point { run: b, offset: 1 })
            .unwrap();
        assert_eq!(hint.run, a);
        assert_eq!(hint.offset, 3);
        assert_eq!(doc.run_text(a).unwrap(), "abcd");
        assert_eq!(doc.children(para).unwrap().len(), 3);
        assert_eq!(doc.run_text(c).unwrap(), "ef");
    }

    #[test]
    fn seed_if_empty_synthesizes_one_paragraph() {
        let mut doc = Document::new();
        let point = doc.seed_if_empty().unwrap();
        assert_eq!(doc.paragraph_count(), 1);
        assert_eq!(doc.run_text(point.run).unwrap(), " ");
        assert_eq!(point.offset, 0);
        assert!(doc.seed_if_empty().is_none());
    }
}
