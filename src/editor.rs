// Editing operations on a document
// Every operation resolves the host selection fresh, mutates the tree,
// and yields the caret point for the editing surface. The derived
// linkable / linked facts live here and are recomputed per host event.

use tracing::debug;

use crate::document::Document;
use crate::error::{DocError, Result};
use crate::markdown;
use crate::selection::{
    CaretSink, HostSelection, LinkableSelection, LinkedSelection, Point, Selection,
    SelectionProvider, classify,
};

/// The logical editing commands the host can issue. Classification of raw
/// key events into commands is the host's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    InsertChar(char),
    InsertParagraph,
    RemoveNextChar,
    RemovePreviousChar,
    Link(String),
    Unlink,
    // Accepted but not yet implemented; see the stub methods below.
    RemoveToStartOfLine,
    RemoveToEndOfLine,
    RemovePreviousWord,
    RemoveNextWord,
    Undo,
    Redo,
    Copy,
    Cut,
    Paste,
}

/// The editor: owns the document and the transient selection facts.
#[derive(Debug, Default)]
pub struct Editor {
    doc: Document,
    linkable: Option<LinkableSelection>,
    linked: Option<LinkedSelection>,
}

impl Editor {
    pub fn new() -> Self {
        Editor {
            doc: Document::new(),
            linkable: None,
            linked: None,
        }
    }

    pub fn with_document(doc: Document) -> Self {
        Editor {
            doc,
            linkable: None,
            linked: None,
        }
    }

    pub fn from_markdown(input: &str) -> Result<Self> {
        Ok(Self::with_document(markdown::from_markdown(input)?))
    }

    pub fn to_markdown(&self) -> String {
        markdown::to_markdown(&self.doc)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    // -- selection facts -----------------------------------------------

    /// Recomputes the derived selection facts for a new host selection.
    pub fn selection_changed(&mut self, host: &HostSelection) -> Result<()> {
        self.doc.seed_if_empty();
        let sel = Selection::from_host(&self.doc, host)?;
        let (linkable, linked) = classify(&self.doc, &sel)?;
        self.linkable = linkable;
        self.linked = linked;
        Ok(())
    }

    pub fn focus_lost(&mut self) {
        self.invalidate_facts();
    }

    pub fn linkable_selection(&self) -> Option<&LinkableSelection> {
        self.linkable.as_ref()
    }

    pub fn linked_selection(&self) -> Option<&LinkedSelection> {
        self.linked.as_ref()
    }

    fn invalidate_facts(&mut self) {
        self.linkable = None;
        self.linked = None;
    }

    // -- dispatch ------------------------------------------------------

    /// Runs one command against the current host selection, delivering
    /// the resulting caret to the sink. Stub commands mutate nothing and
    /// place no caret.
    pub fn apply(
        &mut self,
        command: &Command,
        provider: &dyn SelectionProvider,
        sink: &mut dyn CaretSink,
    ) -> Result<()> {
        let caret = match command {
            Command::InsertChar(ch) => {
                let host = provider.host_selection(&self.doc);
                Some(self.insert_char(&host, *ch)?)
            }
            Command::InsertParagraph => {
                let host = provider.host_selection(&self.doc);
                Some(self.insert_paragraph(&host)?)
            }
            Command::RemoveNextChar => {
                let host = provider.host_selection(&self.doc);
                Some(self.remove_next_char(&host)?)
            }
            Command::RemovePreviousChar => {
                let host = provider.host_selection(&self.doc);
                Some(self.remove_previous_char(&host)?)
            }
            Command::Link(target) => Some(self.link(target)?),
            Command::Unlink => Some(self.unlink()?),
            Command::RemoveToStartOfLine => {
                self.remove_to_start_of_line();
                None
            }
            Command::RemoveToEndOfLine => {
                self.remove_to_end_of_line();
                None
            }
            Command::RemovePreviousWord => {
                self.remove_previous_word();
                None
            }
            Command::RemoveNextWord => {
                self.remove_next_word();
                None
            }
            Command::Undo => {
                self.undo();
                None
            }
            Command::Redo => {
                self.redo();
                None
            }
            Command::Copy => {
                self.copy();
                None
            }
            Command::Cut => {
                self.cut();
                None
            }
            Command::Paste => {
                self.paste();
                None
            }
        };
        if let Some(caret) = caret {
            sink.place_caret(&self.doc, caret);
        }
        Ok(())
    }

    // -- character edits -----------------------------------------------

    pub fn insert_char(&mut self, host: &HostSelection, ch: char) -> Result<Point> {
        self.invalidate_facts();
        let sel = self.resolve_selection(host)?;
        let point = if sel.is_range() {
            self.collapse_selection(&sel)?
        } else {
            sel.start
        };
        self.doc
            .insert_text_in_run(point.run, point.offset, &ch.to_string())?;
        Ok(Point {
            run: point.run,
            offset: point.offset + 1,
        })
    }

    /// Splits the current paragraph at the cursor (deleting a range
    /// selection first). The caret lands at the start of the suffix
    /// paragraph.
    pub fn insert_paragraph(&mut self, host: &HostSelection) -> Result<Point> {
        self.invalidate_facts();
        let sel = self.resolve_selection(host)?;
        let point = if sel.is_range() {
            self.collapse_selection(&sel)?
        } else {
            sel.start
        };
        self.doc.split_paragraph(point.run, point.offset)
    }

    pub fn remove_next_char(&mut self, host: &HostSelection) -> Result<Point> {
        self.invalidate_facts();
        let sel = self.resolve_selection(host)?;
        if sel.is_range() {
            return self.collapse_selection(&sel);
        }
        let Point { run, offset } = sel.start;
        let len = self.doc.run_len(run)?;
        if offset < len {
            self.doc.delete_run_range(run, offset, offset + 1)?;
            let len = self.doc.run_len(run)?;
            return Ok(Point {
                run,
                offset: offset.min(len),
            });
        }
        match self.doc.following_text(run)? {
            None => Ok(sel.start),
            Some(next) => {
                if self.doc.same_paragraph(run, next)? {
                    // A length-1 neighbor is removed outright rather than
                    // left as a placeholder.
                    if self.doc.run_len(next)? == 1 {
                        self.doc.remove_run(next)?;
                    } else {
                        self.doc.delete_run_range(next, 0, 1)?;
                    }
                    Ok(Point { run, offset })
                } else {
                    let dst = self.doc.containing_paragraph(run)?;
                    let src = self.doc.containing_paragraph(next)?;
                    Ok(self.doc.combine_paragraphs(dst, src)?.unwrap_or(sel.start))
                }
            }
        }
    }

    pub fn remove_previous_char(&mut self, host: &HostSelection) -> Result<Point> {
        self.invalidate_facts();
        let sel = self.resolve_selection(host)?;
        if sel.is_range() {
            return self.collapse_selection(&sel);
        }
        let Point { run, offset } = sel.start;
        if offset > 0 {
            self.doc.delete_run_range(run, offset - 1, offset)?;
            let len = self.doc.run_len(run)?;
            return Ok(Point {
                run,
                offset: (offset - 1).min(len),
            });
        }
        match self.doc.preceding_text(run)? {
            None => Ok(sel.start),
            Some(prev) => {
                if self.doc.same_paragraph(run, prev)? {
                    let plen = self.doc.run_len(prev)?;
                    if plen == 1 {
                        self.doc.remove_run(prev)?;
                    } else {
                        self.doc.delete_run_range(prev, plen - 1, plen)?;
                    }
                    Ok(Point { run, offset: 0 })
                } else {
                    let dst = self.doc.containing_paragraph(prev)?;
                    let src = self.doc.containing_paragraph(run)?;
                    Ok(self.doc.combine_paragraphs(dst, src)?.unwrap_or(sel.start))
                }
            }
        }
    }

    // -- link / unlink -------------------------------------------------

    /// Promotes the current linkable selection into a link. The run is
    /// carved into up to three siblings: leading plain text, the linked
    /// substring, trailing plain text. The caret keeps its position
    /// relative to the linked text.
    pub fn link(&mut self, target: &str) -> Result<Point> {
        let linkable = self.linkable.take().ok_or(DocError::NoLinkableSelection)?;
        self.invalidate_facts();

        let run = linkable.run;
        let para = self.doc.containing_paragraph(run)?;
        let chars: Vec<char> = self.doc.run_text(run)?.chars().collect();
        let lead: String = chars[..linkable.start].iter().collect();
        let selected: String = chars[linkable.start..linkable.end].iter().collect();
        let trail: String = chars[linkable.end..].iter().collect();

        let mut index = self.doc.child_position(para, run)?;
        if !lead.is_empty() {
            self.doc.insert_plain_run(para, index, &lead)?;
            index += 1;
        }
        let link_text = self.doc.insert_link_run(para, index, &selected, target)?;
        index += 1;
        if !trail.is_empty() {
            self.doc.insert_plain_run(para, index, &trail)?;
        }
        self.doc.remove_run(run)?;

        let offset = linkable
            .cursor
            .saturating_sub(linkable.start)
            .min(selected.chars().count());
        Ok(Point {
            run: link_text,
            offset,
        })
    }

    /// Dissolves the link of the current linked selection back into plain
    /// text, fusing it with adjacent plain runs.
    pub fn unlink(&mut self) -> Result<Point> {
        let linked = self.linked.take().ok_or(DocError::NoLinkedSelection)?;
        self.invalidate_facts();

        let para = self.doc.containing_paragraph(linked.run)?;
        let text = self.doc.run_text(linked.run)?.to_string();
        let index = self.doc.child_position(para, linked.link)?;
        let plain = self.doc.insert_plain_run(para, index, &text)?;
        self.doc.remove_run(linked.run)?;

        let hint = Point {
            run: plain,
            offset: linked.offset.min(text.chars().count()),
        };
        self.doc.merge_adjacent_texts(para, hint)
    }

    // -- stubs ---------------------------------------------------------
    // Named no-ops so the command surface stays complete; none of these
    // mutate the model or fault.

    pub fn remove_to_start_of_line(&mut self) {
        debug!("remove-to-start-of-line: not yet supported");
    }

    pub fn remove_to_end_of_line(&mut self) {
        debug!("remove-to-end-of-line: not yet supported");
    }

    pub fn remove_previous_word(&mut self) {
        debug!("remove-previous-word: not yet supported");
    }

    pub fn remove_next_word(&mut self) {
        debug!("remove-next-word: not yet supported");
    }

    pub fn undo(&mut self) {
        debug!("undo: not yet supported");
    }

    pub fn redo(&mut self) {
        debug!("redo: not yet supported");
    }

    pub fn copy(&mut self) {
        debug!("copy: not yet supported");
    }

    pub fn cut(&mut self) {
        debug!("cut: not yet supported");
    }

    pub fn paste(&mut self) {
        debug!("paste: not yet supported");
    }

    // -- internals -----------------------------------------------------

    fn resolve_selection(&mut self, host: &HostSelection) -> Result<Selection> {
        self.doc.seed_if_empty();
        Selection::from_host(&self.doc, host)
    }

    /// Deletes a range selection and returns the collapsed caret.
    fn collapse_selection(&mut self, sel: &Selection) -> Result<Point> {
        match self.remove_selection(sel)? {
            Some(point) => Ok(point),
            None => {
                // Everything before the removed run is gone; fall back to
                // the document start (seeding if the removal emptied it).
                if let Some(point) = self.doc.seed_if_empty() {
                    return Ok(point);
                }
                let para = *self
                    .doc
                    .paragraph_ids()
                    .first()
                    .ok_or(DocError::EmptyParagraph)?;
                let run = self.doc.first_text_of(para)?;
                Ok(Point { run, offset: 0 })
            }
        }
    }

    /// Removes the selected range. Within one run the substring is cut
    /// (removing the run entirely when fully covered); across runs the
    /// captured in-between runs are dropped, both boundary runs are
    /// truncated, and the two paragraphs are merged.
    fn remove_selection(&mut self, sel: &Selection) -> Result<Option<Point>> {
        if !sel.is_range() {
            return Ok(Some(sel.start));
        }

        if sel.start.run == sel.end.run {
            let run = sel.start.run;
            let (start, end) = (sel.start.offset, sel.end.offset);
            let len = self.doc.run_len(run)?;
            if start == 0 && end == len {
                let prev = self.doc.preceding_text(run)?;
                self.doc.remove_run(run)?;
                return match prev {
                    Some(prev) => Ok(Some(Point {
                        run: prev,
                        offset: self.doc.run_len(prev)?,
                    })),
                    None => Ok(None),
                };
            }
            self.doc.delete_run_range(run, start, end)?;
            return Ok(Some(Point { run, offset: start }));
        }

        for &run in &sel.between {
            self.doc.remove_run(run)?;
        }
        let start_len = self.doc.run_len(sel.start.run)?;
        self.doc
            .delete_run_range(sel.start.run, sel.start.offset, start_len)?;
        self.doc.delete_run_range(sel.end.run, 0, sel.end.offset)?;

        let dst = self.doc.containing_paragraph(sel.start.run)?;
        let src = self.doc.containing_paragraph(sel.end.run)?;
        if dst != src {
            self.doc.combine_paragraphs(dst, src)?;
        }
        let len = self.doc.run_len(sel.start.run)?;
        Ok(Some(Point {
            run: sel.start.run,
            offset: sel.start.offset.min(len),
        }))
    }
}
