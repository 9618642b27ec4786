// Markdown codec
// The storage format is a restricted CommonMark subset: paragraphs
// separated by blank lines, containing plain text and [text](target)
// links. Parsing validates the pulldown-cmark event stream against that
// grammar and faults on anything else; serialization is the inverse.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use crate::document::{Document, Node, NodeId};
use crate::error::{DocError, Result};

fn malformed(msg: impl Into<String>) -> DocError {
    DocError::MalformedMarkdown(msg.into())
}

/// Parses markdown text into a document. Any construct outside the
/// accepted grammar is a malformed-input fault.
pub fn from_markdown(input: &str) -> Result<Document> {
    let mut doc = Document::new();
    let mut current: Option<NodeId> = None;
    // target and accumulated display text of an open link
    let mut link: Option<(String, String)> = None;

    for event in Parser::new(input) {
        match event {
            Event::Start(Tag::Paragraph) => {
                if current.is_some() {
                    return Err(malformed("nested paragraph"));
                }
                current = Some(doc.push_paragraph());
            }
            Event::End(TagEnd::Paragraph) => {
                current = None;
            }
            Event::Start(Tag::Link { dest_url, .. }) => {
                if current.is_none() {
                    return Err(malformed("link outside a paragraph"));
                }
                if link.is_some() {
                    return Err(malformed("nested link"));
                }
                link = Some((dest_url.to_string(), String::new()));
            }
            Event::End(TagEnd::Link) => {
                let (target, text) = link.take().ok_or_else(|| malformed("unbalanced link"))?;
                let para = current.ok_or_else(|| malformed("link outside a paragraph"))?;
                if text.is_empty() {
                    return Err(malformed("link without a text child"));
                }
                doc.push_link(para, &text, &target)?;
            }
            Event::Text(text) => match (&mut link, current) {
                (Some((_, buf)), _) => buf.push_str(&text),
                (None, Some(para)) => {
                    doc.push_text(para, &text)?;
                }
                (None, None) => return Err(malformed("text outside a paragraph")),
            },
            Event::Start(tag) => {
                let name = tag_name(&tag);
                return Err(if current.is_some() {
                    malformed(format!("unsupported inline content: {}", name))
                } else {
                    malformed(format!("top-level block is not a paragraph: {}", name))
                });
            }
            other => {
                return Err(malformed(format!(
                    "unsupported construct: {}",
                    event_name(&other)
                )));
            }
        }
    }
    Ok(doc)
}

/// Serializes a document back to markdown: paragraph serializations
/// joined by blank lines, links as `[text](target)`.
pub fn to_markdown(doc: &Document) -> String {
    let mut out = String::new();
    for (i, para) in doc.paragraphs.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        let Some(Node::Paragraph(p)) = doc.nodes.get(para) else {
            continue;
        };
        for child in &p.children {
            match doc.nodes.get(child) {
                Some(Node::Text(run)) => out.push_str(&run.text),
                Some(Node::Link(l)) => {
                    out.push('[');
                    if let Some(Node::Text(run)) = doc.nodes.get(&l.text) {
                        out.push_str(&run.text);
                    }
                    out.push_str("](");
                    out.push_str(&l.target);
                    out.push(')');
                }
                _ => {}
            }
        }
    }
    out
}

fn tag_name(tag: &Tag) -> &'static str {
    match tag {
        Tag::Heading { .. } => "heading",
        Tag::List(_) => "list",
        Tag::Item => "list item",
        Tag::CodeBlock(_) => "code block",
        Tag::BlockQuote(_) => "block quote",
        Tag::Table(_) => "table",
        Tag::TableHead => "table head",
        Tag::TableRow => "table row",
        Tag::TableCell => "table cell",
        Tag::FootnoteDefinition(_) => "footnote definition",
        Tag::HtmlBlock => "html block",
        Tag::MetadataBlock(_) => "metadata block",
        Tag::Emphasis => "emphasis",
        Tag::Strong => "strong emphasis",
        Tag::Strikethrough => "strikethrough",
        Tag::Image { .. } => "image",
        _ => "unsupported block",
    }
}

fn event_name(event: &Event) -> &'static str {
    match event {
        Event::SoftBreak => "soft line break",
        Event::HardBreak => "hard line break",
        Event::Code(_) => "inline code",
        Event::Html(_) | Event::InlineHtml(_) => "html",
        Event::Rule => "thematic break",
        Event::FootnoteReference(_) => "footnote reference",
        Event::TaskListMarker(_) => "task list marker",
        Event::InlineMath(_) | Event::DisplayMath(_) => "math",
        _ => "unsupported",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_paragraphs_and_links() {
        let doc = from_markdown("hello [world](http://x)\n\nsecond").unwrap();
        assert_eq!(doc.paragraph_count(), 2);
        let para = doc.paragraph_ids()[0];
        assert_eq!(doc.children(para).unwrap().len(), 2);
        assert_eq!(doc.paragraph_text(para).unwrap(), "hello world");
        let link_run = doc.last_text_of(para).unwrap();
        let link = doc.link_of(link_run).unwrap().unwrap();
        assert_eq!(doc.link_target(link).unwrap(), "http://x");
    }

    #[test]
    fn empty_input_gives_empty_document() {
        let doc = from_markdown("").unwrap();
        assert!(doc.is_empty());
        assert_eq!(to_markdown(&doc), "");
    }

    #[test]
    fn serializes_links_inline() {
        let mut doc = Document::new();
        let para = doc.push_paragraph();
        doc.push_text(para, "hello ").unwrap();
        doc.push_link(para, "world", "http://x").unwrap();
        assert_eq!(to_markdown(&doc), "hello [world](http://x)");
    }

    #[test]
    fn heading_is_rejected() {
        let err = from_markdown("# Title").unwrap_err();
        assert!(matches!(err, DocError::MalformedMarkdown(_)));
    }

    #[test]
    fn list_is_rejected() {
        assert!(matches!(
            from_markdown("- item"),
            Err(DocError::MalformedMarkdown(_))
        ));
    }

    #[test]
    fn emphasis_is_rejected() {
        assert!(matches!(
            from_markdown("some *emphasis* here"),
            Err(DocError::MalformedMarkdown(_))
        ));
    }

    #[test]
    fn inline_code_is_rejected() {
        assert!(matches!(
            from_markdown("some `code` here"),
            Err(DocError::MalformedMarkdown(_))
        ));
    }

    #[test]
    fn soft_break_is_rejected() {
        // a single newline inside a paragraph is outside the grammar
        assert!(matches!(
            from_markdown("one\ntwo"),
            Err(DocError::MalformedMarkdown(_))
        ));
    }

    #[test]
    fn image_inside_link_is_rejected() {
        assert!(matches!(
            from_markdown("[![alt](i.png)](http://x)"),
            Err(DocError::MalformedMarkdown(_))
        ));
    }

    #[test]
    fn empty_link_is_rejected() {
        assert!(matches!(
            from_markdown("a [](http://x) b"),
            Err(DocError::MalformedMarkdown(_))
        ));
    }

    #[test]
    fn round_trip_is_idempotent() {
        let original = "first [a](x) tail\n\nplain middle\n\n[b](y) last";
        let doc = from_markdown(original).unwrap();
        let serialized = to_markdown(&doc);
        assert_eq!(serialized, original);
        let reparsed = from_markdown(&serialized).unwrap();
        assert_eq!(to_markdown(&reparsed), serialized);
    }
}
