use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Table-related tags the extractors look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Table,
    Caption,
    Thead,
    Th,
    Tbody,
    Tr,
    Td,
    Tfoot,
}

impl Tag {
    pub const ALL: [Self; 8] = [
        Self::Table,
        Self::Caption,
        Self::Thead,
        Self::Th,
        Self::Tbody,
        Self::Tr,
        Self::Td,
        Self::Tfoot,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Caption => "caption",
            Self::Thead => "thead",
            Self::Th => "th",
            Self::Tbody => "tbody",
            Self::Tr => "tr",
            Self::Td => "td",
            Self::Tfoot => "tfoot",
        }
    }

    fn selector(self) -> &'static Selector {
        &SELECTORS[self as usize]
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.name().eq_ignore_ascii_case(name))
    }
}

static SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    Tag::ALL
        .iter()
        .map(|tag| Selector::parse(tag.name()).expect("tag names are valid selectors"))
        .collect()
});

// Comments and raw-text elements are matched whole so tags inside them are
// skipped; quoted attribute values are consumed with their start tag.
static SOURCE_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)<!--.*?-->",
        r"|<!\[CDATA\[.*?\]\]>",
        r"|<script\b.*?</script\s*>",
        r"|<style\b.*?</style\s*>",
        r"|<textarea\b.*?</textarea\s*>",
        r#"|<([a-z][a-z0-9]*)(?:[^>"']|"[^"]*"|'[^']*')*>"#,
    ))
    .expect("hardcoded source token regex is valid")
});

/// Byte span of an opening tag in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenTag {
    start: usize,
    end: usize,
}

/// A parsed HTML file that still knows where its table tags sit in the source.
///
/// The DOM comes from an HTML5 parser, which may synthesize elements (an
/// implied `<tbody>` around bare rows, for instance). Elements are matched to
/// the source by their ordinal among same-named tags; an element with no
/// matching source tag is treated as absent.
pub struct SourceDocument {
    source: String,
    html: Html,
    newline_offsets: Vec<usize>,
    open_tags: Vec<Vec<OpenTag>>,
}

impl SourceDocument {
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let newline_offsets = source
            .char_indices()
            .filter_map(|(offset, ch)| (ch == '\n').then_some(offset))
            .collect();

        let mut open_tags = vec![Vec::new(); Tag::ALL.len()];
        for capture in SOURCE_TOKEN_RE.captures_iter(source) {
            let (Some(whole), Some(name)) = (capture.get(0), capture.get(1)) else {
                continue;
            };
            if let Some(tag) = Tag::from_name(name.as_str()) {
                open_tags[tag as usize].push(OpenTag {
                    start: whole.start(),
                    end: whole.end(),
                });
            }
        }

        Self {
            source: source.to_string(),
            html: Html::parse_document(source),
            newline_offsets,
            open_tags,
        }
    }

    /// First element of the given kind that is actually written in the source.
    #[must_use]
    pub fn first(&self, tag: Tag) -> Option<Element<'_>> {
        if self.open_tags[tag as usize].is_empty() {
            return None;
        }
        let node = self.html.select(tag.selector()).next()?;
        Some(Element {
            doc: self,
            tag,
            node,
        })
    }

    fn open_tag_of(&self, tag: Tag, node: ElementRef<'_>) -> Option<OpenTag> {
        let ordinal = self
            .html
            .select(tag.selector())
            .position(|candidate| candidate == node)?;
        self.open_tags[tag as usize].get(ordinal).copied()
    }

    fn line_at(&self, offset: usize) -> Option<u32> {
        let preceding_newlines = self.newline_offsets.partition_point(|&nl| nl < offset);
        u32::try_from(preceding_newlines + 1).ok()
    }

    /// Source between the end of `open` and the closing tag of `tag`, or the
    /// enclosing `</table>` when the element is never closed.
    fn inner_source(&self, tag: Tag, open: OpenTag) -> &str {
        let rest = &self.source[open.end..];
        let close = rest
            .match_indices("</")
            .map(|(offset, _)| offset)
            .find(|&offset| {
                let name = &rest.as_bytes()[offset + 2..];
                [tag.name(), Tag::Table.name()].iter().any(|closing| {
                    name.len() >= closing.len()
                        && name[..closing.len()].eq_ignore_ascii_case(closing.as_bytes())
                        && name
                            .get(closing.len())
                            .is_none_or(|next| !next.is_ascii_alphanumeric())
                })
            })
            .unwrap_or(rest.len());
        &rest[..close]
    }
}

#[derive(Clone, Copy)]
pub struct Element<'a> {
    doc: &'a SourceDocument,
    tag: Tag,
    node: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// 1-based source line of the opening tag.
    ///
    /// Looked up on demand: it walks the same-named elements before this one.
    #[must_use]
    pub fn line(&self) -> Option<u32> {
        let open = self.doc.open_tag_of(self.tag, self.node)?;
        self.doc.line_at(open.start)
    }

    /// Concatenated text of all descendants, untrimmed.
    #[must_use]
    pub fn text(&self) -> String {
        self.node.text().collect()
    }

    /// Text written between this element's tags in the source.
    ///
    /// Unlike [`text`](Self::text) this keeps character data the HTML5 tree
    /// builder moves out of a table, such as bare text inside `<tfoot>`.
    /// Falls back to the DOM text when the element has no source tag.
    #[must_use]
    pub fn source_text(&self) -> String {
        let Some(open) = self.doc.open_tag_of(self.tag, self.node) else {
            return self.text();
        };
        let fragment = Html::parse_fragment(self.doc.inner_source(self.tag, open));
        fragment.root_element().text().collect()
    }

    #[must_use]
    pub fn markup(&self) -> String {
        self.node.html()
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node.value().attr(name)
    }

    /// Descendants of the given kind, in document order.
    #[must_use]
    pub fn select(&self, tag: Tag) -> Vec<Element<'a>> {
        self.node
            .select(tag.selector())
            .map(|node| Element {
                doc: self.doc,
                tag,
                node,
            })
            .collect()
    }
}

/// Renders a list of elements as `[<a>, <b>]`.
#[must_use]
pub fn markup_list(elements: &[Element<'_>]) -> String {
    let inner = elements
        .iter()
        .map(Element::markup)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{inner}]")
}

#[cfg(test)]
mod tests {
    use super::{SourceDocument, Tag};

    const SAMPLE: &str = "<html>\n<body>\n<table id=\"t1\">\n  <caption> Title </caption>\n  <thead><tr><th>A</th>\n  <th>B</th></tr></thead>\n</table>\n</body>\n</html>\n";

    #[test]
    fn reports_source_lines_for_tags() {
        let doc = SourceDocument::parse(SAMPLE);
        let table = doc.first(Tag::Table).expect("table should exist");
        assert_eq!(table.line(), Some(3));
        assert_eq!(table.attr("id"), Some("t1"));

        let caption = doc.first(Tag::Caption).expect("caption should exist");
        assert_eq!(caption.line(), Some(4));
        assert_eq!(caption.text(), " Title ");

        let head = doc.first(Tag::Thead).expect("thead should exist");
        let cells = head.select(Tag::Th);
        let lines = cells.iter().map(|cell| cell.line()).collect::<Vec<_>>();
        assert_eq!(lines, vec![Some(5), Some(6)]);
    }

    #[test]
    fn ignores_implied_tbody() {
        let doc = SourceDocument::parse("<table><tr><td>x</td></tr></table>");
        assert!(doc.first(Tag::Tbody).is_none());
        assert!(doc.first(Tag::Td).is_some());
    }

    #[test]
    fn does_not_confuse_th_with_thead() {
        let doc = SourceDocument::parse("<table><thead><tr><td>x</td></tr></thead></table>");
        assert!(doc.first(Tag::Thead).is_some());
        assert!(doc.first(Tag::Th).is_none());
    }

    #[test]
    fn skips_tags_in_comments_scripts_and_attributes() {
        let doc = SourceDocument::parse(concat!(
            "<!-- <caption>old</caption> -->\n",
            "<script>let t = \"<caption>\";</script>\n",
            "<table id=\"t\" title=\"<caption>\">\n",
            "<caption>Real</caption>\n",
            "</table>",
        ));

        let caption = doc.first(Tag::Caption).expect("caption should exist");
        assert_eq!(caption.line(), Some(4));
        assert_eq!(caption.text(), "Real");
    }

    #[test]
    fn source_text_keeps_text_moved_out_of_the_table() {
        let doc = SourceDocument::parse(
            "<table>\n<tfoot>Creation: <b>3Feb2013</b> &amp; Chad</tfoot>\n</table>",
        );
        let foot = doc.first(Tag::Tfoot).expect("tfoot should exist");

        assert_eq!(foot.text().trim(), "");
        assert_eq!(foot.source_text(), "Creation: 3Feb2013 & Chad");
        assert_eq!(foot.line(), Some(2));
    }

    #[test]
    fn unclosed_footer_stops_at_table_end() {
        let doc = SourceDocument::parse("<table><tfoot><tr><td>Creation: Chad</table><p>after</p>");
        let foot = doc.first(Tag::Tfoot).expect("tfoot should exist");

        assert_eq!(foot.source_text(), "Creation: Chad");
    }

    #[test]
    fn large_body_cells_are_wrapped_without_line_lookups() {
        let row = format!("<tr>{}</tr>", "<td>1</td>".repeat(40));
        let source = format!("<table><tbody>{}</tbody></table>", row.repeat(500));
        let doc = SourceDocument::parse(&source);

        let body = doc.first(Tag::Tbody).expect("tbody should exist");
        let cells = body.select(Tag::Td);
        assert_eq!(cells.len(), 20_000);
        assert_eq!(cells[0].line(), Some(1));
    }
}
