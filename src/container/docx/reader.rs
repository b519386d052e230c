//! WordprocessingML part parsing.
//!
//! A part is split into verbatim segments and paragraphs. Paragraph
//! children become model runs:
//!
//! - the children of a `w:r` are grouped into text pieces (properties,
//!   text, tabs) and object pieces (breaks, drawings, symbols), so a run
//!   like `text<w:br/>text` yields text, object, text;
//! - wrappers (`w:ins`, `w:smartTag`, `w:customXml`, inline `w:sdt`) are
//!   descended into;
//! - zero-width elements (bookmarks, proofing marks) → marker run;
//! - anything else (drawings, fields, hyperlinks) → object run.
//!
//! Byte ranges into the original XML are kept so the writer can reproduce
//! everything the engine did not touch.

use super::styles::StyleSheet;
use crate::error::{Error, Result};
use crate::model::{
    Block, FormatToken, Frame, ListInfo, Paragraph, ParagraphStyle, Run, Table, TableCell,
    TableRow,
};
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::ops::Range;
use std::sync::Arc;

/// Paragraph children that occupy no space on the page.
const MARKER_ELEMENTS: &[&[u8]] = &[
    b"bookmarkStart",
    b"bookmarkEnd",
    b"proofErr",
    b"permStart",
    b"permEnd",
    b"commentRangeStart",
    b"commentRangeEnd",
    b"moveFromRangeStart",
    b"moveFromRangeEnd",
    b"moveToRangeStart",
    b"moveToRangeEnd",
    b"smartTagPr",
    b"customXmlPr",
    b"sdtPr",
    b"sdtEndPr",
    b"r",
];

/// Inline elements whose children belong to the paragraph's text flow.
const WRAPPER_ELEMENTS: &[&[u8]] = &[
    b"ins",
    b"moveTo",
    b"smartTag",
    b"customXml",
    b"sdt",
    b"sdtContent",
    b"dir",
    b"bdo",
];

/// Start and end tags of an element enclosing inline content.
#[derive(Debug)]
pub(crate) struct Shell {
    /// Start tag, followed by `w:rPr` for runs
    pub open: String,
    /// End tag
    pub close: String,
}

/// Markup behind a docx run's format token.
#[derive(Debug)]
pub(crate) enum RunMarkup {
    /// Text children of a `w:r`
    Text {
        /// Enclosing elements, outermost first; the last one is the run
        path: Vec<Arc<Shell>>,
        /// The children as loaded
        body: String,
        /// The `<w:r ...>` start tag
        open_tag: String,
        /// The `<w:rPr>` element, or empty
        properties: String,
        /// Text as loaded (tabs as `\t`)
        text: String,
        /// Namespace prefix including the colon, e.g. `w:`
        prefix: String,
    },
    /// Markup emitted as-is inside its enclosing elements
    Verbatim {
        /// Enclosing elements, outermost first
        path: Vec<Arc<Shell>>,
        /// The markup
        raw: String,
    },
}

impl RunMarkup {
    fn verbatim(path: &[Arc<Shell>], raw: &str) -> FormatToken {
        FormatToken::new(RunMarkup::Verbatim {
            path: path.to_vec(),
            raw: raw.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PieceKind {
    Text,
    Object,
}

/// Consecutive children of one run with the same kind.
struct Piece {
    kind: PieceKind,
    end: usize,
    text: String,
}

/// Piece of a part in document order.
#[derive(Debug, Clone)]
pub(crate) enum Segment {
    /// Bytes copied unchanged
    Raw(Range<usize>),
    /// A paragraph, rebuilt from the model on save
    Paragraph(ParagraphLayout),
}

/// Where a paragraph's fixed markup lives.
#[derive(Debug, Clone)]
pub(crate) struct ParagraphLayout {
    /// Start tag and paragraph properties
    pub head: Range<usize>,
    /// End tag
    pub tail: Range<usize>,
    /// Namespace prefix of the paragraph element
    pub prefix: String,
    /// `<w:p/>` with no children
    pub self_closing: bool,
}

/// A parsed XML part ready to be written back.
#[derive(Debug)]
pub(crate) struct PartLayout {
    /// Zip entry name
    pub name: String,
    /// Original XML
    pub xml: String,
    /// Segments covering the whole XML
    pub segments: Vec<Segment>,
}

/// Parse a document, header or footer part.
pub(crate) fn parse_part(
    name: &str,
    xml: String,
    styles: &StyleSheet,
) -> Result<(PartLayout, Vec<Block>)> {
    let (segments, blocks) = {
        let mut parser = PartParser::new(&xml, styles);
        parser.parse()?;
        parser.finish()?
    };
    log::debug!("Parsed {} into {} segments", name, segments.len());
    Ok((
        PartLayout {
            name: name.to_string(),
            xml,
            segments,
        },
        blocks,
    ))
}

/// Event reader that reports byte ranges.
#[derive(Clone)]
struct Events<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> Events<'a> {
    fn new(xml: &'a str) -> Self {
        Self {
            reader: Reader::from_str(xml),
        }
    }

    fn position(&self) -> usize {
        self.reader.buffer_position() as usize
    }

    fn next(&mut self) -> Result<(Event<'a>, Range<usize>)> {
        let start = self.position();
        let event = self.reader.read_event()?;
        Ok((event, start..self.position()))
    }

    /// Consume up to the end tag matching an already-read start tag.
    /// Returns the range of that end tag.
    fn skip_to_end(&mut self) -> Result<Range<usize>> {
        let mut depth = 0usize;
        loop {
            let (event, range) = self.next()?;
            match event {
                Event::Start(_) => depth += 1,
                Event::End(_) if depth == 0 => return Ok(range),
                Event::End(_) => depth -= 1,
                Event::Eof => return Err(Error::Xml("unexpected end of part".into())),
                _ => {}
            }
        }
    }
}

enum Open {
    Root(Vec<Block>),
    Table(Table),
    Row(TableRow),
    Cell(Vec<Block>),
    Frame(Vec<Block>),
}

impl Open {
    fn holds_blocks(&self) -> bool {
        matches!(self, Open::Root(_) | Open::Cell(_) | Open::Frame(_))
    }
}

struct Level {
    open: Open,
    depth: usize,
}

struct PartParser<'a> {
    events: Events<'a>,
    xml: &'a str,
    styles: &'a StyleSheet,
    segments: Vec<Segment>,
    raw_from: usize,
    stack: Vec<Level>,
    depth: usize,
}

#[derive(Default)]
struct ParagraphProperties {
    style_id: Option<String>,
    outline_level: Option<u8>,
    num_id: Option<String>,
    list_level: Option<u8>,
}

impl ParagraphProperties {
    fn apply(&mut self, e: &BytesStart<'_>) {
        match e.local_name().as_ref() {
            b"pStyle" => self.style_id = attr(e, b"val"),
            b"outlineLvl" => self.outline_level = attr(e, b"val").and_then(|v| v.parse().ok()),
            b"numId" => self.num_id = attr(e, b"val"),
            b"ilvl" => self.list_level = attr(e, b"val").and_then(|v| v.parse().ok()),
            _ => {}
        }
    }
}

impl<'a> PartParser<'a> {
    fn new(xml: &'a str, styles: &'a StyleSheet) -> Self {
        Self {
            events: Events::new(xml),
            xml,
            styles,
            segments: Vec::new(),
            raw_from: 0,
            stack: vec![Level {
                open: Open::Root(Vec::new()),
                depth: 0,
            }],
            depth: 0,
        }
    }

    fn parse(&mut self) -> Result<()> {
        loop {
            let (event, range) = self.events.next()?;
            match event {
                Event::Start(e) if e.local_name().as_ref() == b"p" => {
                    self.flush_raw(range.start);
                    let (paragraph, layout) = self.paragraph(&e, range)?;
                    self.raw_from = layout.tail.end;
                    self.segments.push(Segment::Paragraph(layout));
                    self.push_block(Block::Paragraph(paragraph))?;
                }
                Event::Empty(e) if e.local_name().as_ref() == b"p" => {
                    self.flush_raw(range.start);
                    self.raw_from = range.end;
                    self.segments.push(Segment::Paragraph(ParagraphLayout {
                        head: range.clone(),
                        tail: range.end..range.end,
                        prefix: qualified_prefix(e.name().as_ref()),
                        self_closing: true,
                    }));
                    let style = self.resolve_style(ParagraphProperties::default());
                    self.push_block(Block::Paragraph(Paragraph::new().with_style(style)))?;
                }
                Event::Start(e) => {
                    self.depth += 1;
                    self.open_container(e.local_name().as_ref());
                }
                Event::End(_) => {
                    self.close_container();
                    self.depth = self.depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
        }
        self.flush_raw(self.xml.len());
        Ok(())
    }

    fn finish(mut self) -> Result<(Vec<Segment>, Vec<Block>)> {
        match self.stack.pop() {
            Some(Level {
                open: Open::Root(blocks),
                ..
            }) if self.stack.is_empty() => Ok((self.segments, blocks)),
            _ => Err(Error::Xml("unbalanced table structure".into())),
        }
    }

    fn flush_raw(&mut self, until: usize) {
        if until > self.raw_from {
            self.segments.push(Segment::Raw(self.raw_from..until));
        }
        self.raw_from = until;
    }

    fn open_container(&mut self, local: &[u8]) {
        let Some(top) = self.stack.last() else {
            return;
        };
        let open = match (local, &top.open) {
            (b"tbl", parent) if parent.holds_blocks() => Open::Table(Table::new()),
            (b"tr", Open::Table(_)) => Open::Row(TableRow::default()),
            (b"tc", Open::Row(_)) => Open::Cell(Vec::new()),
            (b"sdtContent", parent) if parent.holds_blocks() => Open::Frame(Vec::new()),
            _ => return,
        };
        self.stack.push(Level {
            open,
            depth: self.depth,
        });
    }

    fn close_container(&mut self) {
        if self.stack.len() < 2 || self.stack.last().map(|l| l.depth) != Some(self.depth) {
            return;
        }
        let Some(level) = self.stack.pop() else {
            return;
        };
        let Some(parent) = self.stack.last_mut() else {
            return;
        };
        match (level.open, &mut parent.open) {
            (Open::Table(table), Open::Root(blocks) | Open::Cell(blocks) | Open::Frame(blocks)) => {
                blocks.push(Block::Table(table))
            }
            (Open::Row(row), Open::Table(table)) => table.rows.push(row),
            (Open::Cell(content), Open::Row(row)) => row.cells.push(TableCell::with_content(content)),
            (Open::Frame(content), Open::Root(blocks) | Open::Cell(blocks) | Open::Frame(blocks)) => {
                blocks.push(Block::Frame(Frame::new(content)))
            }
            _ => {}
        }
    }

    fn push_block(&mut self, block: Block) -> Result<()> {
        match self.stack.last_mut().map(|l| &mut l.open) {
            Some(Open::Root(blocks) | Open::Cell(blocks) | Open::Frame(blocks)) => {
                blocks.push(block);
                Ok(())
            }
            _ => Err(Error::Xml("paragraph outside of a block container".into())),
        }
    }

    fn paragraph(
        &mut self,
        start: &BytesStart<'a>,
        open: Range<usize>,
    ) -> Result<(Paragraph, ParagraphLayout)> {
        let prefix = qualified_prefix(start.name().as_ref());
        let mut props = ParagraphProperties::default();
        let mut head_end = open.end;
        let mut in_head = true;
        let mut runs = Vec::new();

        loop {
            let (event, range) = self.events.next()?;
            match event {
                Event::Start(ref e) if in_head && e.local_name().as_ref() == b"pPr" => {
                    props = self.paragraph_properties()?;
                    head_end = self.events.position();
                }
                Event::Empty(ref e) if in_head && e.local_name().as_ref() == b"pPr" => {
                    head_end = range.end;
                }
                Event::Start(_) | Event::Empty(_) => {
                    in_head = false;
                    self.inline(event, range, &[], &mut runs)?;
                }
                Event::End(_) => {
                    let layout = ParagraphLayout {
                        head: open.start..head_end,
                        tail: range,
                        prefix,
                        self_closing: false,
                    };
                    let paragraph = Paragraph::from_runs(runs).with_style(self.resolve_style(props));
                    return Ok((paragraph, layout));
                }
                Event::Eof => return Err(Error::Xml("unexpected end of part inside paragraph".into())),
                _ if in_head => head_end = range.end,
                _ => self.inline(event, range, &[], &mut runs)?,
            }
        }
    }

    /// Turn one child of a paragraph or wrapper into runs.
    fn inline(
        &mut self,
        event: Event<'a>,
        range: Range<usize>,
        path: &[Arc<Shell>],
        runs: &mut Vec<Run>,
    ) -> Result<()> {
        match event {
            Event::Start(e) => {
                let local = e.local_name();
                match local.as_ref() {
                    b"r" => self.run(&e, range, path, runs)?,
                    name if WRAPPER_ELEMENTS.contains(&name) => self.wrapper(range, path, runs)?,
                    name => {
                        let close = self.events.skip_to_end()?;
                        runs.push(verbatim_run(name, path, &self.xml[range.start..close.end]));
                    }
                }
            }
            Event::Empty(e) => {
                let local = e.local_name();
                let raw = &self.xml[range];
                if WRAPPER_ELEMENTS.contains(&local.as_ref()) {
                    runs.push(Run::marker(RunMarkup::verbatim(path, raw)));
                } else {
                    runs.push(verbatim_run(local.as_ref(), path, raw));
                }
            }
            _ => runs.push(Run::marker(RunMarkup::verbatim(path, &self.xml[range]))),
        }
        Ok(())
    }

    fn wrapper(&mut self, open: Range<usize>, path: &[Arc<Shell>], runs: &mut Vec<Run>) -> Result<()> {
        // Children hold the shell, so find the end tag before reading them.
        let close = self.events.clone().skip_to_end()?;
        let mut inner = path.to_vec();
        inner.push(Arc::new(Shell {
            open: self.xml[open].to_string(),
            close: self.xml[close].to_string(),
        }));

        loop {
            let (event, range) = self.events.next()?;
            match event {
                Event::End(_) => return Ok(()),
                Event::Eof => return Err(Error::Xml("unexpected end of part inside wrapper".into())),
                _ => self.inline(event, range, &inner, runs)?,
            }
        }
    }

    fn paragraph_properties(&mut self) -> Result<ParagraphProperties> {
        let mut props = ParagraphProperties::default();
        loop {
            let (event, _) = self.events.next()?;
            match event {
                Event::Start(e) => {
                    // numPr children carry the list reference; everything
                    // else (including revision history) is skipped whole.
                    if e.local_name().as_ref() != b"numPr" {
                        props.apply(&e);
                        self.events.skip_to_end()?;
                    }
                }
                Event::Empty(e) => props.apply(&e),
                Event::End(e) if e.local_name().as_ref() == b"pPr" => return Ok(props),
                Event::Eof => return Err(Error::Xml("unexpected end of part inside w:pPr".into())),
                _ => {}
            }
        }
    }

    fn run(
        &mut self,
        start: &BytesStart<'a>,
        open: Range<usize>,
        path: &[Arc<Shell>],
        runs: &mut Vec<Run>,
    ) -> Result<()> {
        let mut properties = String::new();
        let mut head_end = open.end;
        let mut pieces: Vec<Piece> = Vec::new();

        let close = loop {
            let (event, range) = self.events.next()?;
            let (kind, end, text) = match event {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"rPr" if pieces.is_empty() => {
                        let close = self.events.skip_to_end()?;
                        properties = self.xml[range.start..close.end].to_string();
                        head_end = close.end;
                        continue;
                    }
                    b"t" => {
                        let close = self.events.skip_to_end()?;
                        let decoded = unescape(&self.xml[range.end..close.start])
                            .map_err(|e| Error::Xml(e.to_string()))?;
                        (PieceKind::Text, close.end, decoded.into_owned())
                    }
                    _ => {
                        let close = self.events.skip_to_end()?;
                        (PieceKind::Object, close.end, String::new())
                    }
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"rPr" if pieces.is_empty() => {
                        properties = self.xml[range.clone()].to_string();
                        head_end = range.end;
                        continue;
                    }
                    b"tab" => (PieceKind::Text, range.end, "\t".to_string()),
                    b"t" | b"lastRenderedPageBreak" => (PieceKind::Text, range.end, String::new()),
                    _ => (PieceKind::Object, range.end, String::new()),
                },
                Event::End(_) => break range,
                Event::Eof => return Err(Error::Xml("unexpected end of part inside w:r".into())),
                _ if self.xml[range.clone()].trim().is_empty() => {
                    // Whitespace between children stays with its neighbour.
                    if let Some(last) = pieces.last_mut() {
                        last.end = range.end;
                    }
                    continue;
                }
                _ => (PieceKind::Object, range.end, String::new()),
            };
            if let Some(last) = pieces.last_mut().filter(|last| last.kind == kind) {
                last.end = end;
                last.text.push_str(&text);
            } else {
                pieces.push(Piece { kind, end, text });
            }
        };

        if let Some(last) = pieces.last_mut() {
            last.end = close.start;
        } else {
            // Only properties: an empty text run
            pieces.push(Piece {
                kind: PieceKind::Text,
                end: close.start,
                text: String::new(),
            });
        }

        let mut path = path.to_vec();
        path.push(Arc::new(Shell {
            open: self.xml[open.start..head_end].to_string(),
            close: self.xml[close].to_string(),
        }));
        let open_tag = &self.xml[open];
        let prefix = qualified_prefix(start.name().as_ref());

        let mut from = head_end;
        for piece in pieces {
            let body = &self.xml[from..piece.end];
            from = piece.end;
            let run = match piece.kind {
                PieceKind::Text => {
                    let markup = RunMarkup::Text {
                        path: path.clone(),
                        body: body.to_string(),
                        open_tag: open_tag.to_string(),
                        properties: properties.clone(),
                        text: piece.text.clone(),
                        prefix: prefix.clone(),
                    };
                    Run::new(piece.text, FormatToken::new(markup))
                }
                PieceKind::Object => Run::object(RunMarkup::verbatim(&path, body)),
            };
            runs.push(run);
        }
        Ok(())
    }

    fn resolve_style(&self, props: ParagraphProperties) -> ParagraphStyle {
        let base = self.styles.resolve(props.style_id.as_deref());
        let list = match props.num_id {
            Some(id) if id != "0" => {
                Some(ListInfo::new(props.list_level.unwrap_or(0)).with_numbering(id))
            }
            // numId 0 explicitly removes inherited numbering
            Some(_) => None,
            None => base.list,
        };
        ParagraphStyle {
            style_id: props.style_id.or(base.style_id),
            style_name: base.style_name,
            outline_level: props.outline_level.or(base.outline_level),
            list,
        }
    }
}

fn verbatim_run(local: &[u8], path: &[Arc<Shell>], raw: &str) -> Run {
    let token = RunMarkup::verbatim(path, raw);
    if MARKER_ELEMENTS.contains(&local) {
        Run::marker(token)
    } else {
        Run::object(token)
    }
}

/// `w:p` → `w:`; an unprefixed name yields an empty prefix.
fn qualified_prefix(name: &[u8]) -> String {
    let name = String::from_utf8_lossy(name);
    match name.rsplit_once(':') {
        Some((prefix, _)) => format!("{}:", prefix),
        None => String::new(),
    }
}

/// Read an attribute by local name, unescaped.
pub(crate) fn attr(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .map(|a| {
            let raw = String::from_utf8_lossy(&a.value).into_owned();
            match unescape(&raw) {
                Ok(value) => value.into_owned(),
                Err(_) => raw,
            }
        })
}
