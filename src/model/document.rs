//! Document-level types.

use super::{Paragraph, Table};
use serde::{Deserialize, Serialize};

/// A loaded document, owned by a single normalization pass.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Main story, in document order
    pub body: Vec<Block>,

    /// Header and footer stories
    pub headers_footers: Vec<Story>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document whose body holds the given paragraphs.
    pub fn from_paragraphs(paragraphs: impl IntoIterator<Item = Paragraph>) -> Self {
        Self {
            body: paragraphs.into_iter().map(Block::Paragraph).collect(),
            headers_footers: Vec::new(),
        }
    }

    /// Add a block to the body.
    pub fn add_block(&mut self, block: Block) {
        self.body.push(block);
    }

    /// Add a paragraph to the body.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.body.push(Block::Paragraph(paragraph));
    }

    /// Add a header or footer story.
    pub fn add_story(&mut self, story: Story) {
        self.headers_footers.push(story);
    }

    /// Body paragraphs in document order, including nested ones.
    pub fn paragraphs(&self) -> Vec<&Paragraph> {
        let mut out = Vec::new();
        collect_paragraphs(&self.body, &mut out);
        out
    }

    /// Count body paragraphs, including nested ones.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().len()
    }

    /// Check if the body has no blocks.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Get plain text content of the body.
    pub fn plain_text(&self) -> String {
        self.paragraphs()
            .iter()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Push every paragraph reachable from `blocks`, in document order.
pub fn collect_paragraphs<'a>(blocks: &'a [Block], out: &mut Vec<&'a Paragraph>) {
    for block in blocks {
        match block {
            Block::Paragraph(p) => out.push(p),
            Block::Table(t) => {
                for cell in t.cells() {
                    collect_paragraphs(&cell.blocks, out);
                }
            }
            Block::Frame(f) => collect_paragraphs(&f.blocks, out),
        }
    }
}

/// A block-level element.
#[derive(Debug, Clone)]
pub enum Block {
    /// A paragraph
    Paragraph(Paragraph),
    /// A table whose cells hold blocks
    Table(Table),
    /// A nested text container (text box, content control)
    Frame(Frame),
}

impl Block {
    /// Paragraphs in this block, nested ones included.
    pub fn paragraph_count(&self) -> usize {
        match self {
            Block::Paragraph(_) => 1,
            Block::Table(t) => t.paragraph_count(),
            Block::Frame(f) => f.blocks.iter().map(Block::paragraph_count).sum(),
        }
    }
}

/// A nested text container.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Content blocks
    pub blocks: Vec<Block>,
}

impl Frame {
    /// Create a frame from blocks.
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }
}

/// Kind of secondary story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryKind {
    /// Page header
    Header,
    /// Page footer
    Footer,
}

/// A header or footer.
#[derive(Debug, Clone)]
pub struct Story {
    /// Header or footer
    pub kind: StoryKind,

    /// Container-specific name (e.g., part name)
    pub name: String,

    /// Content blocks
    pub blocks: Vec<Block>,
}

impl Story {
    /// Create an empty story.
    pub fn new(kind: StoryKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            blocks: Vec::new(),
        }
    }

    /// Stories' paragraphs in document order.
    pub fn paragraphs(&self) -> Vec<&Paragraph> {
        let mut out = Vec::new();
        collect_paragraphs(&self.blocks, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TableCell, TableRow};

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.paragraph_count(), 0);
    }

    #[test]
    fn test_paragraphs_in_document_order() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("one"));
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["two", "three"]));
        doc.add_block(Block::Table(table));
        doc.add_block(Block::Frame(Frame::new(vec![Block::Paragraph(
            Paragraph::with_text("four"),
        )])));
        doc.add_paragraph(Paragraph::with_text("five"));

        let texts: Vec<_> = doc.paragraphs().iter().map(|p| p.text()).collect();
        assert_eq!(texts, vec!["one", "two", "three", "four", "five"]);
        assert_eq!(doc.plain_text(), "one\ntwo\nthree\nfour\nfive");
    }

    #[test]
    fn test_story_paragraphs() {
        let mut story = Story::new(StoryKind::Header, "header1");
        story
            .blocks
            .push(Block::Table(Table::from_rows(vec![TableRow::new(vec![
                TableCell::text("Page header"),
            ])])));
        assert_eq!(story.paragraphs().len(), 1);
    }
}
