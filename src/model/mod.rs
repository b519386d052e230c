//! Document model types.
//!
//! Containers build these from a file; the indentation engine mutates them
//! in place; containers serialize them back.

mod document;
mod paragraph;
mod table;

pub use document::{collect_paragraphs, Block, Document, Frame, Story, StoryKind};
pub use paragraph::{
    FormatToken, ListInfo, Paragraph, ParagraphStyle, Run, RunKind, OBJECT_PLACEHOLDER,
};
pub use table::{Table, TableCell, TableRow};
