//! Table types.

use super::{Block, Paragraph};

/// A table structure.
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Rows in the table
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from rows.
    pub fn from_rows(rows: Vec<TableRow>) -> Self {
        Self { rows }
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Cells in reading order: row by row, left to right.
    pub fn cells(&self) -> impl Iterator<Item = &TableCell> {
        self.rows.iter().flat_map(|r| r.cells.iter())
    }

    /// Paragraphs in all cells, nested tables included.
    pub fn paragraph_count(&self) -> usize {
        self.cells()
            .flat_map(|c| c.blocks.iter())
            .map(Block::paragraph_count)
            .sum()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A table row.
#[derive(Debug, Clone, Default)]
pub struct TableRow {
    /// Cells in the row
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }
}

/// A table cell.
#[derive(Debug, Clone, Default)]
pub struct TableCell {
    /// Cell content
    pub blocks: Vec<Block>,
}

impl TableCell {
    /// Create a new cell with one text paragraph.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            blocks: vec![Block::Paragraph(Paragraph::with_text(text))],
        }
    }

    /// Create a cell with blocks.
    pub fn with_content(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Check if the cell has no content.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
