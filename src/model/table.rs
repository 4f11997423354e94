//! Table types.
//!
//! Table content arrives already resolved by the table extractor. The layout
//! engine never reflows it; it only positions the table as a whole.

use serde::{Deserialize, Serialize};

use super::{BBox, ReadingPosition};

/// A positioned table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableItem {
    /// Table identifier
    pub id: String,

    /// Bounding box in page space
    pub bbox: BBox,

    /// Nested row/cell content
    pub table: Table,

    /// Reading position once placed
    pub position: Option<ReadingPosition>,

    /// Element index of the linked caption paragraph
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<usize>,
}

impl TableItem {
    /// Create a table item.
    pub fn new(id: impl Into<String>, bbox: BBox, table: Table) -> Self {
        Self {
            id: id.into(),
            bbox,
            table,
            position: None,
            caption: None,
        }
    }

    /// Identifier of one cell, as carried by [`crate::model::Fragment::table_cell`].
    pub fn cell_id(&self, row: usize, col: usize) -> String {
        format!("{}:{}:{}", self.id, row, col)
    }

    /// Iterate over cell boxes that are known.
    pub fn cell_boxes(&self) -> impl Iterator<Item = &BBox> {
        self.table
            .rows
            .iter()
            .flat_map(|r| &r.cells)
            .filter_map(|c| c.bbox.as_ref())
    }
}

/// Row/cell content of a table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (widest row, counting spans).
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.cells.iter().map(|c| c.colspan.max(1) as usize).sum())
            .max()
            .unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if the table has complex structure (merged cells).
    pub fn has_merged_cells(&self) -> bool {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .any(|c| c.rowspan > 1 || c.colspan > 1)
    }
}

/// A table row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
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

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCell {
    /// Resolved cell text
    pub text: String,

    /// Cell box, when the extractor reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BBox>,

    /// Number of rows this cell spans
    pub rowspan: u8,

    /// Number of columns this cell spans
    pub colspan: u8,
}

impl TableCell {
    /// Create a new cell with text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bbox: None,
            rowspan: 1,
            colspan: 1,
        }
    }

    /// Set the cell box and return self.
    pub fn with_bbox(mut self, bbox: BBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Set colspan and return self.
    pub fn colspan(mut self, span: u8) -> Self {
        self.colspan = span;
        self
    }

    /// Set rowspan and return self.
    pub fn rowspan(mut self, span: u8) -> Self {
        self.rowspan = span;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_creation() {
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["Name", "Age"]));
        table.add_row(TableRow::from_strings(["Alice", "30"]));

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.plain_text(), "Name\tAge\nAlice\t30");
    }

    #[test]
    fn test_merged_cells() {
        let mut table = Table::new();
        table.add_row(TableRow::new(vec![TableCell::text("Merged").colspan(2)]));
        table.add_row(TableRow::from_strings(["A", "B"]));

        assert!(table.has_merged_cells());
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_cell_ids_and_boxes() {
        let mut table = Table::new();
        table.add_row(TableRow::new(vec![
            TableCell::text("a").with_bbox(BBox::new(0.0, 0.0, 10.0, 10.0)),
            TableCell::text("b"),
        ]));
        let item = TableItem::new("t1", BBox::new(0.0, 0.0, 20.0, 10.0), table);
        assert_eq!(item.cell_id(0, 1), "t1:0:1");
        assert_eq!(item.cell_boxes().count(), 1);
    }
}
