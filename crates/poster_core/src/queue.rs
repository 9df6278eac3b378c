use thiserror::Error;

use crate::row::QueueRow;

pub const COL_DATE: &str = "date";
pub const COL_IMAGE_URL: &str = "image_url";
pub const COL_FILENAME: &str = "filename";
pub const COL_CATEGORY: &str = "Category";
pub const COL_CAPTION: &str = "caption";
pub const COL_POSTED: &str = "posted";
pub const COL_POSTED_AT: &str = "posted_at";
pub const COL_MEDIA_ID: &str = "instagram_media_id";
pub const COL_ERROR: &str = "error";
pub const COL_TO_POST: &str = "_to_post";

/// Value written to `posted` once a row has been published.
pub const POSTED_TRUE: &str = "TRUE";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("queue has no image column (expected `{COL_IMAGE_URL}` or `{COL_FILENAME}`)")]
    MissingImageColumn,
    #[error("record {record} has {found} fields but the header has {expected}")]
    RaggedRecord {
        record: usize,
        expected: usize,
        found: usize,
    },
}

/// The queue table: a header plus one record per row, in file order.
///
/// Cells are kept as raw strings so columns the poster does not understand
/// survive a load/save cycle untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queue {
    columns: Vec<String>,
    records: Vec<Vec<String>>,
}

impl Queue {
    /// Build a queue from a parsed header and records.
    ///
    /// Header names are kept as written and matched ignoring surrounding
    /// whitespace. Short records are padded with empty cells. `posted` and
    /// `caption` are added when missing; an image column is required.
    pub fn new(columns: Vec<String>, records: Vec<Vec<String>>) -> Result<Self, SchemaError> {
        let width = columns.len();

        let mut padded = Vec::with_capacity(records.len());
        for (record, mut cells) in records.into_iter().enumerate() {
            if cells.len() > width {
                return Err(SchemaError::RaggedRecord {
                    record: record + 1,
                    expected: width,
                    found: cells.len(),
                });
            }
            cells.resize(width, String::new());
            padded.push(cells);
        }

        let mut queue = Self {
            columns,
            records: padded,
        };
        if !queue.has_column(COL_IMAGE_URL) && !queue.has_column(COL_FILENAME) {
            return Err(SchemaError::MissingImageColumn);
        }
        queue.ensure_column(COL_POSTED);
        queue.ensure_column(COL_CAPTION);
        Ok(queue)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Vec<String>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Raw cell value, or `None` when the column or row does not exist.
    pub fn cell(&self, index: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.records
            .get(index)
            .and_then(|cells| cells.get(col))
            .map(String::as_str)
    }

    /// Overwrite a cell, appending the column to the header when absent.
    pub fn set_cell(&mut self, index: usize, column: &str, value: impl Into<String>) {
        if index >= self.records.len() {
            return;
        }
        let col = self.ensure_column(column);
        self.records[index][col] = value.into();
    }

    /// Typed snapshot of one record.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn row(&self, index: usize) -> QueueRow {
        QueueRow::from_queue(self, index)
    }

    /// Typed snapshots of every record, in file order.
    pub fn rows(&self) -> Vec<QueueRow> {
        (0..self.records.len()).map(|i| self.row(i)).collect()
    }

    pub fn record_success(&mut self, index: usize, media_id: &str, posted_at: &str) {
        self.set_cell(index, COL_POSTED, POSTED_TRUE);
        self.set_cell(index, COL_POSTED_AT, posted_at);
        self.set_cell(index, COL_MEDIA_ID, media_id);
        if self.has_column(COL_ERROR) {
            self.set_cell(index, COL_ERROR, "");
        }
    }

    /// Store a failure message. `posted` is left as it was.
    pub fn record_failure(&mut self, index: usize, message: &str) {
        self.set_cell(index, COL_ERROR, crate::truncate_error(message));
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.trim() == name)
    }

    fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for cells in &mut self.records {
            cells.push(String::new());
        }
        self.columns.len() - 1
    }
}
