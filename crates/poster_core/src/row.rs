use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::queue::{
    Queue, COL_CAPTION, COL_CATEGORY, COL_DATE, COL_ERROR, COL_FILENAME, COL_IMAGE_URL,
    COL_MEDIA_ID, COL_POSTED, COL_POSTED_AT, COL_TO_POST,
};
use crate::{normalize_caption, Flag};

/// Typed, read-only view of one queue record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueRow {
    /// Zero-based position in the queue file.
    pub index: usize,
    /// Raw `date` cell, kept for operator output.
    pub date_text: String,
    /// `None` when the cell is blank, missing or malformed.
    pub scheduled_date: Option<NaiveDate>,
    /// `image_url` when non-blank, otherwise `filename`.
    pub image_source: Option<String>,
    /// `None` only when the queue has no `Category` column.
    pub category: Option<String>,
    pub caption: String,
    pub posted: Flag,
    /// `None` when the `_to_post` column is absent or the cell is blank.
    pub to_post: Option<Flag>,
    pub posted_at: Option<String>,
    pub media_id: Option<String>,
    pub error: Option<String>,
}

impl QueueRow {
    pub(crate) fn from_queue(queue: &Queue, index: usize) -> Self {
        assert!(index < queue.len(), "row {index} out of bounds");
        let text = |col: &str| queue.cell(index, col).unwrap_or("").trim().to_string();
        let non_blank = |col: &str| Some(text(col)).filter(|v| !v.is_empty());

        let date_text = text(COL_DATE);
        Self {
            index,
            scheduled_date: parse_schedule_date(&date_text),
            date_text,
            image_source: non_blank(COL_IMAGE_URL).or_else(|| non_blank(COL_FILENAME)),
            category: queue
                .has_column(COL_CATEGORY)
                .then(|| text(COL_CATEGORY)),
            caption: normalize_caption(queue.cell(index, COL_CAPTION).unwrap_or("")),
            posted: Flag::parse(queue.cell(index, COL_POSTED).unwrap_or("")),
            to_post: non_blank(COL_TO_POST).map(|v| Flag::parse(&v)),
            posted_at: non_blank(COL_POSTED_AT),
            media_id: non_blank(COL_MEDIA_ID),
            error: non_blank(COL_ERROR),
        }
    }

    /// Whether this row may be selected for publishing.
    ///
    /// A truthy `posted` always excludes the row. An explicit falsy
    /// `_to_post` excludes it as well without marking it posted.
    pub fn is_eligible(&self) -> bool {
        !self.posted.is_truthy() && self.to_post != Some(Flag::Falsy)
    }
}

/// Tried in order. Slash dates with the year last read month-first, falling
/// back to day-first only when the month-first reading is impossible.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z"];

/// Parse a schedule cell. Blank or unrecognised text yields `None`.
///
/// Datetimes with an offset keep the calendar date as written.
pub fn parse_schedule_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .or_else(|| {
                    OFFSET_FORMATS
                        .iter()
                        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
                })
                .map(|dt| dt.date_naive())
        })
}
