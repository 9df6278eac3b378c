use chrono::NaiveDate;

use crate::QueueRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Every eligible row passing the filters, in file order.
    All,
    /// The earliest due row(s); see [`select_candidates`].
    #[default]
    NextScheduled,
}

/// Filter criteria for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub mode: SelectionMode,
    /// Upper bound for next-scheduled mode. All mode is not capped.
    pub limit: usize,
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            mode: SelectionMode::NextScheduled,
            limit: 1,
            category: None,
            start_date: None,
            end_date: None,
        }
    }
}

impl Selection {
    fn accepts(&self, row: &QueueRow) -> bool {
        if !row.is_eligible() {
            return false;
        }
        // Queues without a Category column are not filtered by category.
        if let (Some(wanted), Some(actual)) = (self.category.as_deref(), row.category.as_deref()) {
            if !actual.trim().eq_ignore_ascii_case(wanted.trim()) {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if row.scheduled_date.is_none_or(|d| d < start) {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if row.scheduled_date.is_none_or(|d| d > end) {
                return false;
            }
        }
        true
    }
}

/// Rank the rows to publish and return their queue indices.
///
/// Next-scheduled mode prefers the earliest date on or after `today`. When no
/// such row exists it falls back to the earliest date before `today`. When no
/// filtered row carries a date at all, file order is used. Equal dates keep
/// file order.
pub fn select_candidates(rows: &[QueueRow], selection: &Selection, today: NaiveDate) -> Vec<usize> {
    let filtered: Vec<&QueueRow> = rows.iter().filter(|row| selection.accepts(row)).collect();

    match selection.mode {
        SelectionMode::All => filtered.iter().map(|row| row.index).collect(),
        SelectionMode::NextScheduled => next_scheduled(&filtered, selection.limit, today),
    }
}

fn next_scheduled(filtered: &[&QueueRow], limit: usize, today: NaiveDate) -> Vec<usize> {
    let mut dated: Vec<(NaiveDate, usize)> = filtered
        .iter()
        .filter_map(|row| row.scheduled_date.map(|d| (d, row.index)))
        .collect();

    if dated.is_empty() {
        return filtered.iter().take(limit).map(|row| row.index).collect();
    }

    // Stable sort keeps file order among equal dates.
    dated.sort_by_key(|(date, _)| *date);

    let upcoming: Vec<usize> = dated
        .iter()
        .filter(|(date, _)| *date >= today)
        .take(limit)
        .map(|(_, index)| *index)
        .collect();
    if !upcoming.is_empty() {
        return upcoming;
    }

    dated
        .iter()
        .filter(|(date, _)| *date < today)
        .take(limit)
        .map(|(_, index)| *index)
        .collect()
}
