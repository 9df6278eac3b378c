use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Begin the run; rows are ranked against `today`.
    Start { today: NaiveDate },
    /// The platform accepted the row's post.
    PublishSucceeded {
        row: usize,
        media_id: String,
        posted_at: String,
    },
    /// Publishing the row failed; `message` is stored on the row.
    PublishFailed { row: usize, message: String },
    /// The queue was written after the last attempt.
    Persisted,
}
