//! Poster core: queue model, row selection and the pure run state machine.
mod effect;
mod flag;
mod msg;
mod queue;
mod row;
mod select;
mod state;
mod text;
mod update;

pub use effect::Effect;
pub use flag::Flag;
pub use msg::Msg;
pub use queue::{
    Queue, SchemaError, COL_CAPTION, COL_CATEGORY, COL_DATE, COL_ERROR, COL_FILENAME,
    COL_IMAGE_URL, COL_MEDIA_ID, COL_POSTED, COL_POSTED_AT, COL_TO_POST, POSTED_TRUE,
};
pub use row::{parse_schedule_date, QueueRow};
pub use select::{select_candidates, Selection, SelectionMode};
pub use state::{Phase, RunState, RunSummary};
pub use text::{normalize_caption, truncate_error, CAPTION_LIMIT, ERROR_LIMIT};
pub use update::update;
