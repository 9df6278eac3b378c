use crate::{QueueRow, RunSummary};

/// I/O requested by [`crate::update`]; the engine carries it out and reports
/// back with a [`crate::Msg`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Publish the image and caption of this row.
    Publish { row: QueueRow },
    /// Write the queue back to disk.
    Persist,
    /// The run is over.
    Finished(RunSummary),
}
