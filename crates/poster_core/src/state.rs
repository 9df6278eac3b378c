use std::collections::VecDeque;

use crate::{Queue, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Selecting,
    Publishing { row: usize },
    Recording { row: usize },
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub selected: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// One run over a loaded queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    pub(crate) queue: Queue,
    pub(crate) selection: Selection,
    pub(crate) phase: Phase,
    pub(crate) pending: VecDeque<usize>,
    pub(crate) summary: RunSummary,
}

impl RunState {
    pub fn new(queue: Queue, selection: Selection) -> Self {
        Self {
            queue,
            selection,
            phase: Phase::Idle,
            pending: VecDeque::new(),
            summary: RunSummary::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    pub fn into_queue(self) -> Queue {
        self.queue
    }
}
