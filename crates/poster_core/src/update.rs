use crate::{select_candidates, Effect, Msg, Phase, RunState};

/// Pure update function: applies a message to the run and returns any effects.
///
/// Messages that do not fit the current phase (a second `Start`, a result for
/// a row that is not being published) are ignored.
pub fn update(mut state: RunState, msg: Msg) -> (RunState, Vec<Effect>) {
    let effects = match msg {
        Msg::Start { today } => {
            if state.phase != Phase::Idle {
                return (state, Vec::new());
            }
            state.phase = Phase::Selecting;
            let rows = state.queue.rows();
            let candidates = select_candidates(&rows, &state.selection, today);
            state.summary.selected = candidates.len();
            state.pending = candidates.into();
            advance(&mut state)
        }
        Msg::PublishSucceeded {
            row,
            media_id,
            posted_at,
        } => {
            if state.phase != (Phase::Publishing { row }) {
                return (state, Vec::new());
            }
            let media_id = media_id.trim();
            if media_id.is_empty() {
                // A posted row must always carry its media id.
                state
                    .queue
                    .record_failure(row, "platform returned an empty media id");
                state.summary.failed += 1;
            } else {
                state.queue.record_success(row, media_id, &posted_at);
                state.summary.succeeded += 1;
            }
            state.phase = Phase::Recording { row };
            vec![Effect::Persist]
        }
        Msg::PublishFailed { row, message } => {
            if state.phase != (Phase::Publishing { row }) {
                return (state, Vec::new());
            }
            state.queue.record_failure(row, &message);
            state.summary.failed += 1;
            state.phase = Phase::Recording { row };
            vec![Effect::Persist]
        }
        Msg::Persisted => match state.phase {
            Phase::Recording { .. } => advance(&mut state),
            _ => Vec::new(),
        },
    };

    (state, effects)
}

fn advance(state: &mut RunState) -> Vec<Effect> {
    match state.pending.pop_front() {
        Some(row) => {
            state.phase = Phase::Publishing { row };
            vec![Effect::Publish {
                row: state.queue.row(row),
            }]
        }
        None => {
            state.phase = Phase::Done;
            vec![Effect::Finished(state.summary)]
        }
    }
}
