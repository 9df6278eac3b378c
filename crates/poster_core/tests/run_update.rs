use chrono::NaiveDate;
use poster_core::{
    update, Effect, Msg, Phase, Queue, RunState, RunSummary, Selection, SelectionMode,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn queue(rows: &[(&str, &str)]) -> Queue {
    Queue::new(
        vec!["image_url".to_string(), "posted".to_string()],
        rows.iter()
            .map(|(image, posted)| vec![image.to_string(), posted.to_string()])
            .collect(),
    )
    .unwrap()
}

fn all_mode() -> Selection {
    Selection {
        mode: SelectionMode::All,
        ..Selection::default()
    }
}

fn published_row(effects: &[Effect]) -> usize {
    match effects {
        [Effect::Publish { row }] => row.index,
        other => panic!("expected a single publish effect, got {other:?}"),
    }
}

#[test]
fn start_with_nothing_eligible_finishes_immediately() {
    let state = RunState::new(queue(&[("a.jpg", "TRUE")]), all_mode());

    let (state, effects) = update(state, Msg::Start { today: today() });

    assert_eq!(state.phase(), Phase::Done);
    assert_eq!(effects, vec![Effect::Finished(RunSummary::default())]);
}

#[test]
fn each_attempt_is_persisted_before_the_next_publish() {
    let state = RunState::new(queue(&[("a.jpg", ""), ("b.jpg", "")]), all_mode());

    let (state, effects) = update(state, Msg::Start { today: today() });
    assert_eq!(published_row(&effects), 0);
    assert_eq!(state.phase(), Phase::Publishing { row: 0 });

    let (state, effects) = update(
        state,
        Msg::PublishFailed {
            row: 0,
            message: "status 400".to_string(),
        },
    );
    assert_eq!(effects, vec![Effect::Persist]);
    assert_eq!(state.phase(), Phase::Recording { row: 0 });

    let (state, effects) = update(state, Msg::Persisted);
    assert_eq!(published_row(&effects), 1);

    let (state, effects) = update(
        state,
        Msg::PublishSucceeded {
            row: 1,
            media_id: "42".to_string(),
            posted_at: "2026-10-19T10:00:00".to_string(),
        },
    );
    assert_eq!(effects, vec![Effect::Persist]);

    let (state, effects) = update(state, Msg::Persisted);
    let summary = RunSummary {
        selected: 2,
        succeeded: 1,
        failed: 1,
    };
    assert_eq!(effects, vec![Effect::Finished(summary)]);
    assert_eq!(state.phase(), Phase::Done);

    let rows = state.queue().rows();
    assert!(!rows[0].posted.is_truthy());
    assert_eq!(rows[0].error.as_deref(), Some("status 400"));
    assert!(rows[1].posted.is_truthy());
    assert_eq!(rows[1].media_id.as_deref(), Some("42"));
}

#[test]
fn empty_media_id_is_recorded_as_failure() {
    let state = RunState::new(queue(&[("a.jpg", "")]), Selection::default());
    let (state, _) = update(state, Msg::Start { today: today() });

    let (state, effects) = update(
        state,
        Msg::PublishSucceeded {
            row: 0,
            media_id: "  ".to_string(),
            posted_at: "2026-10-19T10:00:00".to_string(),
        },
    );

    assert_eq!(effects, vec![Effect::Persist]);
    assert_eq!(state.summary().failed, 1);
    let row = state.queue().row(0);
    assert!(!row.posted.is_truthy());
    assert!(row.error.is_some());
}

#[test]
fn stale_messages_are_ignored() {
    let state = RunState::new(queue(&[("a.jpg", "")]), Selection::default());
    let (state, _) = update(state, Msg::Start { today: today() });
    let before = state.clone();

    let (state, effects) = update(
        state,
        Msg::PublishFailed {
            row: 5,
            message: "late".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);

    let (state, effects) = update(state, Msg::Persisted);
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::Start { today: today() });
    assert!(effects.is_empty());
    assert_eq!(state, before);
}
