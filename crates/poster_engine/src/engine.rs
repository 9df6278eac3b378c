use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use engine_logging::{engine_error, engine_info};
use poster_core::{update, Effect, Msg, QueueRow, RunState, RunSummary, Selection};
use thiserror::Error;

use crate::{ImageSource, PublishError, Publisher, QueueStore, StoreError};

/// Source of "now" for schedule comparisons and `posted_at` stamps.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

#[derive(Clone)]
pub struct EngineConfig {
    /// Directory that relative image filenames are resolved against.
    pub images_dir: PathBuf,
    /// Pause after each successful publish before the next candidate.
    pub post_pause: Duration,
    pub now: Clock,
}

impl EngineConfig {
    pub fn new(images_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
            post_pause: Duration::from_secs(2),
            now: Arc::new(|| Local::now().naive_local()),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("authentication failed: {0}")]
    Authentication(#[source] PublishError),
}

/// `posted_at` format: local time, second precision.
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Executes the effects of [`poster_core::update`] one at a time.
pub struct RunEngine {
    config: EngineConfig,
}

impl RunEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Load the queue, publish the selected rows in order and persist after
    /// every attempt.
    ///
    /// Only loading, saving and the publisher's one-time setup can fail the
    /// run; per-row failures are written to the row's `error` column.
    pub async fn run(
        &self,
        store: &mut QueueStore,
        publisher: &dyn Publisher,
        selection: Selection,
    ) -> Result<RunSummary, EngineError> {
        let queue = store.load()?;
        let today = (self.config.now)().date();

        let (mut state, effects) = update(RunState::new(queue, selection), Msg::Start { today });
        let selected = state.summary().selected;
        if selected == 0 {
            engine_info!("No rows to post. Either all are posted already or filters removed them.");
        } else {
            engine_info!("Found {} post(s) to process", selected);
        }

        let mut inbox: VecDeque<Effect> = effects.into();
        let mut prepared = false;
        while let Some(effect) = inbox.pop_front() {
            let msg = match effect {
                Effect::Publish { row } => {
                    let _row_ctx = engine_logging::enter_row(row.index + 1);
                    if !prepared {
                        publisher
                            .prepare()
                            .await
                            .map_err(EngineError::Authentication)?;
                        prepared = true;
                    }
                    self.publish_row(publisher, &row).await
                }
                Effect::Persist => {
                    store.save(state.queue())?;
                    Msg::Persisted
                }
                Effect::Finished(summary) => {
                    engine_info!(
                        "Done. Published {} of {} selected post(s); {} failed",
                        summary.succeeded,
                        summary.selected,
                        summary.failed
                    );
                    return Ok(summary);
                }
            };
            let (next, effects) = update(state, msg);
            state = next;
            inbox.extend(effects);
        }
        Ok(state.summary())
    }

    async fn publish_row(&self, publisher: &dyn Publisher, row: &QueueRow) -> Msg {
        let source = match ImageSource::from_row(row, &self.config.images_dir) {
            Ok(source) => source,
            Err(err) => {
                engine_error!("Skipping row: {}", err);
                return Msg::PublishFailed {
                    row: row.index,
                    message: err.to_string(),
                };
            }
        };

        engine_info!("Posting {} (date={})", source, row.date_text);
        engine_info!("Caption: {}", caption_preview(&row.caption));

        match publisher.publish(&source, &row.caption).await {
            Ok(media_id) => {
                engine_info!("Posted as media {}", media_id);
                if !self.config.post_pause.is_zero() {
                    tokio::time::sleep(self.config.post_pause).await;
                }
                Msg::PublishSucceeded {
                    row: row.index,
                    media_id,
                    posted_at: format_timestamp((self.config.now)()),
                }
            }
            Err(err) => {
                engine_error!("Posting failed: {}", err);
                Msg::PublishFailed {
                    row: row.index,
                    message: err.to_string(),
                }
            }
        }
    }
}

fn caption_preview(caption: &str) -> String {
    const PREVIEW_CHARS: usize = 80;
    match caption.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &caption[..idx]),
        None => caption.to_string(),
    }
}
