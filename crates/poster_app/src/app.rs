use std::time::Duration;

use anyhow::Context;
use engine_logging::engine_info;
use poster_core::RunSummary;
use poster_engine::{
    DirectUploadPublisher, DryRunPublisher, EngineConfig, FileSessionStore, GraphPublisher,
    Publisher, QueueStore, RunEngine,
};

use crate::config::{BackendConfig, RunConfig};

/// Build the configured backend and run the queue once.
pub async fn run(config: RunConfig) -> anyhow::Result<RunSummary> {
    let publisher: Box<dyn Publisher> = match &config.backend {
        BackendConfig::DryRun => {
            engine_info!("Dry run: nothing will be uploaded");
            Box::new(DryRunPublisher)
        }
        BackendConfig::Graph(settings) => {
            engine_info!("Using graph backend for account {}", settings.account_id);
            Box::new(GraphPublisher::new(settings).context("cannot set up graph backend")?)
        }
        BackendConfig::Direct {
            settings,
            session_file,
        } => {
            engine_info!("Using direct upload backend as {}", settings.username);
            let sessions = Box::new(FileSessionStore::new(session_file.clone()));
            Box::new(
                DirectUploadPublisher::new(settings, sessions)
                    .context("cannot set up direct upload backend")?,
            )
        }
    };

    let mut engine_config = EngineConfig::new(config.images_dir.clone());
    if config.is_dry_run() {
        engine_config.post_pause = Duration::ZERO;
    }

    let mut store = QueueStore::new(config.csv.clone());
    let summary = RunEngine::new(engine_config)
        .run(&mut store, publisher.as_ref(), config.selection.clone())
        .await
        .with_context(|| format!("run over {} failed", config.csv.display()))?;
    Ok(summary)
}
