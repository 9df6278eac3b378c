mod app;
mod cli;
mod config;
mod logging;

use clap::Parser;

use crate::cli::Args;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::initialize(args.log, args.verbose);

    let config = config::resolve(&args, |name| std::env::var(name).ok())?;
    let summary = app::run(config).await?;

    println!(
        "selected: {}, succeeded: {}, failed: {}",
        summary.selected, summary.succeeded, summary.failed
    );
    Ok(())
}
