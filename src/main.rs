use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

use devdash::ui::TerminalRenderer;
use devdash::{Cli, Controller, Settings};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::from_cli(&cli).context("invalid configuration")?;
    let quit_key = settings.quit_key;

    let mut controller = Controller::new(settings);
    let mut renderer = TerminalRenderer::new(controller.shutdown(), quit_key);
    controller.run(&mut renderer).await?;
    Ok(())
}

// The dashboard owns stdout; diagnostics go to stderr and are only written
// while the terminal is in normal mode.
fn init_tracing() {
    let level = std::env::var("DEVDASH_LOG")
        .ok()
        .and_then(|value| value.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
