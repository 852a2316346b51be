use std::process::ExitCode;

use anyhow::Context;
use delta_core::{output::GitHubOutput, DeltaConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn execute() -> anyhow::Result<()> {
    let config = DeltaConfig::from_env().context("failed to load inputs")?;
    info!(
        repository = %config.repository,
        commit = %config.current,
        mode = ?config.mode,
        "starting delta resolution"
    );

    let result = delta_core::run(&config).context("delta resolution failed")?;
    GitHubOutput::from_config(&config)
        .publish(&result, config.path_depth)
        .context("failed to publish outputs")?;
    Ok(())
}
