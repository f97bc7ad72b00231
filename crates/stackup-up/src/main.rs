use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use stackup_core::{EphemeralPorts, Environment, LocalCloud, ManagedService};
use stackup_model::StackConfig;
use stackup_observe::{LoggerConfig, LoggerLevel, init_local_offset, init_logger};

/// Run a local scheduler, artifact registry and control plane until Ctrl-C.
#[derive(Debug, Parser)]
#[command(name = "stackup", version)]
struct Args {
    /// JSON stack configuration; defaults apply when omitted.
    #[arg(long, env = "STACKUP_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `stackup_core=debug,info`.
    #[arg(long, env = "STACKUP_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// `text`, `json` or `journald`.
    #[arg(long, env = "STACKUP_LOG_FORMAT", default_value = "text")]
    log_format: String,

    /// `utc` or `local`.
    #[arg(long, env = "STACKUP_LOG_TZ", default_value = "utc")]
    log_tz: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Local offset detection only works before worker threads exist.
    init_local_offset();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(args))
}

async fn run(args: Args) -> anyhow::Result<()> {
    // 1) logger
    let cfg = LoggerConfig {
        format: args.log_format.parse()?,
        level: LoggerLevel::new(args.log_level)?,
        tz: args.log_tz.parse()?,
        ..Default::default()
    };
    init_logger(&cfg)?;
    info!("logger initialized");

    // 2) stack config
    let config = match &args.config {
        Some(path) => StackConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => StackConfig::default(),
    };

    // 3) Ctrl-C; also aborts a startup still waiting on readiness
    let shutdown = CancellationToken::new();
    tokio::spawn(watch_ctrl_c(shutdown.clone()));

    // 4) environment
    let started = LocalCloud::start_with(config, Arc::new(EphemeralPorts), shutdown.clone()).await;
    let mut cloud = match started {
        Ok(cloud) => cloud,
        Err(failure) => {
            let (error, mut partial) = failure.into_parts();
            if let Err(e) = partial.teardown().await {
                warn!(error = %e, "teardown after failed startup was incomplete");
            }
            return Err(error).context("environment startup failed");
        }
    };
    if let Some(s) = cloud.scheduler() {
        info!(service = s.name(), endpoint = %s.endpoint(), "listening");
    }
    if let Some(s) = cloud.registry() {
        info!(service = s.name(), endpoint = %s.endpoint(), cache = ?s.cache_dir(), "listening");
    }
    if let Some(s) = cloud.control_plane() {
        info!(service = s.name(), endpoint = %s.endpoint(), "listening");
    }

    // 5) wait for Ctrl-C
    shutdown.cancelled().await;
    info!("shutting down");

    // 6) teardown
    cloud.teardown().await?;
    info!("environment torn down");
    Ok(())
}

async fn watch_ctrl_c(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C, shutting down");
    }
    shutdown.cancel();
}
