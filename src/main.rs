//! Binary entry point: parse the command surface, load configuration, and
//! wire the rule store into the server and optional watcher.
//!
//! Builds the tokio runtime manually and wraps the async body in a single
//! `block_on` rather than `#[tokio::main]`, so startup failures (e.g. a
//! runtime that fails to build at all) can return a clean exit code before
//! any async code ever runs.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use popshop::cli::{Cli, Commands};
use popshop::config::load_path;
use popshop::middleware::MiddlewareConfig;
use popshop::pipeline::PipelineState;
use popshop::store::RuleStore;
use popshop::{logging, server, watch};
use tokio::sync::watch as watch_channel;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("failed to start async runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Validate { config_path } => {
            let rules = load_path(&config_path)?;
            println!(
                "valid: {} rules ({} mock, {} proxy)",
                rules.len(),
                rules.mock_count(),
                rules.proxy_count()
            );
            Ok(())
        }
        Commands::Serve {
            config_path,
            port,
            host,
            watch: should_watch,
            max_request_size,
        } => {
            let rules = load_path(&config_path)?;
            tracing::info!(count = rules.len(), "loaded rules");
            let store = Arc::new(RuleStore::new(rules));

            let middleware_config = MiddlewareConfig {
                max_request_size,
                ..MiddlewareConfig::default()
            };

            let state = Arc::new(PipelineState::new(Arc::clone(&store), middleware_config));

            let (shutdown_tx, shutdown_rx) = watch_channel::channel(false);
            tokio::spawn(async move {
                let _ = tokio::signal::ctrl_c().await;
                let _ = shutdown_tx.send(true);
            });

            if should_watch {
                let watch_path = config_path.clone();
                let watch_store = Arc::clone(&store);
                tokio::spawn(async move {
                    if let Err(err) = watch::watch(watch_path, watch_store).await {
                        tracing::error!(%err, "config watcher stopped");
                    }
                });
            }

            let addr: SocketAddr = format!("{host}:{port}").parse()?;
            server::serve(addr, state, shutdown_rx).await
        }
    }
}
