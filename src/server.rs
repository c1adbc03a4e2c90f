//! HTTP server bootstrap: bind, accept loop, graceful shutdown.
//!
//! The accept loop stops first on a shutdown signal; in-flight connections
//! then get a grace period to finish before being forced closed.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::pipeline::{handle, PipelineState};

/// How long in-flight connections are given to finish after the accept loop
/// stops.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Bind `addr` and serve until `shutdown` resolves, then drain in-flight
/// connections for up to [`SHUTDOWN_GRACE`].
pub async fn serve(
    addr: SocketAddr,
    state: Arc<PipelineState>,
    shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    serve_listener(listener, state, shutdown).await
}

/// Same as [`serve`] but over an already-bound listener, so callers (tests,
/// mainly) can bind to an ephemeral port and learn the real address first.
pub async fn serve_listener(
    listener: TcpListener,
    state: Arc<PipelineState>,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let mut connections = tokio::task::JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                let io = TokioIo::new(stream);
                let state = Arc::clone(&state);

                connections.spawn(async move {
                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move {
                            Ok::<_, Infallible>(handle(&state, req, peer).await)
                        }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        tracing::debug!(%err, "connection error");
                    }
                });
            }
            _ = shutdown.changed() => {
                tracing::info!("shutdown signal received, accept loop stopping");
                break;
            }
        }
    }

    drop(listener);

    let drain = async {
        while connections.join_next().await.is_some() {}
    };
    if tokio::time::timeout(SHUTDOWN_GRACE, drain).await.is_err() {
        tracing::warn!("grace period elapsed with connections still in flight, aborting them");
        connections.shutdown().await;
    }

    Ok(())
}
