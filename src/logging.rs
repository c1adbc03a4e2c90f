//! Tracing initialization. `RUST_LOG` is the one knob; no `--loglevel` or
//! `--debug` flag duplicates it on the CLI surface.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}
