//! Command surface: `serve` and `validate`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "popshop")]
#[command(author, version, about = "Declarative HTTP mocking and forward-proxying server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server, loading rules from a file or directory.
    Serve {
        config_path: PathBuf,

        #[arg(long, default_value_t = 8080)]
        port: u16,

        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Watch `config_path` and hot-reload on change.
        #[arg(long)]
        watch: bool,

        #[arg(long, default_value_t = 1_048_576)]
        max_request_size: usize,
    },

    /// Parse `config_path` without starting the server.
    Validate { config_path: PathBuf },
}
