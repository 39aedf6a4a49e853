// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! InputRelay CLI
//!
//! Command-line front-end and consumer for the shared-memory input relay.
//! Each invocation is its own process, so two shells give a real
//! front-end/consumer pair over the same region.

use clap::{Parser, Subcommand, ValueEnum};
use inputrelay_core::RelayConfig;

mod commands;

use commands::CliError;

/// Relay - write and read low-latency input over shared memory
#[derive(Parser)]
#[command(name = "relay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (built-in defaults when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Shared region name, overriding the configuration
    #[arg(short, long)]
    pub region: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Pressed or released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Press {
    Down,
    Up,
}

impl Press {
    pub fn is_down(self) -> bool {
        self == Press::Down
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a relative mouse motion (dropped if the guard is busy)
    Mouse {
        #[arg(allow_negative_numbers = true)]
        dx: i32,
        #[arg(allow_negative_numbers = true)]
        dy: i32,
    },

    /// Set the mouse wheel value (dropped if the guard is busy)
    Wheel {
        #[arg(allow_negative_numbers = true)]
        value: i32,
    },

    /// Press or release a virtual key
    Key {
        /// Virtual key code (0-255)
        #[arg(allow_negative_numbers = true)]
        code: i32,
        state: Press,
    },

    /// Press or release a mouse button
    Button {
        /// Button index (0-31)
        #[arg(allow_negative_numbers = true)]
        index: i32,
        state: Press,
    },

    /// Set the frame-rate cap (non-integral or missing means no cap)
    Fps {
        #[arg(allow_hyphen_values = true)]
        value: Option<String>,
    },

    /// Publish the first character of TEXT as pending input
    Char {
        #[arg(allow_hyphen_values = true)]
        text: String,
    },

    /// Read all fields and reset the accumulated mouse motion
    Drain {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read all fields without resetting anything
    Snapshot {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Drain continuously until interrupted
    Watch {
        /// Drain interval in milliseconds
        #[arg(short, long, default_value_t = 16)]
        interval_ms: u64,

        /// Print every drain as a JSON line
        #[arg(long)]
        json: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: String,
    },

    /// Remove the shared region name from the system
    Unlink,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    // Dispatch to command handlers
    let result = match cli.command {
        Commands::Validate { file } => commands::validate::execute(&file).await,
        command => match commands::load_config(cli.config.as_deref(), cli.region.as_deref()) {
            Ok(config) => run(command, &config).await,
            Err(e) => Err(e),
        },
    };

    Ok(result?)
}

async fn run(command: Commands, config: &RelayConfig) -> Result<(), CliError> {
    match command {
        Commands::Mouse { dx, dy } => commands::input::mouse(config, dx, dy).await,
        Commands::Wheel { value } => commands::input::wheel(config, value).await,
        Commands::Key { code, state } => commands::input::key(config, code, state).await,
        Commands::Button { index, state } => commands::input::button(config, index, state).await,
        Commands::Fps { value } => commands::input::fps(config, value.as_deref()).await,
        Commands::Char { text } => commands::input::input_char(config, &text).await,
        Commands::Drain { json } => commands::read::execute(config, true, json).await,
        Commands::Snapshot { json } => commands::read::execute(config, false, json).await,
        Commands::Watch { interval_ms, json } => {
            commands::watch::execute(config, interval_ms, json).await
        }
        Commands::Unlink => commands::unlink::execute(config).await,
        Commands::Validate { file } => commands::validate::execute(&file).await,
    }
}
