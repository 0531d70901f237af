//! kakudev - KaKu/ELRO 433 MHz transmitter CLI
//!
//! Encodes command words, assembles them from trit strings and sends them
//! through a single-open transmitter device on a sysfs GPIO line.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use kaku_core::CommandWord;
use kaku_device::DeviceConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "kakudev=info,kaku_device=info";

#[derive(Debug, Parser)]
#[command(name = "kakudev")]
#[command(about = "KaKu/ELRO 433 MHz telegram encoder and transmitter")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    device: DeviceArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options that shape the device configuration.
#[derive(Debug, Default, Args)]
struct DeviceArgs {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output line number (overrides the configuration file)
    #[arg(long, global = true)]
    line: Option<u32>,

    /// Sysfs GPIO root (overrides the configuration file)
    #[arg(long, global = true)]
    gpio_root: Option<PathBuf>,

    /// Timing tolerance in microseconds (overrides the configuration file)
    #[arg(long, global = true)]
    tolerance_us: Option<u64>,
}

impl DeviceArgs {
    /// Load the configuration file, if any, and apply flag overrides.
    fn resolve(&self) -> Result<DeviceConfig> {
        let mut config = match &self.config {
            Some(path) => DeviceConfig::load(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => DeviceConfig::default(),
        };

        if let Some(line) = self.line {
            config.line = line;
        }
        if let Some(root) = &self.gpio_root {
            config.gpio_root.clone_from(root);
        }
        if let Some(tolerance_us) = self.tolerance_us {
            config.tolerance_us = tolerance_us;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Decode a command word and print its pulse schedule as JSON
    Encode {
        /// Command word, decimal or 0x hexadecimal
        word: CommandWord,
    },

    /// Assemble a command word from trits, period and repeat exponent
    Build {
        /// Twelve trits in transmit order (0, 1 or F)
        #[arg(long)]
        trits: String,

        /// Period unit in microseconds (0-511)
        #[arg(long, default_value_t = 350)]
        period_us: u32,

        /// Repeat exponent; the frame is sent 2^N times (0-7)
        #[arg(long, default_value_t = 3)]
        repeat_exp: u8,
    },

    /// Transmit one command word
    Send {
        /// Command word, decimal or 0x hexadecimal
        word: CommandWord,

        /// Drive an in-memory line instead of sysfs GPIO
        #[arg(long)]
        dry_run: bool,
    },

    /// Transmit 4-byte little-endian records read from stdin until EOF
    Serve {
        /// Drive an in-memory line instead of sysfs GPIO
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Encode { word } => commands::encode(word),
        Commands::Build {
            trits,
            period_us,
            repeat_exp,
        } => commands::build(&trits, period_us, repeat_exp),
        Commands::Send { word, dry_run } => {
            commands::send(cli.device.resolve()?, word, dry_run).await
        }
        Commands::Serve { dry_run } => commands::serve(cli.device.resolve()?, dry_run).await,
    }
}
