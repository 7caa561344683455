//! prefopt CLI - Direct Preference Optimization loss calculator.

mod config;
mod report;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::config::DemoConfig;
use crate::report::ExampleReport;

#[derive(Parser)]
#[command(name = "prefopt")]
#[command(author, version, about = "Direct Preference Optimization loss calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk through the DPO loss step by step (defaults to the worked example)
    Example {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Compute the DPO loss for one preference pair
    Loss {
        #[command(flatten)]
        input: InputArgs,

        /// Print every intermediate value as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Inputs shared by every subcommand. Flags override values from `--config`.
#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Temperature (beta)
    #[arg(short, long, allow_negative_numbers = true)]
    beta: Option<f64>,

    /// Policy log prob of the chosen response
    #[arg(long, allow_negative_numbers = true)]
    policy_chosen: Option<f64>,

    /// Reference log prob of the chosen response
    #[arg(long, allow_negative_numbers = true)]
    ref_chosen: Option<f64>,

    /// Policy log prob of the rejected response
    #[arg(long, allow_negative_numbers = true)]
    policy_rejected: Option<f64>,

    /// Reference log prob of the rejected response
    #[arg(long, allow_negative_numbers = true)]
    ref_rejected: Option<f64>,
}

impl InputArgs {
    /// Load the config file (if any) and apply command-line overrides.
    fn resolve(&self) -> anyhow::Result<DemoConfig> {
        let mut config = match self.config {
            Some(ref path) => DemoConfig::from_file(path)?,
            None => DemoConfig::default(),
        };

        if let Some(beta) = self.beta {
            config.dpo.beta = beta;
        }
        if let Some(v) = self.policy_chosen {
            config.sample.policy_chosen = v;
        }
        if let Some(v) = self.ref_chosen {
            config.sample.ref_chosen = v;
        }
        if let Some(v) = self.policy_rejected {
            config.sample.policy_rejected = v;
        }
        if let Some(v) = self.ref_rejected {
            config.sample.ref_rejected = v;
        }

        tracing::debug!(?config, "Resolved inputs");
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    println!("{}", run(cli.command)?);
    Ok(())
}

fn run(command: Commands) -> anyhow::Result<String> {
    match command {
        Commands::Example { input } => {
            let config = input.resolve()?;
            let breakdown = config.dpo.breakdown(&config.sample)?;
            Ok(ExampleReport::new(config.sample, breakdown).to_string())
        }
        Commands::Loss { input, json } => {
            let config = input.resolve()?;
            let breakdown = config.dpo.breakdown(&config.sample)?;
            if json {
                serde_json::to_string_pretty(&breakdown).context("Failed to serialize breakdown")
            } else {
                Ok(format!("{:.4}", breakdown.loss))
            }
        }
    }
}
