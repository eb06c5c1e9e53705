mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use topoflow::DeployError;
use topoflow_config::CONFIG_ENV;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "topo")]
#[command(about = "Deploy a microservice topology to ECS", long_about = None)]
struct Cli {
    /// Settings file (otherwise topoflow.yaml and friends are searched)
    #[arg(short, long, global = true, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and push every service image, then create the stack
    Deploy {
        /// Request JSON file, or - for stdin
        request: String,
    },
    /// Print the deployment template without building anything
    Synth {
        /// Request JSON file, or - for stdin
        request: String,
        /// Registry host used for the predicted image URIs
        #[arg(long)]
        registry: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
    },
    /// Check a request and list its services
    Validate {
        /// Request JSON file, or - for stdin
        request: String,
    },
    /// Show version
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Format {
    Yaml,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the JSON response and the template
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let result = match cli.command {
        Commands::Version => {
            println!("topoflow {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Validate { request } => commands::validate::handle(&request),
        Commands::Synth {
            request,
            registry,
            format,
        } => commands::synth::handle(cli.config.as_deref(), &request, registry, format),
        Commands::Deploy { request } => {
            commands::deploy::handle(cli.config.as_deref(), &request).await
        }
    };

    if let Err(err) = result {
        report(&err);
        std::process::exit(err.kind().exit_code());
    }

    Ok(())
}

fn report(err: &DeployError) {
    eprintln!();
    eprintln!("{}", "✗ Deployment failed".red().bold());
    for line in err.user_message().lines() {
        eprintln!("  {}", line);
    }

    // build errors already spell out their cause
    if matches!(err, DeployError::Publish(_)) {
        return;
    }
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        eprintln!("  {} {}", "caused by:".dimmed(), cause);
        source = cause.source();
    }
}
