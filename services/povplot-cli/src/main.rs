//! Command-line mesh renderer.
//!
//! Reads a mesh from JSON, renders it through POV-Ray and writes a PNG or
//! JPEG, optionally with a colorbar. Exit codes follow the error category:
//! 2 for bad input, 3 for renderer failures, 4 for unreadable renderer output
//! and 1 for anything else.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use povplot::{PlotError, RendererConfig};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use commands::{RenderArgs, SceneArgs};

#[derive(Parser, Debug)]
#[command(name = "povplot")]
#[command(about = "Render triangle meshes through POV-Ray")]
struct Cli {
    /// Renderer configuration file (YAML)
    #[arg(long, env = "POVPLOT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// POV-Ray binary, overriding the configuration
    #[arg(long, env = "POVPLOT_POVRAY", global = true)]
    povray: Option<PathBuf>,

    /// Per-process timeout in seconds, overriding the configuration
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Log level
    #[arg(long, env = "POVPLOT_LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a mesh JSON file
    Render(RenderArgs),
    /// Render a POV-Ray scene file as-is
    Scene(SceneArgs),
    /// List the available colormaps
    Colormaps {
        /// Extra JSON colormap files to load first
        #[arg(long = "colormap-file")]
        colormap_files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(err) = init_logging(&cli.log_level, cli.json_logs) {
        eprintln!("Failed to initialize logging: {}", err);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = exit_code(&err);
            error!(error = %format!("{:#}", err), exit_code = code, "Command failed");
            eprintln!("Error: {:#}", err);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = renderer_config(&cli)?;
    match cli.command {
        Command::Render(args) => commands::render(config, args).await,
        Command::Scene(args) => commands::scene(config, args).await,
        Command::Colormaps { colormap_files } => commands::list_colormaps(&colormap_files),
    }
}

fn init_logging(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Configuration file (or environment defaults), then command-line overrides.
fn renderer_config(cli: &Cli) -> Result<RendererConfig> {
    let mut config = match &cli.config {
        Some(path) => RendererConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load renderer config {}", path.display()))?,
        None => RendererConfig::from_env(),
    };
    if let Some(program) = &cli.povray {
        config.program = program.clone();
    }
    if let Some(secs) = cli.timeout_secs {
        config.timeout_secs = secs;
    }
    config.validate()?;
    Ok(config)
}

fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<PlotError>())
        .map(|plot_err| plot_err.exit_code())
        .or_else(|| {
            err.chain()
                .any(|cause| cause.downcast_ref::<povplot::InputError>().is_some())
                .then_some(2)
        })
        .unwrap_or(1) as u8
}
