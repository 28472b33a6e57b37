use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use devdigest::pipeline::PipelineMode;

/// Parse a date argument in YYYY-MM-DD form
fn parse_date(s: &str) -> Result<chrono::NaiveDate, String> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}'. Expected YYYY-MM-DD", s))
}

/// Parse pipeline mode from string
fn parse_mode(s: &str) -> Result<PipelineMode, String> {
    s.parse()
}

#[derive(Parser)]
#[command(name = "devdigest")]
#[command(
    version,
    about = "AI-driven weekly digest generator for developer activity"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a weekly digest from an activity file
    Run {
        #[arg(help = "Activity JSON file (commits, pull_requests, notes)")]
        input: PathBuf,
        #[arg(long, value_parser = parse_date, help = "Range start, YYYY-MM-DD (default: 6 days before --to)")]
        from: Option<chrono::NaiveDate>,
        #[arg(long, value_parser = parse_date, help = "Range end, YYYY-MM-DD (default: today)")]
        to: Option<chrono::NaiveDate>,
        #[arg(long, value_parser = parse_mode, help = "Pipeline mode: detailed, optimized")]
        mode: Option<PipelineMode>,
        #[arg(long, help = "Provider override (openai, ollama)")]
        provider: Option<String>,
        #[arg(long, help = "Model override")]
        model: Option<String>,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize project configuration
    Init,
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Run {
            input,
            from,
            to,
            mode,
            provider,
            model,
            format,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(devdigest::cli::commands::digest::run(
                devdigest::cli::commands::digest::DigestOptions {
                    input,
                    from,
                    to,
                    mode,
                    provider,
                    model,
                    format,
                },
            ))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                devdigest::cli::commands::config::show(&format)?;
            }
            ConfigAction::Path => {
                devdigest::cli::commands::config::path()?;
            }
            ConfigAction::Init => {
                devdigest::cli::commands::config::init_project()?;
            }
        },
    }

    Ok(())
}
