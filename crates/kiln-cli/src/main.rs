//! Kiln - MCP server bootstrapper
//!
//! Usage:
//!   kiln setup            # Clone, build and probe every declared server
//!   kiln check            # Verify git, node, npm and python are installed
//!   kiln classify <NAME>  # Show which MCP type a repository name maps to

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kiln_core::context::BootstrapContext;
use kiln_core::desktop::{DESKTOP_CONFIG_FILE, DesktopConfigAssembler, PublishOutcome, publish_desktop_config};
use kiln_core::mcp::classify;
use kiln_core::pipeline::{RunReport, SetupPipeline, prefetch_on_demand};
use kiln_core::prereq::check_prerequisites;
use kiln_core::process::DelayProbe;

#[derive(Parser)]
#[command(name = "kiln")]
#[command(about = "MCP server bootstrapper", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up every repository and write the desktop config
    Setup(SetupArgs),

    /// Check that the required external tools are installed
    Check,

    /// Print the MCP type for a repository name
    Classify {
        /// Repository name, e.g. mcp-trello
        name: String,
    },
}

#[derive(clap::Args)]
struct SetupArgs {
    /// Directory holding repositories.json, default.properties and .env
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,

    /// Where to write the desktop config
    #[arg(long, short, default_value = DESKTOP_CONFIG_FILE)]
    output: PathBuf,

    /// How long a server must stay up to count as healthy
    #[arg(long, default_value_t = 2000)]
    probe_delay_ms: u64,

    /// How long a probed server gets to exit after SIGTERM
    #[arg(long, default_value_t = 1000)]
    probe_grace_ms: u64,

    /// Do not check for git, node, npm and python first
    #[arg(long)]
    skip_prereq: bool,

    /// Install on-demand packages (brave-search) into the home directory
    #[arg(long)]
    prefetch: bool,

    /// Summary format
    #[arg(long, short, default_value = "table")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable lists
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kiln=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Setup(args) => run_setup(args).await?,
        Commands::Check => run_check().await?,
        Commands::Classify { name } => match classify(&name) {
            Some(kind) => println!("{kind}"),
            None => println!("none"),
        },
    }

    Ok(())
}

async fn run_check() -> Result<()> {
    let runner = kiln_core::process::SystemRunner::new();
    for tool in check_prerequisites(&runner).await? {
        println!("{:<8} {}", tool.name, tool.version);
    }
    Ok(())
}

async fn run_setup(args: SetupArgs) -> Result<()> {
    let ctx = BootstrapContext::new(args.config_dir, args.output).with_probe(DelayProbe::new(
        Duration::from_millis(args.probe_delay_ms),
        Duration::from_millis(args.probe_grace_ms),
    ));
    let runner = ctx.runner();

    if !args.skip_prereq {
        check_prerequisites(&runner).await?;
    }

    let config = ctx.config_loader().load();
    if config.is_empty() {
        println!("No repositories configured; nothing to do.");
        return Ok(());
    }
    let base_path = ctx.base_path(&config)?;
    tracing::info!(
        "Setting up {} repositories in {}",
        config.repositories.len(),
        base_path.display()
    );

    if args.prefetch {
        prefetch_on_demand(&runner, ctx.home_dir()).await;
    }

    let report = SetupPipeline::new(&config, &base_path, &runner, ctx.probe())
        .run()
        .await?;

    let assembler = DesktopConfigAssembler::new(&config, &base_path, ctx.home_dir());
    let published = publish_desktop_config(&report, &assembler, ctx.output_path())?;

    match args.format {
        OutputFormat::Table => print_report(&report, &published),
        OutputFormat::Json => print_report_json(&report, &published)?,
    }
    Ok(())
}

fn print_report(report: &RunReport, published: &PublishOutcome) {
    println!("\n=== Installed MCP servers ===");
    for name in &report.installed {
        println!("- {name}");
    }

    for (name, notes) in &report.notes {
        println!("\n=== {name} ===");
        for line in notes {
            println!("{line}");
        }
    }

    if !report.pending.is_empty() {
        println!("\n=== Waiting on manual steps ===");
        for (name, instructions) in &report.pending {
            println!("- {name}");
            for line in instructions {
                println!("    {line}");
            }
        }
    }

    if !report.failed.is_empty() {
        println!("\n=== Failed ===");
        for (name, error) in &report.failed {
            println!("- {name}: {error}");
        }
    }

    match published {
        PublishOutcome::Written(path) => {
            println!("\nWrote {}", path.display());
            println!("Copy it to the Claude Desktop configuration directory.");
        }
        PublishOutcome::Skipped { .. } => {
            println!("\nThe desktop config was not updated; fix the entries above and run again.");
        }
    }
}

fn print_report_json(report: &RunReport, published: &PublishOutcome) -> Result<()> {
    let written = match published {
        PublishOutcome::Written(path) => Some(path.display().to_string()),
        PublishOutcome::Skipped { .. } => None,
    };
    let failed: Vec<_> = report
        .failed
        .iter()
        .map(|(name, error)| serde_json::json!({ "name": name, "error": error }))
        .collect();
    let pending: Vec<_> = report
        .pending
        .iter()
        .map(|(name, instructions)| serde_json::json!({ "name": name, "instructions": instructions }))
        .collect();
    let summary = serde_json::json!({
        "installed": report.installed,
        "pending": pending,
        "failed": failed,
        "written": written,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
