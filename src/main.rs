//! Entry point for the Quota Engine binary.
//!
//! Without a subcommand the binary starts the HTTP server.  The bind
//! address, rule table and log level come from the environment (see
//! `quota_engine::config`) and may be overridden with flags.  The
//! `compute` subcommand evaluates a single submission from a JSON file
//! and prints the result.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use quota_engine::api::QuotaResponse;
use quota_engine::config::AppConfig;
use quota_engine::intake::QuotaSubmission;
use quota_engine::rules::{load_rules, QuotaRules};
use quota_engine::{compute_quota, telemetry};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "quota_engine",
    about = "Foreign worker quota calculator for manufacturing employers",
    version
)]
struct Cli {
    /// JSON rule table overriding the statutory rates
    #[arg(long, global = true)]
    rules: Option<PathBuf>,
    /// Env file to load instead of `./.env`
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Compute the quota for a submission stored as JSON
    Compute(ComputeArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured bind address
    #[arg(long)]
    addr: Option<String>,
}

#[derive(Args, Debug)]
struct ComputeArgs {
    /// Path to a JSON submission
    #[arg(long, short)]
    input: PathBuf,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.env_file {
        Some(path) => AppConfig::from_env_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AppConfig::from_env(),
    };
    telemetry::init(&config.log_level)?;

    let rules_path = cli.rules.or(config.rules_path);
    match cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()))
    {
        Command::Serve(args) => {
            let addr = args.addr.unwrap_or(config.bind_addr);
            quota_engine::api::serve(&addr, rules_path.as_deref()).await
        }
        Command::Compute(args) => {
            let rules = match rules_path {
                Some(path) => load_rules(&path)?,
                None => QuotaRules::default(),
            };
            let data = std::fs::read_to_string(&args.input)
                .with_context(|| format!("reading {}", args.input.display()))?;
            let submission: QuotaSubmission = serde_json::from_str(&data)
                .with_context(|| format!("parsing {}", args.input.display()))?;
            let profile = submission.validate()?;
            let result = compute_quota(&profile, &rules);
            println!(
                "{}",
                serde_json::to_string_pretty(&QuotaResponse { profile, result })?
            );
            Ok(())
        }
    }
}
