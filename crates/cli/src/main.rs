//! issue-seeder CLI entry point.
//!
//! This binary is the composition root for the whole tool. Responsibilities:
//!
//! 1. **Parse the command surface** — catalog path, target repository,
//!    credential, mode flags.
//! 2. **Wire observability** — configure `tracing-subscriber` with an
//!    env-filter layer writing to stderr. All `tracing` events emitted by
//!    every crate in the workspace flow through this layer; a fresh
//!    [`seeder::RunId`] span correlates everything from one invocation.
//! 3. **Construct infrastructure** — build the [`github::GithubClient`] and
//!    inject it into the [`seeder::Materializer`].
//! 4. **Select the mode** — `--dry-run` (or the absence of `--create`)
//!    renders every catalog entry to stdout with an empty resolution map and
//!    performs zero remote calls; `--create` runs both passes for real.
//!
//! Exit codes: `0` success, `2` missing or invalid configuration (repository,
//! credential, catalog), `1` any remote-call failure during the create path.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, info_span, Instrument};
use tracing_subscriber::EnvFilter;

use github::GithubClient;
use seeder::{
    Catalog, Materializer, PreviewSink, RepositoryId, RunId, SeederError, Specification,
};

/// Credential environment variables, highest precedence first.
const TOKEN_ENV_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN", "SECRT", "SECRET"];

const EXIT_REMOTE_FAILURE: u8 = 1;
const EXIT_CONFIGURATION: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "issue-seeder")]
#[command(about = "Seed a repository's issue backlog from a work-item catalog", long_about = None)]
struct Cli {
    /// Path to the catalog: a JSON array of work-item specifications.
    #[arg(long)]
    catalog: PathBuf,

    /// Target repository in owner/repo form.
    #[arg(long, env = "GITHUB_REPO")]
    repo: Option<String>,

    /// API token. Falls back to GITHUB_TOKEN, GH_TOKEN, SECRT, SECRET.
    #[arg(long)]
    token: Option<String>,

    /// Actually create issues on the remote tracker.
    #[arg(long)]
    create: bool,

    /// Print every planned issue instead of creating anything.
    #[arg(long)]
    dry_run: bool,

    /// Per-request deadline, in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Overall run deadline, in seconds. Unlimited when absent.
    #[arg(long)]
    run_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let run_id = RunId::new_random();
    run(cli).instrument(info_span!("seed_run", run = %run_id)).await
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> ExitCode {
    let catalog = match load_catalog(&cli.catalog) {
        Ok(catalog) => catalog,
        Err(err) => {
            error!("{err:#}");
            return ExitCode::from(EXIT_CONFIGURATION);
        }
    };
    let materializer = Materializer::new(&catalog);

    if is_dry_run(cli.create, cli.dry_run) {
        let mut sink = StdoutPreview;
        materializer.preview(&mut sink);
        return ExitCode::SUCCESS;
    }

    let Some(repository) = cli.repo.and_then(RepositoryId::new) else {
        error!("--repo or GITHUB_REPO is required");
        return ExitCode::from(EXIT_CONFIGURATION);
    };
    let Some(token) = resolve_token(cli.token, |name| std::env::var(name).ok()) else {
        error!(
            "--token or one of {} is required",
            TOKEN_ENV_VARS.join("/")
        );
        return ExitCode::from(EXIT_CONFIGURATION);
    };

    let client = match GithubClient::new(
        repository,
        token,
        Duration::from_secs(cli.timeout_secs),
    ) {
        Ok(client) => client,
        Err(err) => {
            error!("{err}");
            return ExitCode::from(EXIT_CONFIGURATION);
        }
    };

    let outcome = match cli.run_timeout_secs {
        Some(secs) => {
            let deadline = Duration::from_secs(secs);
            match tokio::time::timeout(deadline, materializer.create_all(&client)).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    error!("run deadline of {secs}s elapsed; aborting");
                    return ExitCode::from(EXIT_REMOTE_FAILURE);
                }
            }
        }
        None => materializer.create_all(&client).await,
    };

    match outcome {
        Ok(resolved) => {
            info!(created = resolved.len(), "seeding complete");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

/// Dry run is the default; `--create` opts into real creation, and an
/// explicit `--dry-run` always wins.
fn is_dry_run(create: bool, dry_run: bool) -> bool {
    dry_run || !create
}

/// Resolves the credential: an explicit `--token` wins, then the environment
/// variables in [`TOKEN_ENV_VARS`] order. Empty values are skipped.
fn resolve_token(
    explicit: Option<String>,
    env: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    explicit
        .into_iter()
        .chain(TOKEN_ENV_VARS.iter().copied().filter_map(|name| env(name)))
        .find(|value| !value.is_empty())
}

/// Loads and validates the catalog file before any remote call.
fn load_catalog(path: &Path) -> anyhow::Result<Catalog> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file {}", path.display()))?;
    let specs: Vec<Specification> = serde_json::from_str(&raw)
        .with_context(|| format!("catalog file {} is not valid JSON", path.display()))?;
    let catalog = Catalog::from_specs(specs).context("catalog validation failed")?;
    Ok(catalog)
}

fn exit_code_for(err: &SeederError) -> u8 {
    match err {
        SeederError::Configuration { .. }
        | SeederError::DuplicateKey { .. }
        | SeederError::UnknownDependency { .. } => EXIT_CONFIGURATION,
        SeederError::CreateFailed { .. }
        | SeederError::AnnotateFailed { .. }
        | SeederError::MissingResolution { .. } => EXIT_REMOTE_FAILURE,
    }
}

/// Dry-run inspection collaborator: prints each planned issue to stdout.
struct StdoutPreview;

impl PreviewSink for StdoutPreview {
    fn preview(&mut self, position: usize, title: &str, body: &str) {
        println!("[dry-run] {position}. {title}");
        println!("{body}");
        println!("{}", "-".repeat(60));
    }
}
