//! `ditto` CLI: check mock definitions and match payloads against them.
//!
//! Usage:
//!   ditto check <PATH>
//!   ditto match --mocks <PATH> --method <METHOD> [--payload <FILE>]

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use ditto_mock::lint::{lint_mocks, Severity};
use ditto_mock::{LogFormat, MatcherConfig, RequestMatcher};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ditto", author, version, about = "Declarative RPC mock matcher")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, global = true, env = "DITTO_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter directive (overrides the config file)
    #[arg(long, global = true, env = "DITTO_LOG")]
    log_level: Option<String>,

    /// Log output format (overrides the config file)
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load mock definitions and report problems
    Check {
        /// Definition file or directory
        #[arg(env = "DITTO_MOCKS_PATH")]
        path: Option<PathBuf>,
    },
    /// Match one payload and print the mocked response
    Match {
        /// Definition file or directory
        #[arg(short, long, env = "DITTO_MOCKS_PATH")]
        mocks: Option<PathBuf>,

        /// Fully qualified method name
        #[arg(long)]
        method: String,

        /// JSON payload file, reads stdin when omitted
        #[arg(short, long)]
        payload: Option<PathBuf>,

        /// Print the verdict of every mock for the method
        #[arg(long)]
        explain: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config);

    let result = match args.command {
        Command::Check { path } => check(config, path),
        Command::Match {
            mocks,
            method,
            payload,
            explain,
        } => run_match(config, mocks, &method, payload, explain),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> anyhow::Result<MatcherConfig> {
    let mut config = match &args.config {
        Some(path) => MatcherConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MatcherConfig::default(),
    };

    if let Some(level) = &args.log_level {
        config.log.level = level.clone();
    }
    if let Some(format) = args.log_format {
        config.log.format = format;
    }
    Ok(config)
}

fn init_tracing(config: &MatcherConfig) {
    let filter =
        EnvFilter::try_new(&config.log.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.log.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn build_matcher(mut config: MatcherConfig, path: Option<PathBuf>) -> anyhow::Result<RequestMatcher> {
    if path.is_some() {
        config.mocks_path = path;
    }
    let Some(root) = config.mocks_path.clone() else {
        bail!("no mocks path given (pass a path, set DITTO_MOCKS_PATH or mocksPath in the config)");
    };

    RequestMatcher::from_config(&config)
        .with_context(|| format!("loading mocks from {}", root.display()))
}

fn check(config: MatcherConfig, path: Option<PathBuf>) -> anyhow::Result<bool> {
    let matcher = build_matcher(config, path)?;

    println!("Loaded {} mock(s)", matcher.len());
    for method in matcher.methods() {
        println!("  {method}: {}", matcher.mocks_for(method).count());
    }

    let issues = lint_mocks(matcher.mocks());
    for issue in &issues {
        println!(
            "{} [{}] {}: {}",
            issue.severity.label(),
            issue.code,
            issue.location,
            issue.message
        );
    }

    let errors = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();
    println!("{} error(s), {} warning(s)", errors, issues.len() - errors);
    Ok(errors == 0)
}

fn run_match(
    config: MatcherConfig,
    mocks: Option<PathBuf>,
    method: &str,
    payload: Option<PathBuf>,
    explain: bool,
) -> anyhow::Result<bool> {
    let matcher = build_matcher(config, mocks)?;

    let payload = match payload {
        Some(path) => {
            std::fs::read(&path).with_context(|| format!("reading payload {}", path.display()))?
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading payload from stdin")?;
            buf
        }
    };

    if explain {
        for verdict in matcher.explain(method, &payload) {
            match verdict.result {
                Ok(matched) => eprintln!("mock #{}: {}", verdict.index, matched),
                Err(e) => eprintln!("mock #{}: error: {e}", verdict.index),
            }
        }
    }

    match matcher.match_request(method, &payload) {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(response)?);
            Ok(true)
        }
        Err(not_matched) => {
            eprintln!("{not_matched}");
            Ok(false)
        }
    }
}
