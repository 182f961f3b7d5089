//! GitHub App JWT Generator
//!
//! Signs a short-lived RS256 JWT that authenticates as a GitHub App. The JWT
//! can be exchanged for an installation access token with GitHub's REST API.
//!
//! ## Usage
//! ```bash
//! # With command line arguments
//! app-jwt \
//!   --app-id 123456 \
//!   --key-file ./key.pem
//!
//! # With environment variables
//! GITHUB_APP_ID=123456 \
//! GITHUB_PRIVATE_KEY_PATH=./key.pem \
//! app-jwt --format json
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use github_app_jwt::types::rfc3339;
use github_app_jwt::{issue_token, load_private_key, verify_jwt, AppJwtError, TokenOutput};
use std::fs;
use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// GitHub App JWT Generator
#[derive(Parser, Debug)]
#[command(name = "app-jwt")]
#[command(about = "Sign a short-lived JWT for authenticating as a GitHub App")]
#[command(version)]
struct Args {
    /// GitHub App ID (required)
    #[arg(long, env = "GITHUB_APP_ID", default_value = "", hide_default_value = true)]
    app_id: String,

    /// Path to the GitHub App private key PEM file (required)
    #[arg(
        long,
        env = "GITHUB_PRIVATE_KEY_PATH",
        default_value = "",
        hide_default_value = true
    )]
    key_file: String,

    /// Output file path (optional, prints to stdout if not specified)
    #[arg(long, short)]
    output: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "token")]
    format: OutputFormat,

    /// Verify the signed JWT against the key's public half before printing it
    #[arg(long)]
    verify: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// The bare JWT
    Token,
    /// JSON with the JWT and its validity window
    Json,
}

impl Args {
    fn validate(&self) -> Result<(), AppJwtError> {
        if self.app_id.is_empty() || self.key_file.is_empty() {
            return Err(AppJwtError::Usage(
                "Both --app-id and --key-file are required".to_string(),
            ));
        }
        Ok(())
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(err) = args.validate() {
        eprintln!("{}", Args::command().render_help());
        error!("{err}");
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    // stdout carries only the token
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<()> {
    info!("🔐 Generating JWT for GitHub App {}...", args.app_id);

    let key = load_private_key(&args.key_file).context("Failed to load private key")?;
    let signed = issue_token(&args.app_id, &key).context("Failed to generate JWT")?;

    if args.verify {
        verify_jwt(&signed.token, &key).context("Generated JWT failed verification")?;
        debug!("JWT signature verified");
    }

    let output = match args.format {
        OutputFormat::Token => signed.token.clone(),
        OutputFormat::Json => serde_json::to_string_pretty(&TokenOutput::from(&signed))
            .context("Failed to serialize JWT output")?,
    };

    if let Some(output_path) = &args.output {
        write_token_file(output_path, &output)?;
        info!("✅ JWT saved to {}", output_path);
    } else {
        println!("{}", output);
    }

    info!(
        expires_at = %rfc3339(signed.claims.exp),
        "JWT generated successfully"
    );

    Ok(())
}

fn write_token_file(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, format!("{contents}\n"))
        .with_context(|| format!("Failed to write JWT to {}", path.display()))?;

    // Set restrictive permissions on the token file
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict permissions on {}", path.display()))?;
    }

    Ok(())
}
