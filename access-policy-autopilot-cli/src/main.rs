//! Access Policy Autopilot CLI
//!
//! Converges Cloudflare Access application policies. Credentials come from flags or
//! the `CLOUDFLARE_*` environment variables.

use std::process::ExitCode;

use access_policy_autopilot_core::AccessError;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{EnablePublicArgs, FixZeroTrustArgs};

/// Exit code when the target application does not exist. Distinct from clap's usage
/// error code 2.
const EXIT_NOT_FOUND: u8 = 3;

#[derive(Parser, Debug)]
#[command(
    name = "access-policy-autopilot",
    version,
    about = "Plan and apply Cloudflare Access policy changes"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Make an application public by upserting a bypass-everyone policy
    EnablePublic(EnablePublicArgs),
    /// Provision an admin application with allow policies and remove stale IP bypass policies
    FixZeroTrust(FixZeroTrustArgs),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_target(false)
        .init();
}

fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<AccessError>() {
        Some(access_err) if access_err.is_not_found() => ExitCode::from(EXIT_NOT_FOUND),
        _ => ExitCode::FAILURE,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::EnablePublic(args) => commands::enable_public(args).await,
        Commands::FixZeroTrust(args) => commands::fix_zero_trust(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("Command failed: {err:?}");
            eprintln!("Error: {err:#}");
            exit_code_for(&err)
        }
    }
}
