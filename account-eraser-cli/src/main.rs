//! Account eraser CLI
//!
//! Runs permission checks and erasures against a JSON account store, using the
//! same configuration file a deployed plugin would.

mod store;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use account_eraser_app::config::EraserConfig;
use account_eraser_app::AppStateBuilder;
use account_eraser_core::types::{
    AccountId, Capability, ErasureOutcome, ErasureStage, Principal, StageStatus,
};
use account_eraser_core::{CoreError, CoreResult};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "account-eraser")]
#[command(version, about = "Erase the personal data of review accounts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: <config dir>/account-eraser/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON account store
    #[arg(long, global = true, default_value = "accounts.json")]
    accounts: PathBuf,

    /// Account id of the caller; omit to act as an unresolved caller
    #[arg(long, global = true)]
    caller: Option<AccountId>,

    /// Username of the caller, matched against username grants
    #[arg(long, global = true)]
    caller_username: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether the caller may delete an account
    CanDelete {
        /// Target account id
        target: AccountId,
    },

    /// Erase an account and write the store back
    Delete {
        /// Target account id
        target: AccountId,
    },

    /// Print the capability names to register with the host
    Capabilities,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr, results to stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    let caller = principal(cli.caller, cli.caller_username);

    if let Commands::Capabilities = cli.command {
        for capability in Capability::ALL {
            println!(
                "{}\t{}",
                capability.qualified_name(&config.plugin.name),
                capability.description()
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    let directory = Arc::new(store::load(&cli.accounts, config.gpg.enabled)?);
    let state = AppStateBuilder::new()
        .config(config)
        .directory_views(directory.clone())
        .build()?;

    match cli.command {
        Commands::CanDelete { target } => {
            let allowed = state.deletion_service.can_delete(&caller, target).await;
            println!("{allowed}");
            Ok(if allowed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Delete { target } => {
            let result = state.deletion_service.delete_account(&caller, target).await;
            // Completed stages stay applied even when a later one fails
            if !matches!(result, Err(CoreError::PermissionDenied { .. })) {
                store::save(&cli.accounts, &directory).await?;
            }
            report(result)
        }
        Commands::Capabilities => Ok(ExitCode::SUCCESS),
    }
}

fn load_config(explicit: Option<&Path>) -> Result<EraserConfig> {
    if let Some(path) = explicit {
        return EraserConfig::load(path).context("Failed to load --config");
    }

    let Some(path) = dirs::config_dir().map(|d| d.join("account-eraser").join("config.toml"))
    else {
        tracing::warn!("No config directory on this platform, using defaults");
        return Ok(EraserConfig::default());
    };
    if path.exists() {
        Ok(EraserConfig::load(&path)?)
    } else {
        tracing::info!("{} not found, using defaults", path.display());
        Ok(EraserConfig::default())
    }
}

fn principal(account_id: Option<AccountId>, username: Option<String>) -> Principal {
    let principal = account_id.map_or_else(Principal::unresolved, Principal::account);
    match username {
        Some(name) => principal.with_username(name),
        None => principal,
    }
}

fn report(result: CoreResult<ErasureOutcome>) -> Result<ExitCode> {
    match result {
        Ok(outcome) => {
            for stage in &outcome.stages {
                match &stage.status {
                    StageStatus::Completed { removed } => {
                        tracing::info!("{}: {removed} changed", stage.stage);
                    }
                    StageStatus::Skipped { reason } => {
                        tracing::info!("{}: skipped ({reason})", stage.stage);
                    }
                }
            }
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            if let Some(stage) = e.failed_stage().filter(|s| *s != ErasureStage::Resolve) {
                eprintln!(
                    "Account was only partially erased (failed at stage '{stage}'); run the command again to finish"
                );
            }
            if e.is_expected() {
                tracing::warn!("{e}");
            } else {
                tracing::error!("{e}");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
