/*============================================================
  Modreg Project: modreg
  Module: modreg_core::main
  Etiquette: Modreg Source Etiquette, Rust Profile v1.0
  ------------------------------------------------------------
  Purpose:
    Entry point for the modreg CLI. Parses arguments, builds
    the runtime container, registers the selected command
    behind its error interceptor, and renders the outcome.

  Security / Safety Notes:
    Operates within user privileges. Performs HTTPS requests
    to the configured registry only.

  Dependencies:
    clap for CLI parsing, chrono for log session stamps, tokio
    for the async runtime.

  Operational Scope:
    Invoked directly by operators and automation.

  Revision History:
    2026-03-02 MRG  Authored modreg runtime.
  ------------------------------------------------------------
  Principles Observed:
    - Result-first error handling with deterministic exits
    - Every command classified by exactly one interceptor
============================================================*/

mod cli_error;
mod commands;
mod config;
mod error;
mod interceptor;
mod internal;
mod logger;
mod module_ref;
mod prompt;
mod registry;
mod rpc;

use std::error::Error as StdError;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::{ArgAction, Parser, Subcommand};

use cli_error::CliError;
use config::AppConfig;
use error::{find_in_chain, ModregError, Result};
use interceptor::{command_fn, new_error_interceptor, ActionError, CommandFn, Container};
use internal::is_internal_error;
use logger::Logger;

/// Command-line arguments for modreg.
#[derive(Debug, Parser)]
#[command(name = "modreg", version, about = "Module registry client")]
struct Cli {
    /// Override settings file path.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Explicit log file path.
    #[arg(long, value_name = "PATH", global = true)]
    log: Option<PathBuf>,
    /// Enable verbose logging to stderr.
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage registry resources.
    Registry {
        /// Registry remote, defaulting to the configured one.
        #[arg(long, global = true)]
        remote: Option<String>,
        #[command(subcommand)]
        command: RegistryCommand,
    },
    /// Manage the module in the current directory.
    #[command(name = "mod")]
    Module {
        #[command(subcommand)]
        command: ModuleCommand,
    },
}

#[derive(Debug, Subcommand)]
enum RegistryCommand {
    Organization {
        #[command(subcommand)]
        command: OrganizationCommand,
    },
    Repository {
        #[command(subcommand)]
        command: RepositoryCommand,
    },
    Branch {
        #[command(subcommand)]
        command: BranchCommand,
    },
    Token {
        #[command(subcommand)]
        command: TokenCommand,
    },
}

#[derive(Debug, Subcommand)]
enum OrganizationCommand {
    Create { name: String },
    Get { name: String },
}

#[derive(Debug, Subcommand)]
enum RepositoryCommand {
    /// MODULE is remote/owner/repository.
    Create { module: String },
    Get { module: String },
}

#[derive(Debug, Subcommand)]
enum BranchCommand {
    Create {
        name: String,
        /// Module to branch; defaults to the name in modreg.toml.
        #[arg(long)]
        module: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum TokenCommand {
    Delete { token_id: String },
}

#[derive(Debug, Subcommand)]
enum ModuleCommand {
    /// Create modreg.toml in the current directory.
    Init {
        #[arg(long)]
        name: Option<String>,
        /// Fail instead of prompting for missing input.
        #[arg(long, action = ArgAction::SetTrue)]
        no_prompt: bool,
    },
    /// Check modreg.toml and print annotations.
    Lint,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("[modreg] {}", err);
            err.exit_code()
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = AppConfig::load_from_optional_path(cli.config.as_deref())?;
    let session_stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let log_path = cli.log.clone().or_else(|| {
        config
            .log_dir()
            .map(|dir| dir.join(format!("modreg_{session_stamp}.log")))
    });
    let logger = Logger::new(log_path, cli.verbose)?;
    let work_dir = std::env::current_dir()?;

    let command = register(cli.command);
    let container = Arc::new(Container::new(config, work_dir, logger));
    let outcome = command(container.clone()).await;
    if let Err(err) = &outcome {
        log_outcome(container.logger(), err.as_ref());
    }
    container.logger().finalize()?;

    Ok(match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = err.to_string();
            if !message.is_empty() {
                eprintln!("[modreg] {message}");
            }
            exit_code_for(err.as_ref())
        }
    })
}

/// Select the command body and wrap it in its error interceptor.
fn register(command: Command) -> CommandFn {
    let (action, body): (&str, CommandFn) = match command {
        Command::Registry { remote, command } => match command {
            RegistryCommand::Organization { command } => match command {
                OrganizationCommand::Create { name } => (
                    "create organization",
                    command_fn(move |c| commands::organization_create(c, remote.clone(), name.clone())),
                ),
                OrganizationCommand::Get { name } => (
                    "get organization",
                    command_fn(move |c| commands::organization_get(c, remote.clone(), name.clone())),
                ),
            },
            RegistryCommand::Repository { command } => match command {
                RepositoryCommand::Create { module } => (
                    "create repository",
                    command_fn(move |c| commands::repository_create(c, module.clone())),
                ),
                RepositoryCommand::Get { module } => (
                    "get repository",
                    command_fn(move |c| commands::repository_get(c, module.clone())),
                ),
            },
            RegistryCommand::Branch {
                command: BranchCommand::Create { name, module },
            } => (
                "create branch",
                command_fn(move |c| commands::branch_create(c, name.clone(), module.clone())),
            ),
            RegistryCommand::Token {
                command: TokenCommand::Delete { token_id },
            } => (
                "delete token",
                command_fn(move |c| commands::token_delete(c, remote.clone(), token_id.clone())),
            ),
        },
        Command::Module { command } => match command {
            ModuleCommand::Init { name, no_prompt } => (
                "initialize module",
                command_fn(move |c| commands::mod_init(c, name.clone(), no_prompt)),
            ),
            ModuleCommand::Lint => ("lint module", command_fn(commands::mod_lint)),
        },
    };
    new_error_interceptor(action)(body)
}

fn log_outcome(logger: &Logger, err: &(dyn StdError + 'static)) {
    let (action, class) = match find_in_chain::<ActionError>(err) {
        Some(action_error) if action_error.is_unauthenticated() => {
            (action_error.action(), "unauthenticated")
        }
        Some(action_error) if action_error.is_unavailable() => {
            (action_error.action(), "unavailable")
        }
        Some(action_error) => (action_error.action(), "failed"),
        None => ("-", "passthrough"),
    };
    logger.debug(
        "OUTCOME",
        format!(
            "action={action} class={class} internal={}",
            is_internal_error(err)
        ),
    );
}

fn exit_code_for(err: &(dyn StdError + 'static)) -> ExitCode {
    match CliError::find(err) {
        Some(CliError::FileAnnotation) => return ExitCode::from(100),
        Some(cli_error) if cli_error.is_invalid_argument() => return ExitCode::from(2),
        _ => {}
    }
    match find_in_chain::<ModregError>(err) {
        Some(ambient) => ambient.exit_code(),
        None => ExitCode::FAILURE,
    }
}
