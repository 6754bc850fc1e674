/*============================================================
  Modreg Project: modreg
  Module: modreg_core::commands
  Etiquette: Modreg Source Etiquette, Rust Profile v1.0
  ------------------------------------------------------------
  Purpose:
    Command bodies for the modreg CLI. Each translates the
    registry outcomes it anticipates into domain errors and
    leaves everything else for the interceptor to classify.

  Security / Safety Notes:
    Output contains registry resource metadata only.

  Dependencies:
    serde_json for rendering registry resources.

  Operational Scope:
    Registered once per invocation by the binary entry point,
    always behind an error interceptor.

  Revision History:
    2026-03-02 MRG  Authored registry and module commands.
  ------------------------------------------------------------
  Principles Observed:
    - Domain errors raised at the point of detection
    - Unrecognised failures propagate untouched
============================================================*/

use std::io;
use std::sync::Arc;

use serde::Serialize;

use crate::cli_error::CliError;
use crate::config::{ModuleConfig, MODULE_CONFIG_FILE};
use crate::error::{BoxError, ModregError};
use crate::interceptor::{CommandResult, Container};
use crate::internal::new_internal_error;
use crate::module_ref::ModuleRef;
use crate::prompt::Prompter;
use crate::registry::RegistryClient;
use crate::rpc::{error_code, ErrorCode};

/// Replace `err` with the domain error `domain` selects for its code, if any.
fn translate<F>(err: BoxError, domain: F) -> BoxError
where
    F: FnOnce(ErrorCode) -> Option<CliError>,
{
    match domain(error_code(err.as_ref())) {
        Some(cli_error) => Box::new(cli_error),
        None => err,
    }
}

fn print_json<T: Serialize>(value: &T) -> CommandResult {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|err| new_internal_error(Some(Box::new(err))))?;
    println!("{rendered}");
    Ok(())
}

fn client_for(container: &Container, remote: &str) -> Result<RegistryClient, BoxError> {
    Ok(RegistryClient::new(&container.config().registry, remote)?)
}

fn resolve_remote(container: &Container, remote: Option<String>) -> String {
    remote.unwrap_or_else(|| container.config().registry.remote.clone())
}

pub async fn organization_create(
    container: Arc<Container>,
    remote: Option<String>,
    name: String,
) -> CommandResult {
    let client = client_for(&container, &resolve_remote(&container, remote))?;
    let organization = client.create_organization(&name).await.map_err(|err| {
        translate(err, |code| match code {
            ErrorCode::AlreadyExists => Some(CliError::organization_name_already_exists(&name)),
            _ => None,
        })
    })?;
    container
        .logger()
        .info("ORG", format!("Created organization {}", organization.name));
    print_json(&organization)
}

pub async fn organization_get(
    container: Arc<Container>,
    remote: Option<String>,
    name: String,
) -> CommandResult {
    let client = client_for(&container, &resolve_remote(&container, remote))?;
    let organization = client.get_organization(&name).await.map_err(|err| {
        translate(err, |code| match code {
            ErrorCode::NotFound => Some(CliError::organization_not_found(&name)),
            _ => None,
        })
    })?;
    print_json(&organization)
}

pub async fn repository_create(container: Arc<Container>, module: String) -> CommandResult {
    let module: ModuleRef = module.parse()?;
    let client = client_for(&container, module.remote())?;
    let repository = client
        .create_repository(module.owner(), module.repository())
        .await
        .map_err(|err| {
            translate(err, |code| match code {
                ErrorCode::AlreadyExists => {
                    Some(CliError::repository_name_already_exists(module.full_name()))
                }
                ErrorCode::NotFound => Some(CliError::organization_not_found(module.owner())),
                _ => None,
            })
        })?;
    container
        .logger()
        .info("REPO", format!("Created repository {module}"));
    print_json(&repository)
}

pub async fn repository_get(container: Arc<Container>, module: String) -> CommandResult {
    let module: ModuleRef = module.parse()?;
    let client = client_for(&container, module.remote())?;
    let repository = client
        .get_repository(module.owner(), module.repository())
        .await
        .map_err(|err| {
            translate(err, |code| match code {
                ErrorCode::NotFound => Some(CliError::repository_not_found(module.full_name())),
                _ => None,
            })
        })?;
    print_json(&repository)
}

/// Create a branch on `--module`, or on the module named in `modreg.toml`.
pub async fn branch_create(
    container: Arc<Container>,
    name: String,
    module: Option<String>,
) -> CommandResult {
    let module: ModuleRef = match module {
        Some(module) => module.parse()?,
        None => ModuleConfig::load(container.work_dir())?.module_name()?,
    };
    let client = client_for(&container, module.remote())?;
    let branch = client
        .create_branch(module.owner(), module.repository(), &name)
        .await
        .map_err(|err| {
            translate(err, |code| match code {
                ErrorCode::AlreadyExists => Some(CliError::branch_name_already_exists(&name)),
                ErrorCode::NotFound => Some(CliError::repository_not_found(module.full_name())),
                _ => None,
            })
        })?;
    container
        .logger()
        .info("BRANCH", format!("Created branch {} on {module}", branch.name));
    print_json(&branch)
}

pub async fn token_delete(
    container: Arc<Container>,
    remote: Option<String>,
    token_id: String,
) -> CommandResult {
    let client = client_for(&container, &resolve_remote(&container, remote))?;
    client.delete_token(&token_id).await.map_err(|err| {
        translate(err, |code| match code {
            ErrorCode::NotFound => Some(CliError::token_not_found(&token_id)),
            _ => None,
        })
    })?;
    println!("Token {token_id} deleted.");
    Ok(())
}

/// Write a new `modreg.toml`, prompting for the module name when needed.
pub async fn mod_init(
    container: Arc<Container>,
    name: Option<String>,
    no_prompt: bool,
) -> CommandResult {
    let path = ModuleConfig::path_in(container.work_dir());
    if path.exists() {
        return Err(Box::new(ModregError::Config(format!(
            "{} already exists",
            path.display()
        ))));
    }

    let name = match name {
        Some(name) => name,
        None if no_prompt => return Err(Box::new(CliError::flag_is_required("name"))),
        None => {
            let stdin = io::stdin();
            let mut prompter = Prompter::new(
                stdin.lock(),
                io::stderr(),
                container.config().prompt.max_attempts,
            );
            prompter.ask("Module name (remote/owner/repository)")?
        }
    };
    let module: ModuleRef = name.parse()?;

    let written = ModuleConfig::new(Some(module.to_string())).write(container.work_dir())?;
    container
        .logger()
        .info("MODINIT", format!("Wrote {}", written.display()));
    println!("Created {}", written.display());
    Ok(())
}

/// Finding reported by `mod lint` at a position in `modreg.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Check `modreg.toml`, printing one annotation per finding.
///
/// Findings are reported through the empty [`CliError::FileAnnotation`]
/// so only the exit status reflects them.
pub async fn mod_lint(container: Arc<Container>) -> CommandResult {
    let (path, raw) = ModuleConfig::read_raw(container.work_dir())?;
    let config = ModuleConfig::parse(&raw, &path)?;

    let annotations = lint_module_config(&config, &raw)?;
    if annotations.is_empty() {
        container.logger().info("LINT", "No issues found");
        return Ok(());
    }
    for annotation in &annotations {
        println!(
            "{MODULE_CONFIG_FILE}:{}:{}:{}",
            annotation.line, annotation.column, annotation.message
        );
    }
    Err(Box::new(CliError::FileAnnotation))
}

fn lint_module_config(config: &ModuleConfig, raw: &str) -> Result<Vec<Annotation>, CliError> {
    let mut annotations = Vec::new();
    if config.version != "v1" {
        let (line, column) = key_position(raw, "version");
        annotations.push(Annotation {
            line,
            column,
            message: format!("unsupported version {:?}, expected \"v1\"", config.version),
        });
    }

    match config.module_name() {
        Ok(module) if module.reference().is_some() => {
            let (line, column) = key_position(raw, "name");
            annotations.push(Annotation {
                line,
                column,
                message: format!("module name {module} must not include a reference"),
            });
        }
        Ok(_) => {}
        Err(CliError::NoModuleName) => return Err(CliError::NoModuleName),
        Err(err) => {
            let (line, column) = key_position(raw, "name");
            annotations.push(Annotation {
                line,
                column,
                message: err.to_string(),
            });
        }
    }
    Ok(annotations)
}

/// 1-based position of `key = ...` in `raw`, or 1:1 when absent.
fn key_position(raw: &str, key: &str) -> (usize, usize) {
    raw.lines()
        .enumerate()
        .find_map(|(index, line)| {
            let trimmed = line.trim_start();
            let rest = trimmed.strip_prefix(key)?;
            rest.trim_start()
                .starts_with('=')
                .then(|| (index + 1, line.len() - trimmed.len() + 1))
        })
        .unwrap_or((1, 1))
}
