/*============================================================
  Modreg Project: modreg
  Module: modreg_core::interceptor
  Etiquette: Modreg Source Etiquette, Rust Profile v1.0
  ------------------------------------------------------------
  Purpose:
    Wrap every command so its terminal error is classified
    and rewritten into a user-facing message exactly once.

  Security / Safety Notes:
    Authentication failures are reported without the remote
    error text, which may echo credential details.

  Dependencies:
    thiserror for the rewritten error forms.

  Operational Scope:
    Installed around each command at registration time by the
    binary entry point.

  Revision History:
    2026-03-02 MRG  Authored command error interceptor.
  ------------------------------------------------------------
  Principles Observed:
    - Single chokepoint for error presentation
    - Original errors stay reachable through source()
    - No retries; transport owns retry policy
============================================================*/

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;

use crate::config::AppConfig;
use crate::error::BoxError;
use crate::logger::Logger;
use crate::rpc::{error_code, ErrorCode};

pub type CommandResult = Result<(), BoxError>;

pub type CommandFuture = Pin<Box<dyn Future<Output = CommandResult> + Send>>;

/// A unit of work run against the runtime container.
pub type CommandFn = Arc<dyn Fn(Arc<Container>) -> CommandFuture + Send + Sync>;

/// Middleware that receives the next step and returns a wrapped step.
pub type Interceptor = Arc<dyn Fn(CommandFn) -> CommandFn + Send + Sync>;

/// Runtime state shared with every command.
pub struct Container {
    config: AppConfig,
    work_dir: PathBuf,
    logger: Logger,
}

impl Container {
    pub fn new(config: AppConfig, work_dir: PathBuf, logger: Logger) -> Self {
        Self {
            config,
            work_dir,
            logger,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Directory holding the module configuration file.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }
}

/// Adapt an async function over the container into a [`CommandFn`].
pub fn command_fn<F, Fut>(f: F) -> CommandFn
where
    F: Fn(Arc<Container>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CommandResult> + Send + 'static,
{
    Arc::new(move |container: Arc<Container>| -> CommandFuture { Box::pin(f(container)) })
}

/// Failure of a command, rewritten with the action that was attempted.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(
        "Failed to {action}; you are not authenticated. Create a new entry in your netrc, \
         using a registry API token as the password, or set the MODREG_TOKEN environment variable."
    )]
    Unauthenticated {
        action: String,
        #[source]
        source: BoxError,
    },
    #[error("Failed to {action}: the server hosted at that remote is unavailable: {source}.")]
    Unavailable {
        action: String,
        #[source]
        source: BoxError,
    },
    #[error("Failed to {action:?}: {source}.")]
    Failed {
        action: String,
        #[source]
        source: BoxError,
    },
}

impl ActionError {
    pub fn action(&self) -> &str {
        match self {
            ActionError::Unauthenticated { action, .. }
            | ActionError::Unavailable { action, .. }
            | ActionError::Failed { action, .. } => action,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ActionError::Unauthenticated { .. })
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, ActionError::Unavailable { .. })
    }
}

/// Build an interceptor that rewrites command errors for `action`.
pub fn new_error_interceptor(action: impl Into<String>) -> Interceptor {
    let action: Arc<str> = Arc::from(action.into());
    Arc::new(move |next: CommandFn| -> CommandFn {
        let action = action.clone();
        Arc::new(move |container: Arc<Container>| -> CommandFuture {
            let next = next.clone();
            let action = action.clone();
            Box::pin(async move {
                let result = next(container.clone()).await;
                if let Err(err) = &result {
                    container.logger().debug(
                        "INTERCEPT",
                        format!("action={action} code={}", error_code(err.as_ref())),
                    );
                }
                wrap_error(&action, result)
            })
        })
    })
}

/// Rewrite a command result into its user-facing form.
///
/// Success, and errors with an empty message that did not come from the
/// registry, are returned untouched: commands such as `mod lint` use an
/// empty error purely to select a failing exit status.
pub fn wrap_error(action: &str, result: CommandResult) -> CommandResult {
    let err = match result {
        Ok(()) => return Ok(()),
        Err(err) => err,
    };
    let code = error_code(err.as_ref());
    if code == ErrorCode::Unknown && err.to_string().is_empty() {
        return Err(err);
    }

    let action = action.to_string();
    let wrapped = match code {
        ErrorCode::Unauthenticated => ActionError::Unauthenticated {
            action,
            source: err,
        },
        ErrorCode::Unavailable => ActionError::Unavailable {
            action,
            source: err,
        },
        _ => ActionError::Failed {
            action,
            source: err,
        },
    };
    Err(Box::new(wrapped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli_error::CliError;
    use crate::internal::{is_internal_error, new_internal_error};
    use crate::rpc::RpcError;
    use std::error::Error as StdError;

    fn address(err: &BoxError) -> *const () {
        err.as_ref() as *const (dyn StdError + Send + Sync) as *const ()
    }

    fn container() -> Arc<Container> {
        Arc::new(Container::new(
            AppConfig::default(),
            PathBuf::from("."),
            Logger::new(None, false).unwrap(),
        ))
    }

    #[test]
    fn success_passes_through() {
        assert!(wrap_error("lint", Ok(())).is_ok());
    }

    #[test]
    fn empty_unknown_errors_are_returned_unchanged() {
        let err: BoxError = Box::new(CliError::FileAnnotation);
        let before = address(&err);
        let returned = wrap_error("lint", Err(err)).unwrap_err();
        assert_eq!(address(&returned), before);
        assert_eq!(CliError::find(returned.as_ref()), Some(&CliError::FileAnnotation));
    }

    #[test]
    fn empty_remote_errors_are_still_wrapped() {
        let err: BoxError = Box::new(RpcError::new(ErrorCode::NotFound, ""));
        let returned = wrap_error("get token", Err(err)).unwrap_err();
        assert_eq!(returned.to_string(), r#"Failed to "get token": ."#);
    }

    #[test]
    fn unauthenticated_hides_original_text() {
        let err: BoxError = Box::new(RpcError::new(
            ErrorCode::Unauthenticated,
            "bearer token rejected",
        ));
        let returned = wrap_error("push", Err(err)).unwrap_err();
        let message = returned.to_string();
        assert!(message.contains("authenticated"));
        assert!(message.contains("push"));
        assert!(!message.contains("bearer token rejected"));

        let action_error = returned.downcast_ref::<ActionError>().unwrap();
        assert!(action_error.is_unauthenticated());
        assert_eq!(action_error.action(), "push");
        assert_eq!(error_code(returned.as_ref()), ErrorCode::Unauthenticated);
    }

    #[test]
    fn unavailable_appends_original_text() {
        let err: BoxError = Box::new(RpcError::new(
            ErrorCode::Unavailable,
            "connection refused",
        ));
        let returned = wrap_error("pull", Err(err)).unwrap_err();
        let message = returned.to_string();
        assert!(message.contains("unavailable"));
        assert!(message.contains("pull"));
        assert!(message.contains("connection refused"));
        assert!(returned.downcast_ref::<ActionError>().unwrap().is_unavailable());
    }

    #[test]
    fn other_errors_get_generic_wrapping() {
        let err: BoxError = Box::new(std::io::Error::other("boom"));
        let before = address(&err);
        let returned = wrap_error("lint", Err(err)).unwrap_err();
        assert_eq!(returned.to_string(), r#"Failed to "lint": boom."#);

        let source = returned.source().unwrap();
        assert_eq!(source as *const dyn StdError as *const (), before);
        assert!(source.downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn internal_errors_survive_wrapping() {
        let returned = wrap_error("lint", Err(new_internal_error(None))).unwrap_err();
        assert!(is_internal_error(returned.as_ref()));
        assert!(returned.to_string().starts_with(r#"Failed to "lint": it looks like"#));
    }

    #[test]
    fn domain_errors_fall_through_to_generic_wrapping() {
        let err: BoxError = Box::new(CliError::organization_name_already_exists("acme"));
        let returned = wrap_error("create organization", Err(err)).unwrap_err();
        assert_eq!(
            returned.to_string(),
            r#"Failed to "create organization": an organization named "acme" already exists."#
        );
        assert_eq!(
            CliError::find(returned.as_ref()),
            Some(&CliError::organization_name_already_exists("acme"))
        );
    }

    #[tokio::test]
    async fn interceptor_wraps_the_next_step() {
        let failing = command_fn(|_container| async {
            Err::<(), BoxError>(Box::new(RpcError::new(ErrorCode::Unavailable, "dial tcp: refused")))
        });
        let intercepted = new_error_interceptor("create branch")(failing);
        let err = intercepted(container()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to create branch: the server hosted at that remote is unavailable: dial tcp: refused."
        );
    }

    #[tokio::test]
    async fn interceptor_keeps_success_and_can_be_reused() {
        let succeeding = command_fn(|_container| async { Ok(()) });
        let intercepted = new_error_interceptor("lint module")(succeeding);
        assert!(intercepted(container()).await.is_ok());
        assert!(intercepted(container()).await.is_ok());
    }
}
