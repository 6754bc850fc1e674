/*============================================================
  Modreg Project: modreg
  Module: modreg_core::error
  Etiquette: Modreg Source Etiquette, Rust Profile v1.0
  ------------------------------------------------------------
  Purpose:
    Centralise ambient error types and the boxed error channel
    that every command result flows through.

  Security / Safety Notes:
    Error contexts redact credentials; registry tokens never
    appear in rendered messages.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    Used across modules to propagate recoverable failures and
    to walk wrapped causes for chain-aware classification.

  Revision History:
    2026-03-02 MRG  Established shared error definitions.
  ------------------------------------------------------------
  Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths
    - Stable exit codes for operational tooling
============================================================*/

use std::error::Error as StdError;
use std::io;
use std::process::ExitCode;

use thiserror::Error;

/// Result alias for ambient modreg operations.
pub type Result<T> = std::result::Result<T, ModregError>;

/// Type-erased error carried from command bodies to the interceptor.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Enumerates ambient failures that are not registry or user-input errors.
#[derive(Debug, Error)]
pub enum ModregError {
    #[error("Configuration: {0}")]
    Config(String),
    #[error("Network: {0}")]
    Network(String),
    #[error("Serialization: {0}")]
    Serialization(String),
    #[error("Filesystem: {0}")]
    Filesystem(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ModregError {
    /// Map error category to a deterministic exit code.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ModregError::Config(_) => ExitCode::from(20),
            ModregError::Network(_) => ExitCode::from(30),
            ModregError::Serialization(_) => ExitCode::from(31),
            ModregError::Filesystem(_) => ExitCode::from(40),
            ModregError::Io(_) => ExitCode::from(41),
        }
    }
}

/// Iterate over `err` followed by every error in its `source()` chain.
pub fn chain<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |&current| current.source())
}

/// Return the first error of type `T` found in the chain rooted at `err`.
pub fn find_in_chain<'a, T>(err: &'a (dyn StdError + 'static)) -> Option<&'a T>
where
    T: StdError + 'static,
{
    chain(err).find_map(|current| current.downcast_ref::<T>())
}
