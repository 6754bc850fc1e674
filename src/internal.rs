/*============================================================
  Modreg Project: modreg
  Module: modreg_core::internal
  Etiquette: Modreg Source Etiquette, Rust Profile v1.0
  ------------------------------------------------------------
  Purpose:
    Mark unexpected failures as defects that warrant a bug
    report, without ever nesting the marker twice.

  Security / Safety Notes:
    Pure data wrapping; no I/O.

  Dependencies:
    None beyond std.

  Operational Scope:
    Used wherever a failure indicates a modreg defect rather
    than a user or registry condition.

  Revision History:
    2026-03-02 MRG  Added internal error marker.
  ------------------------------------------------------------
  Principles Observed:
    - Saturating (idempotent) wrapping
    - Chain-aware detection
============================================================*/

use std::error::Error as StdError;
use std::fmt;

use crate::error::{find_in_chain, BoxError};

const BUG_REPORT_PREAMBLE: &str = "it looks like you have found a bug in modreg. \
     Please file an issue and provide the command you ran";

/// Unexpected modreg failure, optionally carrying its cause.
#[derive(Debug)]
pub struct InternalError {
    cause: Option<BoxError>,
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(BUG_REPORT_PREAMBLE)?;
        if let Some(cause) = &self.cause {
            write!(f, ", as well as the following message: {cause}")?;
        }
        Ok(())
    }
}

impl StdError for InternalError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

/// Wrap `err` as an internal error unless it already is one.
///
/// The input is returned as-is when it, or anything it wraps, is an
/// [`InternalError`].
pub fn new_internal_error(err: Option<BoxError>) -> BoxError {
    match err {
        Some(err) if is_internal_error(err.as_ref()) => err,
        cause => Box::new(InternalError { cause }),
    }
}

/// Whether `err` or any error in its source chain is an [`InternalError`].
pub fn is_internal_error(err: &(dyn StdError + 'static)) -> bool {
    find_in_chain::<InternalError>(err).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModregError;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("unrelated layer: {0}")]
    struct Unrelated(#[source] BoxError);

    fn address(err: &BoxError) -> *const () {
        err.as_ref() as *const (dyn StdError + Send + Sync) as *const ()
    }

    #[test]
    fn wrapping_is_idempotent() {
        let once = new_internal_error(Some(Box::new(ModregError::Serialization("boom".into()))));
        let before = address(&once);
        let twice = new_internal_error(Some(once));
        assert_eq!(address(&twice), before);
        assert_eq!(
            twice.to_string(),
            format!("{BUG_REPORT_PREAMBLE}, as well as the following message: Serialization: boom")
        );
    }

    #[test]
    fn already_wrapped_internal_errors_pass_through() {
        let wrapped: BoxError = Box::new(Unrelated(new_internal_error(None)));
        let before = address(&wrapped);
        let again = new_internal_error(Some(wrapped));
        assert_eq!(address(&again), before);
    }

    #[test]
    fn detection_is_chain_aware() {
        let plain = ModregError::Config("bad".into());
        assert!(!is_internal_error(&plain));

        let internal = new_internal_error(Some(Box::new(plain)));
        assert!(is_internal_error(internal.as_ref()));

        let outer = Unrelated(internal);
        assert!(is_internal_error(&outer));
    }

    #[test]
    fn renders_preamble_without_cause() {
        let err = new_internal_error(None);
        assert_eq!(err.to_string(), BUG_REPORT_PREAMBLE);
        assert!(err.source().is_none());
    }

    #[test]
    fn cause_is_exposed_as_source() {
        let err = new_internal_error(Some(Box::new(ModregError::Network("reset".into()))));
        let source = err.source().and_then(|s| s.downcast_ref::<ModregError>());
        assert!(matches!(source, Some(ModregError::Network(msg)) if msg == "reset"));
    }
}
