/*============================================================
  Modreg Project: modreg
  Module: modreg_core::rpc
  Etiquette: Modreg Source Etiquette, Rust Profile v1.0
  ------------------------------------------------------------
  Purpose:
    Classify failures surfaced by the registry transport into
    a closed set of error codes readable from any error.

  Security / Safety Notes:
    Response bodies are kept verbatim in messages; request
    headers (and therefore tokens) are never captured.

  Dependencies:
    reqwest for transport errors, serde for error envelopes.

  Operational Scope:
    Consulted by the command interceptor and by command bodies
    that translate remote outcomes into domain errors.

  Revision History:
    2026-03-02 MRG  Introduced error-code accessor.
  ------------------------------------------------------------
  Principles Observed:
    - Total classification with an explicit unknown default
    - Chain-aware lookup instead of string matching
============================================================*/

use std::error::Error as StdError;
use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::find_in_chain;

/// Discrete classification of remote-call failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Canceled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Canceled => "canceled",
            ErrorCode::Unknown => "unknown",
            ErrorCode::InvalidArgument => "invalid_argument",
            ErrorCode::DeadlineExceeded => "deadline_exceeded",
            ErrorCode::NotFound => "not_found",
            ErrorCode::AlreadyExists => "already_exists",
            ErrorCode::PermissionDenied => "permission_denied",
            ErrorCode::ResourceExhausted => "resource_exhausted",
            ErrorCode::FailedPrecondition => "failed_precondition",
            ErrorCode::Aborted => "aborted",
            ErrorCode::OutOfRange => "out_of_range",
            ErrorCode::Unimplemented => "unimplemented",
            ErrorCode::Internal => "internal",
            ErrorCode::Unavailable => "unavailable",
            ErrorCode::DataLoss => "data_loss",
            ErrorCode::Unauthenticated => "unauthenticated",
        }
    }

    /// Map an HTTP status returned by the registry to an error code.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            400 => ErrorCode::InvalidArgument,
            401 => ErrorCode::Unauthenticated,
            403 => ErrorCode::PermissionDenied,
            404 => ErrorCode::NotFound,
            408 | 504 => ErrorCode::DeadlineExceeded,
            409 => ErrorCode::AlreadyExists,
            412 => ErrorCode::FailedPrecondition,
            429 => ErrorCode::ResourceExhausted,
            499 => ErrorCode::Canceled,
            500 => ErrorCode::Internal,
            501 => ErrorCode::Unimplemented,
            502 | 503 => ErrorCode::Unavailable,
            _ => ErrorCode::Unknown,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error originating from the registry transport.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RpcError {
    code: ErrorCode,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    code: ErrorCode,
    #[serde(default)]
    message: String,
}

impl RpcError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Build an error from a non-success registry response.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
            return Self::new(envelope.code, envelope.message);
        }
        let message = match body.trim() {
            "" => status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string(),
            trimmed => trimmed.to_string(),
        };
        Self::new(ErrorCode::from_http_status(status.as_u16()), message)
    }

    /// Classify a transport-level failure.
    pub fn from_transport(err: reqwest::Error) -> Self {
        let code = if err.is_connect() {
            ErrorCode::Unavailable
        } else if err.is_timeout() {
            ErrorCode::DeadlineExceeded
        } else if let Some(status) = err.status() {
            ErrorCode::from_http_status(status.as_u16())
        } else {
            ErrorCode::Unknown
        };
        Self::new(code, err.to_string())
    }
}

/// Return the code of the first remote-call error in the chain, or `Unknown`.
pub fn error_code(err: &(dyn StdError + 'static)) -> ErrorCode {
    find_in_chain::<RpcError>(err)
        .map(RpcError::code)
        .unwrap_or(ErrorCode::Unknown)
}
