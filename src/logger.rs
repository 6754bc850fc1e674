/*============================================================
  Modreg Project: modreg
  Module: modreg_core::logger
  Etiquette: Modreg Source Etiquette, Rust Profile v1.0
  ------------------------------------------------------------
  Purpose:
    Provide structured, append-only logging for command runs
    and error classification decisions.

  Security / Safety Notes:
    Callers never pass registry tokens to the logger; only
    actions, error codes and rendered messages are recorded.

  Dependencies:
    chrono for timestamps, sha2 for session digests.

  Operational Scope:
    Owned by the command container; used by the interceptor
    and command bodies.

  Revision History:
    2026-03-02 MRG  Adapted logging for modreg.
  ------------------------------------------------------------
  Principles Observed:
    - Append-only logging with UTC timestamps
    - Deterministic formatting for auditability
    - Graceful error propagation on I/O failures
============================================================*/

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use crate::error::{ModregError, Result};

/// Structured log level for command and interceptor events.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// Logger writing to stderr and optionally to an append-only file.
pub struct Logger {
    file: Option<Mutex<BufWriter<File>>>,
    path: Option<PathBuf>,
    verbose: bool,
}

impl Logger {
    /// Build a logger that writes to stderr and optionally to a file.
    pub fn new(path: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let file = match path {
            Some(ref file_path) => {
                if let Some(parent) = file_path.parent() {
                    std::fs::create_dir_all(parent).map_err(|err| {
                        ModregError::Filesystem(format!(
                            "Failed to create log directory {}: {err}",
                            parent.display()
                        ))
                    })?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(file_path)
                    .map_err(|err| {
                        ModregError::Filesystem(format!(
                            "Failed to open log file {}: {err}",
                            file_path.display()
                        ))
                    })?;
                Some(Mutex::new(BufWriter::new(file)))
            }
            None => None,
        };

        Ok(Self {
            file,
            path,
            verbose,
        })
    }

    /// Emit a log entry with the given level, code, and message.
    pub fn log<S: AsRef<str>>(&self, level: LogLevel, code: &str, message: S) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let payload = format!(
            "{timestamp} [{}] [{}] {}",
            level.as_str(),
            code,
            message.as_ref()
        );

        if self.verbose || level == LogLevel::Error || level == LogLevel::Warn {
            eprintln!("{payload}");
        }

        if let Some(file) = &self.file {
            if let Ok(mut guard) = file.lock() {
                if writeln!(guard, "{payload}").is_err() || guard.flush().is_err() {
                    eprintln!(
                        "{timestamp} [{}] [LOGGER] Failed to write to log file",
                        LogLevel::Error.as_str()
                    );
                }
            }
        }
    }

    /// Convenience wrapper for `INFO` level events.
    pub fn info<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Info, code, message);
    }

    /// Convenience wrapper for `DEBUG` level events.
    pub fn debug<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Debug, code, message);
    }

    /// Return the path backing this logger, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Persist a SHA-256 digest of the log file as `<log>.hash`.
    pub fn finalize(&self) -> Result<()> {
        let Some(path) = self.path() else {
            return Ok(());
        };
        let data = std::fs::read(path).map_err(|err| {
            ModregError::Filesystem(format!(
                "Failed to read log for hashing {}: {err}",
                path.display()
            ))
        })?;
        let digest = Sha256::digest(&data);
        let mut hash_os = path.as_os_str().to_os_string();
        hash_os.push(".hash");
        let hash_path = PathBuf::from(hash_os);
        let file_name = path.file_name().unwrap_or_default().to_string_lossy();
        std::fs::write(&hash_path, format!("{digest:x}  {file_name}\n")).map_err(|err| {
            ModregError::Filesystem(format!(
                "Failed to write hash file {}: {err}",
                hash_path.display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_appended_and_hashed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("session.log");
        let logger = Logger::new(Some(path.clone()), false).unwrap();
        logger.info("INIT", "starting");
        logger.debug("INTERCEPT", "action=lint code=unknown");
        logger.finalize().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[INFO] [INIT] starting"));
        assert!(lines[1].contains("[DEBUG] [INTERCEPT]"));

        let digest = std::fs::read_to_string(dir.path().join("logs").join("session.log.hash")).unwrap();
        assert!(digest.trim_end().ends_with("  session.log"));
        assert_eq!(digest.split_whitespace().next().unwrap().len(), 64);
    }

    #[test]
    fn path_reports_the_backing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.log");
        let logger = Logger::new(Some(path.clone()), false).unwrap();
        assert_eq!(logger.path(), Some(path.as_path()));
        assert_eq!(Logger::new(None, false).unwrap().path(), None);
    }

    #[test]
    fn finalize_without_file_is_noop() {
        assert!(Logger::new(None, false).unwrap().finalize().is_ok());
    }
}
