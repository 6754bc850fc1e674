/*============================================================
  Modreg Project: modreg
  Module: modreg_core::config
  Etiquette: Modreg Source Etiquette, Rust Profile v1.0
  ------------------------------------------------------------
  Purpose:
    Load user-level settings and the per-project module
    configuration file.

  Security / Safety Notes:
    Registry tokens may live in the settings file; they are
    never logged. The MODREG_TOKEN environment variable takes
    precedence over the file.

  Dependencies:
    serde + toml for parsing, dirs for the settings location.

  Operational Scope:
    Read once at start-up (settings) and by commands that need
    the module name (module configuration).

  Revision History:
    2026-03-02 MRG  Authored configuration layer.
  ------------------------------------------------------------
  Principles Observed:
    - Defaults for every optional setting
    - Explicit errors for explicit paths
============================================================*/

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cli_error::CliError;
use crate::error::{BoxError, ModregError, Result};
use crate::module_ref::ModuleRef;

/// File name of the per-project module configuration.
pub const MODULE_CONFIG_FILE: &str = "modreg.toml";

const TOKEN_ENV: &str = "MODREG_TOKEN";

/// User-level settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub registry: RegistryConfig,
    pub prompt: PromptConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub remote: String,
    pub base_url: Option<String>,
    pub token: Option<String>,
    /// Request timeout in seconds.
    pub timeout: u64,
    pub max_retries: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            remote: "modreg.dev".into(),
            base_url: None,
            token: None,
            timeout: 30,
            max_retries: 3,
        }
    }
}

impl RegistryConfig {
    /// API root for `remote`, honouring an explicit `base_url` override.
    pub fn base_url_for(&self, remote: &str) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{remote}/api/v1"),
        }
    }

    pub fn resolved_token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .or_else(|| self.token.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub max_attempts: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load settings from `path`, or from the default location when `None`.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load_from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|err| {
            ModregError::Config(format!("Failed to read {}: {err}", path.display()))
        })?;
        toml::from_str(&raw).map_err(|err| {
            ModregError::Config(format!("Failed to parse {}: {err}", path.display()))
        })
    }

    pub fn log_dir(&self) -> Option<&Path> {
        self.logging.dir.as_deref()
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("modreg").join("config.toml"))
}

/// Contents of `modreg.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn default_version() -> String {
    "v1".into()
}

impl ModuleConfig {
    pub fn new(name: Option<String>) -> Self {
        Self {
            version: default_version(),
            name,
        }
    }

    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(MODULE_CONFIG_FILE)
    }

    /// Read the module configuration from `dir`.
    pub fn load(dir: &Path) -> std::result::Result<Self, BoxError> {
        let (path, raw) = Self::read_raw(dir)?;
        Self::parse(&raw, &path).map_err(Into::into)
    }

    /// Read the configuration text from `dir` without parsing it.
    pub fn read_raw(dir: &Path) -> std::result::Result<(PathBuf, String), BoxError> {
        let path = Self::path_in(dir);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(Box::new(CliError::NoConfigFile))
            }
            Err(err) => {
                return Err(Box::new(ModregError::Filesystem(format!(
                    "Failed to read {}: {err}",
                    path.display()
                ))))
            }
        };
        Ok((path, raw))
    }

    pub fn parse(raw: &str, path: &Path) -> Result<Self> {
        toml::from_str(raw).map_err(|err| {
            ModregError::Config(format!("Failed to parse {}: {err}", path.display()))
        })
    }

    /// The configured module, parsed.
    pub fn module_name(&self) -> std::result::Result<ModuleRef, CliError> {
        match self.name.as_deref().map(str::trim) {
            None | Some("") => Err(CliError::NoModuleName),
            Some(name) => name.parse(),
        }
    }

    pub fn write(&self, dir: &Path) -> std::result::Result<PathBuf, BoxError> {
        let path = Self::path_in(dir);
        let rendered = toml::to_string(self)
            .map_err(|err| ModregError::Serialization(format!("Failed to render config: {err}")))?;
        fs::write(&path, rendered).map_err(|err| {
            ModregError::Filesystem(format!("Failed to write {}: {err}", path.display()))
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_module_config_is_no_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModuleConfig::load(dir.path()).unwrap_err();
        assert_eq!(CliError::find(err.as_ref()), Some(&CliError::NoConfigFile));
    }

    #[test]
    fn read_raw_returns_the_text_it_parses() {
        let dir = tempfile::tempdir().unwrap();
        let contents = "version = \"v1\"\nname = \"modreg.dev/acme/petapis\"\n";
        fs::write(dir.path().join(MODULE_CONFIG_FILE), contents).unwrap();
        let (path, raw) = ModuleConfig::read_raw(dir.path()).unwrap();
        assert_eq!(path, ModuleConfig::path_in(dir.path()));
        assert_eq!(raw, contents);
        assert!(ModuleConfig::parse(&raw, &path).is_ok());

        let err = ModuleConfig::read_raw(&dir.path().join("absent")).unwrap_err();
        assert_eq!(CliError::find(err.as_ref()), Some(&CliError::NoConfigFile));
    }

    #[test]
    fn blank_name_is_no_module_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(ModuleConfig::path_in(dir.path()), "version = \"v1\"\nname = \"  \"\n").unwrap();
        let config = ModuleConfig::load(dir.path()).unwrap();
        assert_eq!(config.module_name().unwrap_err(), CliError::NoModuleName);
    }

    #[test]
    fn written_config_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        ModuleConfig::new(Some("modreg.dev/acme/petapis".into()))
            .write(dir.path())
            .unwrap();
        let module = ModuleConfig::load(dir.path())
            .unwrap()
            .module_name()
            .unwrap();
        assert_eq!(module.owner(), "acme");
        assert_eq!(module.repository(), "petapis");
    }

    #[test]
    fn unparsable_name_is_module_ref_error() {
        let config = ModuleConfig::new(Some("acme".into()));
        assert_eq!(config.module_name().unwrap_err(), CliError::module_ref("acme"));
    }

    #[test]
    fn app_config_defaults_fill_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[registry]\nremote = \"registry.internal\"\n").unwrap();
        let config = AppConfig::load_from_optional_path(Some(&path)).unwrap();
        assert_eq!(config.registry.remote, "registry.internal");
        assert_eq!(config.registry.max_retries, 3);
        assert_eq!(config.prompt.max_attempts, 3);
        assert_eq!(
            config.registry.base_url_for("registry.internal"),
            "https://registry.internal/api/v1"
        );
    }

    #[test]
    fn explicit_missing_app_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            AppConfig::load_from_optional_path(Some(&missing)),
            Err(ModregError::Config(_))
        ));
    }
}
