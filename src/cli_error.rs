/*============================================================
  Modreg Project: modreg
  Module: modreg_core::cli_error
  Etiquette: Modreg Source Etiquette, Rust Profile v1.0
  ------------------------------------------------------------
  Purpose:
    Catalog of user-facing failures raised where they are
    detected, each with a fixed, actionable message.

  Security / Safety Notes:
    Messages interpolate user-supplied names only; tokens are
    referenced by identifier, never by secret.

  Dependencies:
    thiserror for message templates.

  Operational Scope:
    Returned by configuration, prompting, module reference and
    registry command code; passed through the interceptor.

  Revision History:
    2026-03-02 MRG  Authored domain error catalog.
  ------------------------------------------------------------
  Principles Observed:
    - One variant per recognised failure
    - Structural matching instead of string comparison
============================================================*/

use std::error::Error as StdError;

use thiserror::Error;

use crate::error::find_in_chain;

/// Anticipated failures with messages aimed at the person running the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliError {
    /// The module configuration has no `name`.
    #[error(r#"please specify a module name in your configuration file with the "name" key"#)]
    NoModuleName,
    /// The working directory has no module configuration.
    #[error(
        r#"please define a configuration file in the current directory; you can create one by running "modreg mod init""#
    )]
    NoConfigFile,
    #[error("could not parse {module_ref:?} as a module; please verify this is a valid reference")]
    ModuleRef { module_ref: String },
    #[error("did not receive an answer in {attempts} attempts")]
    TooManyEmptyAnswers { attempts: usize },
    #[error("--{flag_name} is required.")]
    FlagIsRequired { flag_name: String },
    #[error("an organization named {name:?} already exists")]
    OrganizationNameAlreadyExists { name: String },
    #[error("a repository named {name:?} already exists")]
    RepositoryNameAlreadyExists { name: String },
    #[error("a branch named {name:?} already exists")]
    BranchNameAlreadyExists { name: String },
    #[error(
        r#"an organization named {name:?} does not exist, use "modreg registry organization create" to create one"#
    )]
    OrganizationNotFound { name: String },
    #[error(
        r#"a repository named {name:?} does not exist, use "modreg registry repository create" to create one"#
    )]
    RepositoryNotFound { name: String },
    #[error("a token with ID {token_id:?} does not exist")]
    TokenNotFound { token_id: String },
    /// Annotations were already printed; only the exit status remains.
    #[error("")]
    FileAnnotation,
}

impl CliError {
    pub fn module_ref(module_ref: impl Into<String>) -> Self {
        Self::ModuleRef {
            module_ref: module_ref.into(),
        }
    }

    pub fn too_many_empty_answers(attempts: usize) -> Self {
        Self::TooManyEmptyAnswers { attempts }
    }

    pub fn flag_is_required(flag_name: impl Into<String>) -> Self {
        Self::FlagIsRequired {
            flag_name: flag_name.into(),
        }
    }

    pub fn organization_name_already_exists(name: impl Into<String>) -> Self {
        Self::OrganizationNameAlreadyExists { name: name.into() }
    }

    pub fn repository_name_already_exists(name: impl Into<String>) -> Self {
        Self::RepositoryNameAlreadyExists { name: name.into() }
    }

    pub fn branch_name_already_exists(name: impl Into<String>) -> Self {
        Self::BranchNameAlreadyExists { name: name.into() }
    }

    pub fn organization_not_found(name: impl Into<String>) -> Self {
        Self::OrganizationNotFound { name: name.into() }
    }

    pub fn repository_not_found(name: impl Into<String>) -> Self {
        Self::RepositoryNotFound { name: name.into() }
    }

    pub fn token_not_found(token_id: impl Into<String>) -> Self {
        Self::TokenNotFound {
            token_id: token_id.into(),
        }
    }

    /// Locate a catalog error anywhere in the chain rooted at `err`.
    pub fn find<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a CliError> {
        find_in_chain::<CliError>(err)
    }

    /// Whether this failure stems from malformed command-line input.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, CliError::FlagIsRequired { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;

    #[test]
    fn flag_error_names_flag() {
        let message = CliError::flag_is_required("foo").to_string();
        assert!(message.contains("--foo"));
        assert!(message.contains("required"));
        assert!(CliError::flag_is_required("foo").is_invalid_argument());
    }

    #[test]
    fn organization_not_found_suggests_creation() {
        let message = CliError::organization_not_found("acme").to_string();
        assert!(message.contains("\"acme\""));
        assert!(message.contains("modreg registry organization create"));
    }

    #[test]
    fn parameterised_messages() {
        assert_eq!(
            CliError::module_ref("not a ref").to_string(),
            r#"could not parse "not a ref" as a module; please verify this is a valid reference"#
        );
        assert_eq!(
            CliError::too_many_empty_answers(3).to_string(),
            "did not receive an answer in 3 attempts"
        );
        assert_eq!(
            CliError::branch_name_already_exists("main").to_string(),
            r#"a branch named "main" already exists"#
        );
        assert_eq!(
            CliError::token_not_found("tok-1").to_string(),
            r#"a token with ID "tok-1" does not exist"#
        );
        assert!(CliError::repository_not_found("acme/petapis")
            .to_string()
            .contains("modreg registry repository create"));
    }

    #[test]
    fn sentinels_match_structurally_through_boxes() {
        let err: BoxError = Box::new(CliError::NoConfigFile);
        assert_eq!(CliError::find(err.as_ref()), Some(&CliError::NoConfigFile));
        assert_ne!(CliError::find(err.as_ref()), Some(&CliError::NoModuleName));
    }

    #[test]
    fn file_annotation_is_silent() {
        assert!(CliError::FileAnnotation.to_string().is_empty());
    }
}
