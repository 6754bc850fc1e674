/*============================================================
  Modreg Project: modreg
  Module: modreg_core::module_ref
  Etiquette: Modreg Source Etiquette, Rust Profile v1.0
  ------------------------------------------------------------
  Purpose:
    Parse module references of the form
    remote/owner/repository[:reference].

  Security / Safety Notes:
    Pure parsing; no I/O.

  Dependencies:
    None beyond std.

  Operational Scope:
    Used by configuration loading and registry commands.

  Revision History:
    2026-03-02 MRG  Added module reference parsing.
  ------------------------------------------------------------
  Principles Observed:
    - Reject ambiguous input with a single actionable error
============================================================*/

use std::fmt;
use std::str::FromStr;

use crate::cli_error::CliError;

/// Fully qualified module identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRef {
    remote: String,
    owner: String,
    repository: String,
    reference: Option<String>,
}

impl ModuleRef {
    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// `owner/repository`, the name the registry knows the repository by.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repository)
    }
}

impl FromStr for ModuleRef {
    type Err = CliError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || CliError::module_ref(input);

        // Only the last segment carries a reference; the remote may hold a port.
        let last_start = input.rfind('/').map_or(0, |slash| slash + 1);
        let (path, reference) = match input[last_start..].find(':') {
            Some(offset) => {
                let colon = last_start + offset;
                match &input[colon + 1..] {
                    "" => return Err(invalid()),
                    reference => (&input[..colon], Some(reference.to_string())),
                }
            }
            None => (input, None),
        };

        let segments: Vec<&str> = path.split('/').collect();
        let [remote, owner, repository] = segments.as_slice() else {
            return Err(invalid());
        };
        if [remote, owner, repository]
            .iter()
            .any(|segment| segment.is_empty() || segment.chars().any(char::is_whitespace))
        {
            return Err(invalid());
        }
        if owner.contains(':') {
            return Err(invalid());
        }

        Ok(Self {
            remote: remote.to_string(),
            owner: owner.to_string(),
            repository: repository.to_string(),
            reference,
        })
    }
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.remote, self.owner, self.repository)?;
        if let Some(reference) = &self.reference {
            write!(f, ":{reference}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_reference() {
        let module: ModuleRef = "modreg.dev/acme/petapis".parse().unwrap();
        assert_eq!(module.remote(), "modreg.dev");
        assert_eq!(module.full_name(), "acme/petapis");
        assert_eq!(module.reference(), None);
    }

    #[test]
    fn parses_and_displays_reference_suffix() {
        let module: ModuleRef = "modreg.dev/acme/petapis:main".parse().unwrap();
        assert_eq!(module.reference(), Some("main"));
        assert_eq!(module.to_string(), "modreg.dev/acme/petapis:main");
    }

    #[test]
    fn remotes_may_carry_a_port() {
        let module: ModuleRef = "localhost:8080/acme/petapis".parse().unwrap();
        assert_eq!(module.remote(), "localhost:8080");
        assert_eq!(module.full_name(), "acme/petapis");
        assert_eq!(module.reference(), None);

        let module: ModuleRef = "localhost:8080/acme/petapis:main".parse().unwrap();
        assert_eq!(module.remote(), "localhost:8080");
        assert_eq!(module.reference(), Some("main"));
        assert_eq!(module.to_string(), "localhost:8080/acme/petapis:main");
    }

    #[test]
    fn rejects_malformed_references() {
        for input in [
            "",
            "acme/petapis",
            "modreg.dev/acme/petapis/extra",
            "modreg.dev//petapis",
            "modreg.dev/acme/petapis:",
            "modreg.dev/ac me/petapis",
            "modreg.dev/ac:me/petapis",
        ] {
            assert_eq!(
                input.parse::<ModuleRef>().unwrap_err(),
                CliError::module_ref(input),
                "{input:?} should not parse"
            );
        }
    }
}
