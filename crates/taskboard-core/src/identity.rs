//! Caller and participant identities.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An opaque caller identity. Always non-empty and free of surrounding
/// whitespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
  pub fn new(raw: impl AsRef<str>) -> Result<Self> {
    let trimmed = raw.as_ref().trim();
    if trimmed.is_empty() {
      return Err(Error::validation("identity must not be empty"));
    }
    Ok(Self(trimmed.to_owned()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Identity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for Identity {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::new(s) }
}

impl TryFrom<String> for Identity {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::new(value) }
}

impl From<Identity> for String {
  fn from(value: Identity) -> Self { value.0 }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn trims_surrounding_whitespace() {
    let id = Identity::new("  alice ").unwrap();
    assert_eq!(id.as_str(), "alice");
  }

  #[test]
  fn rejects_blank() {
    assert!(matches!(Identity::new("   "), Err(Error::Validation(_))));
  }

  #[test]
  fn deserialises_through_validation() {
    let id: Identity = serde_json::from_str("\"bob\"").unwrap();
    assert_eq!(id.to_string(), "bob");
    assert!(serde_json::from_str::<Identity>("\"\"").is_err());
  }
}
