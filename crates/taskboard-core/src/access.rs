//! Role guards. Each mutating operation evaluates these before touching any
//! state.

use crate::{Error, Identity, Result, participant::Participant, record::Record};

/// Fails with [`Error::Unauthorized`] unless `caller` is the authority.
pub fn require_authority(caller: &Identity, authority: &Identity) -> Result<()> {
  if caller == authority { Ok(()) } else { Err(Error::Unauthorized) }
}

/// Fails with [`Error::Unauthorized`] unless `caller` is the record's assignee.
pub fn require_assignee(caller: &Identity, record: &Record) -> Result<()> {
  if caller == &record.assignee { Ok(()) } else { Err(Error::Unauthorized) }
}

/// Fails with [`Error::Unauthorized`] unless `profile` exists and is active.
pub fn require_active(profile: Option<&Participant>) -> Result<&Participant> {
  match profile {
    Some(p) if p.active => Ok(p),
    _ => Err(Error::Unauthorized),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn authority_check() {
    let mentor = Identity::new("mentor").unwrap();
    let alice = Identity::new("alice").unwrap();
    assert!(require_authority(&mentor, &mentor).is_ok());
    assert!(matches!(require_authority(&alice, &mentor), Err(Error::Unauthorized)));
  }

  #[test]
  fn missing_profile_is_not_active() {
    assert!(matches!(require_active(None), Err(Error::Unauthorized)));
  }
}
