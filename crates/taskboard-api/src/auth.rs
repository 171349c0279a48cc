//! Caller identification.
//!
//! The authority proves itself with HTTP Basic credentials checked against an
//! argon2 hash. Participants name themselves with the [`CALLER_HEADER`]
//! header; the authority's identity can never be claimed that way.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use taskboard_core::{Identity, store::TrackerStore};

use crate::{AppState, error::ApiError};

/// Header carrying a participant's identity.
pub const CALLER_HEADER: &str = "x-caller";

/// Credentials accepted for the authority.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// The identity on whose behalf a request runs.
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

/// Check Basic credentials against `config`.
fn verify_basic(value: &str, config: &AuthConfig) -> Result<(), ApiError> {
  let denied = || ApiError::Unauthenticated("invalid credentials".into());

  let encoded = value.strip_prefix("Basic ").ok_or_else(denied)?;
  let decoded = B64.decode(encoded).map_err(|_| denied())?;
  let creds = std::str::from_utf8(&decoded).map_err(|_| denied())?;
  let (username, password) = creds.split_once(':').ok_or_else(denied)?;

  if username != config.username {
    return Err(denied());
  }

  let parsed_hash = PasswordHash::new(&config.password_hash).map_err(|_| denied())?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| denied())
}

/// Resolve the caller from request headers.
pub fn resolve_caller(
  headers: &HeaderMap,
  config: &AuthConfig,
  authority: &Identity,
) -> Result<Identity, ApiError> {
  if let Some(value) = headers.get(header::AUTHORIZATION) {
    let value = value
      .to_str()
      .map_err(|_| ApiError::Unauthenticated("malformed authorization header".into()))?;
    verify_basic(value, config)?;
    return Ok(authority.clone());
  }

  let raw = headers
    .get(CALLER_HEADER)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(|| ApiError::Unauthenticated(format!("missing {CALLER_HEADER} header")))?;
  let identity = Identity::new(raw).map_err(|e| ApiError::Unauthenticated(e.to_string()))?;

  if &identity == authority {
    return Err(ApiError::Unauthenticated(
      "the authority must authenticate with credentials".into(),
    ));
  }
  Ok(identity)
}

impl<S> FromRequestParts<AppState<S>> for Caller
where
  S: TrackerStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let identity = resolve_caller(&parts.headers, &state.auth, state.store.authority())?;
    Ok(Caller(identity))
  }
}

#[cfg(test)]
mod tests {
  use argon2::{PasswordHasher, password_hash::SaltString};
  use axum::http::HeaderValue;
  use rand_core::OsRng;

  use super::*;

  fn config(password: &str) -> AuthConfig {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    AuthConfig { username: "mentor".into(), password_hash: hash }
  }

  fn basic(user: &str, pass: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Basic {}", B64.encode(format!("{user}:{pass}")))).unwrap()
  }

  fn authority() -> Identity { Identity::new("mentor").unwrap() }

  #[test]
  fn correct_credentials_resolve_to_authority() {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, basic("mentor", "secret"));
    let who = resolve_caller(&headers, &config("secret"), &authority()).unwrap();
    assert_eq!(who, authority());
  }

  #[test]
  fn wrong_password_rejected() {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, basic("mentor", "wrong"));
    let err = resolve_caller(&headers, &config("secret"), &authority()).unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated(_)));
  }

  #[test]
  fn bad_credentials_do_not_fall_back_to_header() {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic !!!not-base64!!!"));
    headers.insert(CALLER_HEADER, HeaderValue::from_static("alice"));
    assert!(resolve_caller(&headers, &config("secret"), &authority()).is_err());
  }

  #[test]
  fn participant_header() {
    let mut headers = HeaderMap::new();
    headers.insert(CALLER_HEADER, HeaderValue::from_static("alice"));
    let who = resolve_caller(&headers, &config("secret"), &authority()).unwrap();
    assert_eq!(who.as_str(), "alice");
  }

  #[test]
  fn authority_cannot_be_claimed_by_header() {
    let mut headers = HeaderMap::new();
    headers.insert(CALLER_HEADER, HeaderValue::from_static("mentor"));
    assert!(resolve_caller(&headers, &config("secret"), &authority()).is_err());
  }

  #[test]
  fn missing_identity_rejected() {
    let headers = HeaderMap::new();
    let err = resolve_caller(&headers, &config("secret"), &authority()).unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated(_)));
  }
}
