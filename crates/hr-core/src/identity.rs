//! # Profile Resolution
//!
//! A profile route carries either a stable identifier or a handle in the
//! same slot. The token's shape picks exactly one lookup; a handle that
//! merely resembles an identifier is never retried as a handle.

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::User;
use crate::traits::DirectoryStore;

pub const MIN_HANDLE_CHARS: usize = 3;
pub const MAX_HANDLE_CHARS: usize = 32;

/// How a route token addresses a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKey<'a> {
    Id(Uuid),
    Handle(&'a str),
}

/// Classifies `token` by shape: the canonical 8-4-4-4-12 hex form is an
/// identifier, anything else is a handle. Other UUID spellings (braced,
/// un-hyphenated, urn) do not count.
pub fn profile_key(token: &str) -> ProfileKey<'_> {
    match parse_canonical(token) {
        Some(id) => ProfileKey::Id(id),
        None => ProfileKey::Handle(token),
    }
}

fn parse_canonical(token: &str) -> Option<Uuid> {
    let bytes = token.as_bytes();
    if bytes.len() != 36 {
        return None;
    }
    for (i, &b) in bytes.iter().enumerate() {
        let ok = match i {
            8 | 13 | 18 | 23 => b == b'-',
            _ => b.is_ascii_hexdigit(),
        };
        if !ok {
            return None;
        }
    }
    Uuid::parse_str(token).ok()
}

/// Resolves a profile token to its user record with a single lookup.
///
/// A store miss is `NotFound`; a store failure is `Internal`. The two are
/// never conflated, so a flaky backend cannot masquerade as a deleted user.
pub async fn resolve(store: &dyn DirectoryStore, token: &str) -> Result<User> {
    let found = match profile_key(token) {
        ProfileKey::Id(id) => store.find_user_by_id(id).await,
        ProfileKey::Handle(handle) => store.find_user_by_handle(handle).await,
    };
    match found {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(AppError::NotFound("user".into(), token.into())),
        Err(err) => Err(AppError::Internal(err.to_string())),
    }
}

/// Registration-time handle rules. The 32-character cap means a handle can
/// never take the canonical 36-character identifier shape, which keeps
/// profile routes unambiguous.
pub fn validate_handle(handle: &str) -> Result<()> {
    let chars = handle.chars().count();
    if !(MIN_HANDLE_CHARS..=MAX_HANDLE_CHARS).contains(&chars) {
        return Err(AppError::Validation(format!(
            "handles must be {MIN_HANDLE_CHARS}–{MAX_HANDLE_CHARS} characters"
        )));
    }
    if !handle
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AppError::Validation(
            "handles may only contain letters, digits, '_' and '-'".into(),
        ));
    }
    Ok(())
}
