//! Shared fixtures for the integration tests.

use chrono::{NaiveDate, Utc};
use hr_core::models::{AccountKind, ClassYear, StoredPost, User};
use uuid::Uuid;

pub fn student(handle: &str, year: ClassYear) -> User {
    User {
        id: Uuid::new_v4(),
        handle: handle.to_string(),
        phone: "555-0100".to_string(),
        account: AccountKind::Student,
        year: Some(year),
        created_at: Utc::now(),
    }
}

pub fn host(handle: &str) -> User {
    User {
        id: Uuid::new_v4(),
        handle: handle.to_string(),
        phone: "555-0101".to_string(),
        account: AccountKind::ExtracurricularHost,
        year: None,
        created_at: Utc::now(),
    }
}

/// A raw stored row, for planting records the validated write path would
/// refuse.
pub fn stored_post(
    author: Uuid,
    kind: &str,
    subjects: Option<Vec<String>>,
    event_date: Option<NaiveDate>,
) -> StoredPost {
    StoredPost {
        id: Uuid::new_v4(),
        author,
        kind: kind.to_string(),
        description: "fixture body".to_string(),
        subjects,
        event_date,
        created_at: Utc::now(),
    }
}
