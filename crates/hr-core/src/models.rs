//! # Domain Models
//!
//! Core entities of Homeroom. Identifiers are assigned by the hosted
//! backend; this application only ever reads them back.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Account category, fixed at signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Student,
    ExtracurricularHost,
}

impl AccountKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Self::Student),
            "extracurricular_host" => Some(Self::ExtracurricularHost),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::ExtracurricularHost => "extracurricular_host",
        }
    }
}

/// Academic year; present iff the account is a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassYear {
    Freshman,
    Sophomore,
    Junior,
    Senior,
}

impl ClassYear {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "freshman" => Some(Self::Freshman),
            "sophomore" => Some(Self::Sophomore),
            "junior" => Some(Self::Junior),
            "senior" => Some(Self::Senior),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Freshman => "freshman",
            Self::Sophomore => "sophomore",
            Self::Junior => "junior",
            Self::Senior => "senior",
        }
    }

    /// Freshmen and sophomores request tutoring; juniors and seniors offer it.
    pub fn is_lowerclassman(&self) -> bool {
        matches!(self, Self::Freshman | Self::Sophomore)
    }
}

impl fmt::Display for ClassYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A post's category. Derived from the author at creation time, never
/// chosen by the caller, immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostKind {
    TutorRequest,
    TutorOffer,
    Extracurricular,
}

impl PostKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tutor_request" => Some(Self::TutorRequest),
            "tutor_offer" => Some(Self::TutorOffer),
            "extracurricular" => Some(Self::Extracurricular),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TutorRequest => "tutor_request",
            Self::TutorOffer => "tutor_offer",
            Self::Extracurricular => "extracurricular",
        }
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Human-chosen unique display name, distinct from `id`.
    pub handle: String,
    pub phone: String,
    pub account: AccountKind,
    pub year: Option<ClassYear>,
    pub created_at: DateTime<Utc>,
}

/// Author fields joined onto every fetched post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub handle: String,
    pub account: AccountKind,
    pub year: Option<ClassYear>,
}

/// A post as it exists in the store.
///
/// `kind` stays a raw string so rows that predate or contradict the current
/// classification rules still deserialize; [`StoredPost::parsed_kind`] is
/// the validating view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPost {
    pub id: Uuid,
    pub author: Uuid,
    pub kind: String,
    pub description: String,
    pub subjects: Option<Vec<String>>,
    pub event_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl StoredPost {
    pub fn parsed_kind(&self) -> Result<PostKind> {
        PostKind::parse(&self.kind)
            .ok_or_else(|| AppError::Integrity(format!("unknown post kind {:?}", self.kind)))
    }
}

/// The joined row shape every post query returns.
#[derive(Debug, Clone)]
pub struct FeedPost {
    pub post: StoredPost,
    pub author: AuthorSummary,
}

/// Category-specific payload of a new post. The tagged representation makes
/// "exactly one of subjects or event date" impossible to violate on the
/// write path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostBody {
    Tutoring { subjects: Vec<String> },
    Activity { date: NaiveDate },
}

/// A fully classified post, ready to persist.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author: Uuid,
    pub kind: PostKind,
    pub description: String,
    pub body: PostBody,
}

impl NewPost {
    pub fn subjects(&self) -> Option<&[String]> {
        match &self.body {
            PostBody::Tutoring { subjects } => Some(subjects),
            PostBody::Activity { .. } => None,
        }
    }

    pub fn event_date(&self) -> Option<NaiveDate> {
        match &self.body {
            PostBody::Tutoring { .. } => None,
            PostBody::Activity { date } => Some(*date),
        }
    }
}

/// Field-level update to a user record.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub handle: Option<String>,
}

/// Profile attributes captured at signup and materialized into the user
/// record by the auth backend.
#[derive(Debug, Clone)]
pub struct SignupProfile {
    pub handle: String,
    pub phone: String,
    pub account: AccountKind,
    pub year: Option<ClassYear>,
}

/// An authenticated backend session.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub access_token: String,
}

/// The current signed-in actor, threaded explicitly into every write path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
}
