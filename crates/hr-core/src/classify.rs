//! # Post Classification
//!
//! A post's kind is derived from its author, never chosen by the caller:
//! hosts announce activities, freshmen and sophomores request tutoring,
//! juniors and seniors offer it. The kind decides which optional field the
//! post carries.

use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::{AccountKind, ClassYear, NewPost, PostBody, PostKind, User};

pub const MAX_DESCRIPTION_CHARS: usize = 500;
pub const MAX_SUBJECTS: usize = 5;
pub const MAX_SUBJECT_CHARS: usize = 20;

/// Which optional field is legal (and required) for a classified kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// 0–5 subject tags, no event date.
    Subjects,
    /// An event date, no subject tags.
    EventDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: PostKind,
    pub fields: FieldRule,
}

/// Classifies a prospective post by its author's account and year.
///
/// Total over the declared domain: a student record without an academic
/// year is invalid input, not a silent default.
pub fn classify(account: AccountKind, year: Option<ClassYear>) -> Result<Classification> {
    match account {
        AccountKind::ExtracurricularHost => Ok(Classification {
            kind: PostKind::Extracurricular,
            fields: FieldRule::EventDate,
        }),
        AccountKind::Student => {
            let year = year.ok_or_else(|| {
                AppError::Validation("student accounts must carry an academic year".into())
            })?;
            let kind = if year.is_lowerclassman() {
                PostKind::TutorRequest
            } else {
                PostKind::TutorOffer
            };
            Ok(Classification {
                kind,
                fields: FieldRule::Subjects,
            })
        }
    }
}

/// Raw form input for a new post, before classification.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub description: String,
    pub subjects: Vec<String>,
    pub event_date: Option<NaiveDate>,
}

/// Validates `draft` against the author's classification and produces the
/// write-path record. The one populated optional field is picked here;
/// supplying the field the rule forbids is rejected outright.
pub fn compose(author: &User, draft: PostDraft) -> Result<NewPost> {
    let classification = classify(author.account, author.year)?;

    let description = draft.description.trim().to_string();
    if description.is_empty() {
        return Err(AppError::Validation("description must not be empty".into()));
    }
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(AppError::Validation(format!(
            "description is longer than {MAX_DESCRIPTION_CHARS} characters"
        )));
    }

    let body = match classification.fields {
        FieldRule::Subjects => {
            if draft.event_date.is_some() {
                return Err(AppError::Validation(
                    "an event date only applies to activity posts".into(),
                ));
            }
            PostBody::Tutoring {
                subjects: checked_subjects(draft.subjects)?,
            }
        }
        FieldRule::EventDate => {
            if !draft.subjects.is_empty() {
                return Err(AppError::Validation(
                    "subject tags only apply to tutoring posts".into(),
                ));
            }
            let date = draft.event_date.ok_or_else(|| {
                AppError::Validation("activity posts require an event date".into())
            })?;
            PostBody::Activity { date }
        }
    };

    Ok(NewPost {
        author: author.id,
        kind: classification.kind,
        description,
        body,
    })
}

/// Trims tags, drops empties, and enforces the count and length caps.
/// Duplicates are permitted.
fn checked_subjects(raw: Vec<String>) -> Result<Vec<String>> {
    let subjects: Vec<String> = raw
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if subjects.len() > MAX_SUBJECTS {
        return Err(AppError::Validation(format!(
            "at most {MAX_SUBJECTS} subjects per post"
        )));
    }
    for subject in &subjects {
        if subject.chars().count() > MAX_SUBJECT_CHARS {
            return Err(AppError::Validation(format!(
                "subject {subject:?} is longer than {MAX_SUBJECT_CHARS} characters"
            )));
        }
    }
    Ok(subjects)
}
