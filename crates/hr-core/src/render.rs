//! # Post Display Semantics
//!
//! Maps a stored post to its card view model. Write-time invariants are
//! re-checked rather than assumed: a record whose optional fields disagree
//! with its kind renders without the mismatched block, and a record with an
//! unknown kind renders author and body alone.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{ClassYear, FeedPost, PostKind, StoredPost};

/// Color token for a kind badge; the UI maps each to a CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Accent,
}

impl Tone {
    pub fn css_class(&self) -> &'static str {
        match self {
            Tone::Info => "badge-info",
            Tone::Success => "badge-success",
            Tone::Accent => "badge-accent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub label: &'static str,
    pub tone: Tone,
}

/// Fixed badge mapping, total over the three kinds.
pub fn badge(kind: PostKind) -> Badge {
    match kind {
        PostKind::TutorRequest => Badge {
            label: "Requesting Help",
            tone: Tone::Info,
        },
        PostKind::TutorOffer => Badge {
            label: "Offering Help",
            tone: Tone::Success,
        },
        PostKind::Extracurricular => Badge {
            label: "Activity",
            tone: Tone::Accent,
        },
    }
}

/// The kind-specific block of a card, when the stored record actually
/// carries the field its kind calls for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailBlock {
    Subjects(Vec<String>),
    EventDate(NaiveDate),
}

/// Selects the optional block for a post of known kind. A missing or
/// mismatched field is omitted, never an error.
pub fn detail_block(kind: PostKind, post: &StoredPost) -> Option<DetailBlock> {
    match kind {
        PostKind::TutorRequest | PostKind::TutorOffer => post
            .subjects
            .as_ref()
            .filter(|subjects| !subjects.is_empty())
            .map(|subjects| DetailBlock::Subjects(subjects.clone())),
        PostKind::Extracurricular => post.event_date.map(DetailBlock::EventDate),
    }
}

/// View model for one feed entry.
#[derive(Debug, Clone)]
pub struct PostCard {
    pub id: Uuid,
    pub author_handle: String,
    pub author_year: Option<ClassYear>,
    pub created_at: DateTime<Utc>,
    pub description: String,
    pub badge: Option<Badge>,
    pub detail: Option<DetailBlock>,
}

impl PostCard {
    pub fn posted_label(&self) -> String {
        self.created_at.format("%b %d, %Y").to_string()
    }
}

/// Builds the card for a fetched post. An unknown stored kind is an
/// integrity anomaly: the card keeps author and body, drops the badge and
/// detail block, and the anomaly is traced once.
pub fn card(entry: &FeedPost) -> PostCard {
    let (badge, detail) = match entry.post.parsed_kind() {
        Ok(kind) => (Some(self::badge(kind)), detail_block(kind, &entry.post)),
        Err(err) => {
            log::warn!("degrading post {}: {err}", entry.post.id);
            (None, None)
        }
    };
    PostCard {
        id: entry.post.id,
        author_handle: entry.author.handle.clone(),
        author_year: entry.author.year,
        created_at: entry.post.created_at,
        description: entry.post.description.clone(),
        badge,
        detail,
    }
}
