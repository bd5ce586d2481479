//! # Feed Queries
//!
//! Post fetches are described declaratively and handed to a
//! [`DirectoryStore`](crate::traits::DirectoryStore) implementation to
//! execute, which keeps the composition testable without a backend.

use uuid::Uuid;

use crate::models::PostKind;

/// The feed's four-way filter control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFilter {
    All,
    Kind(PostKind),
}

impl FeedFilter {
    /// Lenient parse for the `?filter=` query parameter: anything that is
    /// not a known kind shows the unfiltered feed.
    pub fn from_param(param: &str) -> FeedFilter {
        match PostKind::parse(param) {
            Some(kind) => FeedFilter::Kind(kind),
            None => FeedFilter::All,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            FeedFilter::All => "all",
            FeedFilter::Kind(kind) => kind.as_str(),
        }
    }
}

/// A declarative post fetch. Every query returns posts joined with their
/// author summary; predicates are equality-only and optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    pub kind: Option<PostKind>,
    pub author: Option<Uuid>,
    pub newest_first: bool,
}

/// The community feed: newest first, optionally narrowed to one kind.
/// No limit or pagination.
pub fn feed_query(filter: FeedFilter) -> PostQuery {
    PostQuery {
        kind: match filter {
            FeedFilter::All => None,
            FeedFilter::Kind(kind) => Some(kind),
        },
        author: None,
        newest_first: true,
    }
}

/// One user's posts for their profile page, newest first.
pub fn author_query(author: Uuid) -> PostQuery {
    PostQuery {
        kind: None,
        author: Some(author),
        newest_first: true,
    }
}
