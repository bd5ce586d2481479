//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be wired into the binary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::feed::PostQuery;
use crate::models::{Actor, FeedPost, NewPost, Session, SignupProfile, User, UserPatch};

/// Data persistence contract for users and posts.
///
/// `Ok(None)` means "no such row". An `Err` is a transport/backend failure
/// and must never be interpreted as a missing record.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    // User operations
    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_user_by_handle(&self, handle: &str) -> anyhow::Result<Option<User>>;
    async fn update_user(&self, id: Uuid, patch: UserPatch) -> anyhow::Result<()>;
    /// Deletes the account; the store cascades to the user's posts.
    async fn delete_user(&self, id: Uuid) -> anyhow::Result<()>;

    // Post operations
    async fn insert_post(&self, post: NewPost) -> anyhow::Result<()>;
    /// Owner-scoped delete: removes the post only when `owner` authored it.
    async fn delete_post(&self, id: Uuid, owner: Uuid) -> anyhow::Result<()>;
    async fn query_posts(&self, query: PostQuery) -> anyhow::Result<Vec<FeedPost>>;
}

/// Identity and session contract, backed entirely by the hosted auth service.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// `Ok(None)` means the credentials were rejected.
    async fn sign_in(&self, email: &str, password: &str) -> anyhow::Result<Option<Session>>;

    /// Registers credentials plus the profile attributes the backend turns
    /// into the user record.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: SignupProfile,
    ) -> anyhow::Result<Session>;

    async fn sign_out(&self, access_token: &str) -> anyhow::Result<()>;

    /// Resolves a session token to the current actor; `Ok(None)` for an
    /// expired or unknown token.
    async fn actor_for(&self, access_token: &str) -> anyhow::Result<Option<Actor>>;
}
