//! # hr-store-memory
//!
//! In-process implementation of both ports with the hosted backend's
//! observable semantics: author join, newest-first ordering, equality
//! filters, cascade on account deletion, owner-scoped post deletion, and
//! unique handles/emails. Backs the integration tests and the
//! `store-memory` build of the binary.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use hr_core::feed::PostQuery;
use hr_core::models::{
    Actor, AuthorSummary, FeedPost, NewPost, Session, SignupProfile, StoredPost, User, UserPatch,
};
use hr_core::traits::{AuthGateway, DirectoryStore};

struct Credentials {
    password: String,
    user_id: Uuid,
}

#[derive(Default)]
pub struct MemoryBackend {
    users: DashMap<Uuid, User>,
    posts: DashMap<Uuid, StoredPost>,
    /// email → credentials
    accounts: DashMap<String, Credentials>,
    /// access token → user id
    sessions: DashMap<String, Uuid>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plants a user row directly, bypassing signup validation — for tests
    /// that need records the write path would refuse.
    pub fn seed_user(&self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Plants a post row directly, bypassing classification — for tests
    /// exercising historical anomalies.
    pub fn seed_post(&self, post: StoredPost) {
        self.posts.insert(post.id, post);
    }

    fn handle_taken(&self, handle: &str, not_by: Option<Uuid>) -> bool {
        self.users
            .iter()
            .any(|user| user.handle == handle && Some(user.id) != not_by)
    }
}

#[async_trait]
impl DirectoryStore for MemoryBackend {
    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.get(&id).map(|user| user.value().clone()))
    }

    async fn find_user_by_handle(&self, handle: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|user| user.handle == handle)
            .map(|user| user.value().clone()))
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> anyhow::Result<()> {
        if let Some(handle) = patch.handle {
            // The unique index the hosted backend would enforce.
            if self.handle_taken(&handle, Some(id)) {
                anyhow::bail!("duplicate username {handle:?}");
            }
            if let Some(mut user) = self.users.get_mut(&id) {
                user.handle = handle;
            }
        }
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> anyhow::Result<()> {
        self.users.remove(&id);
        self.posts.retain(|_, post| post.author != id);
        self.accounts.retain(|_, creds| creds.user_id != id);
        self.sessions.retain(|_, user_id| *user_id != id);
        Ok(())
    }

    async fn insert_post(&self, post: NewPost) -> anyhow::Result<()> {
        if !self.users.contains_key(&post.author) {
            anyhow::bail!("unknown author {}", post.author);
        }
        let id = Uuid::new_v4();
        self.posts.insert(
            id,
            StoredPost {
                id,
                author: post.author,
                kind: post.kind.as_str().to_string(),
                description: post.description.clone(),
                subjects: post.subjects().map(<[String]>::to_vec),
                event_date: post.event_date(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn delete_post(&self, id: Uuid, owner: Uuid) -> anyhow::Result<()> {
        // No-op unless `owner` authored the post, like the backend's
        // filtered DELETE.
        self.posts.remove_if(&id, |_, post| post.author == owner);
        Ok(())
    }

    async fn query_posts(&self, query: PostQuery) -> anyhow::Result<Vec<FeedPost>> {
        let mut entries: Vec<FeedPost> = self
            .posts
            .iter()
            .filter(|post| {
                query
                    .kind
                    .map(|kind| post.kind == kind.as_str())
                    .unwrap_or(true)
                    && query
                        .author
                        .map(|author| post.author == author)
                        .unwrap_or(true)
            })
            .filter_map(|post| {
                let author = self.users.get(&post.author)?;
                Some(FeedPost {
                    post: post.value().clone(),
                    author: AuthorSummary {
                        handle: author.handle.clone(),
                        account: author.account,
                        year: author.year,
                    },
                })
            })
            .collect();
        if query.newest_first {
            entries.sort_by(|a, b| b.post.created_at.cmp(&a.post.created_at));
        } else {
            entries.sort_by(|a, b| a.post.created_at.cmp(&b.post.created_at));
        }
        Ok(entries)
    }
}

#[async_trait]
impl AuthGateway for MemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> anyhow::Result<Option<Session>> {
        let Some(creds) = self.accounts.get(email) else {
            return Ok(None);
        };
        if creds.password != password {
            return Ok(None);
        }
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(token.clone(), creds.user_id);
        Ok(Some(Session {
            user_id: creds.user_id,
            access_token: token,
        }))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: SignupProfile,
    ) -> anyhow::Result<Session> {
        if self.accounts.contains_key(email) {
            anyhow::bail!("email already registered");
        }
        if self.handle_taken(&profile.handle, None) {
            anyhow::bail!("duplicate username {:?}", profile.handle);
        }
        let user_id = Uuid::new_v4();
        self.users.insert(
            user_id,
            User {
                id: user_id,
                handle: profile.handle,
                phone: profile.phone,
                account: profile.account,
                year: profile.year,
                created_at: Utc::now(),
            },
        );
        self.accounts.insert(
            email.to_string(),
            Credentials {
                password: password.to_string(),
                user_id,
            },
        );
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(token.clone(), user_id);
        Ok(Session {
            user_id,
            access_token: token,
        })
    }

    async fn sign_out(&self, access_token: &str) -> anyhow::Result<()> {
        self.sessions.remove(access_token);
        Ok(())
    }

    async fn actor_for(&self, access_token: &str) -> anyhow::Result<Option<Actor>> {
        Ok(self
            .sessions
            .get(access_token)
            .map(|user_id| Actor { user_id: *user_id }))
    }
}
