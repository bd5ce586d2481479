//! # hr-backend-rest
//!
//! REST implementation of the store and auth ports against the hosted
//! backend: row endpoints under `/rest/v1` (PostgREST filter conventions,
//! embedded author select), auth endpoints under `/auth/v1`. One client
//! serves both ports since both are faces of the same backend.
//!
//! This module owns the wire↔domain mapping: row structs carry the
//! backend's column names and convert at the edge, so the rest of the
//! application never sees `username`/`post_type`/`date` spellings.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hr_core::feed::PostQuery;
use hr_core::models::{
    AccountKind, Actor, AuthorSummary, ClassYear, FeedPost, NewPost, Session, SignupProfile,
    StoredPost, User, UserPatch,
};
use hr_core::traits::{AuthGateway, DirectoryStore};

pub struct RestBackend {
    http: reqwest::Client,
    base: String,
    api_key: String,
}

impl RestBackend {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let mut base = base_url.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base,
            api_key: api_key.into(),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base)
    }

    fn with_keys(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.api_key).bearer_auth(&self.api_key)
    }

    async fn find_user(&self, filter: (&str, String)) -> anyhow::Result<Option<User>> {
        let rows: Vec<UserRow> = self
            .with_keys(self.http.get(self.rest_url("users")))
            .query(&[("select", "*"), ("limit", "1")])
            .query(&[filter])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(rows.into_iter().next().map(User::from))
    }
}

// ── Wire rows ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct UserRow {
    id: Uuid,
    username: String,
    phone_number: String,
    account_type: AccountKind,
    year: Option<ClassYear>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            handle: row.username,
            phone: row.phone_number,
            account: row.account_type,
            year: row.year,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthorRow {
    username: String,
    account_type: AccountKind,
    year: Option<ClassYear>,
}

impl From<AuthorRow> for AuthorSummary {
    fn from(row: AuthorRow) -> Self {
        AuthorSummary {
            handle: row.username,
            account: row.account_type,
            year: row.year,
        }
    }
}

/// `post_type` stays a raw string here on purpose: one anomalous row must
/// not fail the whole fetch.
#[derive(Debug, Deserialize)]
struct PostRow {
    id: Uuid,
    user_id: Uuid,
    post_type: String,
    description: String,
    subjects: Option<Vec<String>>,
    date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    user: Option<AuthorRow>,
}

impl PostRow {
    fn into_feed_post(self) -> Option<FeedPost> {
        let author = match self.user {
            Some(author) => AuthorSummary::from(author),
            None => {
                // Cascade artifacts: the owning row vanished mid-query.
                log::warn!("dropping post {} with no author row", self.id);
                return None;
            }
        };
        Some(FeedPost {
            post: StoredPost {
                id: self.id,
                author: self.user_id,
                kind: self.post_type,
                description: self.description,
                subjects: self.subjects,
                event_date: self.date,
                created_at: self.created_at,
            },
            author,
        })
    }
}

#[derive(Serialize)]
struct NewPostRow<'a> {
    user_id: Uuid,
    post_type: &'static str,
    description: &'a str,
    subjects: Option<&'a [String]>,
    date: Option<NaiveDate>,
}

/// Translates a declarative [`PostQuery`] into PostgREST parameters.
fn query_params(query: &PostQuery) -> Vec<(String, String)> {
    let mut params = vec![
        (
            "select".to_string(),
            "*,user:users(username,year,account_type)".to_string(),
        ),
        (
            "order".to_string(),
            if query.newest_first {
                "created_at.desc"
            } else {
                "created_at.asc"
            }
            .to_string(),
        ),
    ];
    if let Some(kind) = query.kind {
        params.push(("post_type".to_string(), format!("eq.{kind}")));
    }
    if let Some(author) = query.author {
        params.push(("user_id".to_string(), format!("eq.{author}")));
    }
    params
}

async fn ensure_ok(resp: reqwest::Response) -> anyhow::Result<()> {
    if resp.status().is_success() {
        return Ok(());
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    anyhow::bail!("backend returned {status}: {body}")
}

// ── DirectoryStore ──────────────────────────────────────────────────────────

#[async_trait]
impl DirectoryStore for RestBackend {
    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        self.find_user(("id", format!("eq.{id}"))).await
    }

    async fn find_user_by_handle(&self, handle: &str) -> anyhow::Result<Option<User>> {
        self.find_user(("username", format!("eq.{handle}"))).await
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> anyhow::Result<()> {
        let mut fields = serde_json::Map::new();
        if let Some(handle) = patch.handle {
            fields.insert("username".to_string(), handle.into());
        }
        if fields.is_empty() {
            return Ok(());
        }
        let resp = self
            .with_keys(self.http.patch(self.rest_url("users")))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(&serde_json::Value::Object(fields))
            .send()
            .await?;
        ensure_ok(resp).await
    }

    async fn delete_user(&self, id: Uuid) -> anyhow::Result<()> {
        // The posts go with the user via the store-side ON DELETE CASCADE.
        let resp = self
            .with_keys(self.http.delete(self.rest_url("users")))
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        ensure_ok(resp).await
    }

    async fn insert_post(&self, post: NewPost) -> anyhow::Result<()> {
        let row = NewPostRow {
            user_id: post.author,
            post_type: post.kind.as_str(),
            description: &post.description,
            subjects: post.subjects(),
            date: post.event_date(),
        };
        let resp = self
            .with_keys(self.http.post(self.rest_url("posts")))
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await?;
        ensure_ok(resp).await
    }

    async fn delete_post(&self, id: Uuid, owner: Uuid) -> anyhow::Result<()> {
        let resp = self
            .with_keys(self.http.delete(self.rest_url("posts")))
            .query(&[
                ("id", format!("eq.{id}")),
                ("user_id", format!("eq.{owner}")),
            ])
            .send()
            .await?;
        ensure_ok(resp).await
    }

    async fn query_posts(&self, query: PostQuery) -> anyhow::Result<Vec<FeedPost>> {
        let rows: Vec<PostRow> = self
            .with_keys(self.http.get(self.rest_url("posts")))
            .query(&query_params(&query))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(rows.into_iter().filter_map(PostRow::into_feed_post).collect())
    }
}

// ── AuthGateway ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    access_token: Option<String>,
    user: Option<AuthUser>,
}

/// Pulls the human-readable message out of an auth error body; the shape
/// varies by endpoint (`msg`, `message` or `error_description`).
async fn auth_error(resp: reqwest::Response) -> anyhow::Error {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| {
            ["msg", "message", "error_description"]
                .iter()
                .find_map(|key| value.get(key).and_then(|m| m.as_str()).map(str::to_owned))
        })
        .unwrap_or_else(|| format!("auth backend returned {status}"));
    anyhow::anyhow!(message)
}

#[async_trait]
impl AuthGateway for RestBackend {
    async fn sign_in(&self, email: &str, password: &str) -> anyhow::Result<Option<Session>> {
        let resp = self
            .with_keys(self.http.post(self.auth_url("token")))
            .query(&[("grant_type", "password")])
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        if matches!(
            resp.status(),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED
        ) {
            return Ok(None);
        }
        let session: SessionResponse = resp.error_for_status()?.json().await?;
        match (session.access_token, session.user) {
            (Some(access_token), Some(user)) => Ok(Some(Session {
                user_id: user.id,
                access_token,
            })),
            _ => anyhow::bail!("auth backend returned a session without a token"),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: SignupProfile,
    ) -> anyhow::Result<Session> {
        // The profile attributes ride along as signup metadata; the backend
        // materializes them into the users row.
        let payload = serde_json::json!({
            "email": email,
            "password": password,
            "data": {
                "username": profile.handle,
                "phone_number": profile.phone,
                "account_type": profile.account.as_str(),
                "year": profile.year.map(|y| y.as_str()),
            }
        });
        let resp = self
            .with_keys(self.http.post(self.auth_url("signup")))
            .json(&payload)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(auth_error(resp).await);
        }
        let session: SessionResponse = resp.json().await?;
        match (session.access_token, session.user) {
            (Some(access_token), Some(user)) => Ok(Session {
                user_id: user.id,
                access_token,
            }),
            // Email confirmation is enabled backend-side.
            _ => anyhow::bail!("account created; confirm your email, then sign in"),
        }
    }

    async fn sign_out(&self, access_token: &str) -> anyhow::Result<()> {
        let resp = self
            .http
            .post(self.auth_url("logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        // An already-expired token is as signed out as it gets.
        if resp.status().is_success() || resp.status() == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        Err(auth_error(resp).await)
    }

    async fn actor_for(&self, access_token: &str) -> anyhow::Result<Option<Actor>> {
        let resp = self
            .http
            .get(self.auth_url("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        if matches!(
            resp.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }
        let user: AuthUser = resp.error_for_status()?.json().await?;
        Ok(Some(Actor { user_id: user.id }))
    }
}
