//! # hr-api Handlers
//!
//! Coordinates the flow between HTTP requests and the core ports: resolve
//! the actor from the session, run the relevant core component, execute the
//! one store round-trip, render a template or redirect.

use std::fmt;
use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use askama::Template;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use hr_core::classify::{self, Classification, PostDraft};
use hr_core::error::AppError;
use hr_core::feed::{self, FeedFilter};
use hr_core::identity;
use hr_core::models::{AccountKind, Actor, ClassYear, PostKind, SignupProfile, User, UserPatch};
use hr_core::render;
use hr_core::traits::{AuthGateway, DirectoryStore};
use hr_ui::{AuthTemplate, FeedTemplate, PostFormTemplate, ProfileTemplate, SettingsTemplate};

use crate::session;

/// State shared across all Actix-web workers. `Arc` rather than `Box` so a
/// single plugin instance can serve both ports.
pub struct AppState {
    pub store: Arc<dyn DirectoryStore>,
    pub auth: Arc<dyn AuthGateway>,
}

/// Wraps [`AppError`] so handlers can use `?`. Each variant maps to exactly
/// one HTTP response; `Internal` is a 502, never a not-found page.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        PageError(err)
    }
}

impl ResponseError for PageError {
    fn error_response(&self) -> HttpResponse {
        match &self.0 {
            AppError::NotFound(_, _) => HttpResponse::NotFound()
                .content_type("text/plain; charset=utf-8")
                .body("Not found."),
            AppError::Unauthorized(_) => see_other("/auth"),
            AppError::Validation(msg) => HttpResponse::BadRequest()
                .content_type("text/plain; charset=utf-8")
                .body(msg.clone()),
            AppError::Conflict(msg) => HttpResponse::Conflict()
                .content_type("text/plain; charset=utf-8")
                .body(msg.clone()),
            AppError::Integrity(msg) => {
                log::error!("integrity error reached the page layer: {msg}");
                HttpResponse::InternalServerError()
                    .content_type("text/plain; charset=utf-8")
                    .body("Something went wrong.")
            }
            AppError::Internal(msg) => {
                log::error!("backend failure: {msg}");
                HttpResponse::BadGateway()
                    .content_type("text/plain; charset=utf-8")
                    .body("Something went wrong talking to the backend. Please try again.")
            }
        }
    }
}

type PageResult = Result<HttpResponse, PageError>;

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}

fn internal(err: anyhow::Error) -> AppError {
    AppError::Internal(err.to_string())
}

fn render_page<T: Template>(template: T) -> PageResult {
    let html = template
        .render()
        .map_err(|err| AppError::Internal(err.to_string()))?;
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

/// Loads the actor's own user record; a dangling session (record deleted
/// out from under the token) reads as NotFound.
async fn load_author(data: &AppState, actor: Actor) -> Result<User, AppError> {
    match data.store.find_user_by_id(actor.user_id).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(AppError::NotFound(
            "profile".into(),
            actor.user_id.to_string(),
        )),
        Err(err) => Err(internal(err)),
    }
}

// ── Landing ─────────────────────────────────────────────────────────────────

pub async fn landing(data: web::Data<AppState>, req: HttpRequest) -> PageResult {
    match session::current_actor(&req, data.auth.as_ref()).await? {
        Some(_) => Ok(see_other("/home")),
        None => Ok(see_other("/auth")),
    }
}

// ── Feed ────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct FeedParams {
    pub filter: Option<String>,
}

pub async fn home(
    data: web::Data<AppState>,
    req: HttpRequest,
    params: web::Query<FeedParams>,
) -> PageResult {
    let signed_in = session::current_actor(&req, data.auth.as_ref())
        .await?
        .is_some();
    let filter = params
        .filter
        .as_deref()
        .map(FeedFilter::from_param)
        .unwrap_or(FeedFilter::All);

    let posts = data
        .store
        .query_posts(feed::feed_query(filter))
        .await
        .map_err(internal)?;
    let cards = posts.iter().map(render::card).collect();

    render_page(FeedTemplate {
        cards,
        filter: filter.as_param(),
        signed_in,
    })
}

// ── Profiles ────────────────────────────────────────────────────────────────

pub async fn profile(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> PageResult {
    let token = path.into_inner();
    let actor = session::current_actor(&req, data.auth.as_ref()).await?;

    let user = identity::resolve(data.store.as_ref(), &token).await?;
    let posts = data
        .store
        .query_posts(feed::author_query(user.id))
        .await
        .map_err(internal)?;
    let cards = posts.iter().map(render::card).collect();

    let is_owner = actor.map(|a| a.user_id == user.id).unwrap_or(false);
    render_page(ProfileTemplate {
        profile: user,
        cards,
        is_owner,
        signed_in: actor.is_some(),
    })
}

pub async fn delete_post(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> PageResult {
    let actor = session::require_actor(&req, data.auth.as_ref()).await?;
    data.store
        .delete_post(path.into_inner(), actor.user_id)
        .await
        .map_err(internal)?;
    Ok(see_other(&format!("/account/{}", actor.user_id)))
}

// ── Posting ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PostForm {
    pub description: String,
    #[serde(default)]
    pub subjects: String,
    #[serde(default)]
    pub event_date: String,
}

fn form_title(classification: &Classification) -> &'static str {
    match classification.kind {
        PostKind::TutorRequest => "Request a Tutor",
        PostKind::TutorOffer => "Offer Tutoring",
        PostKind::Extracurricular => "Post an Activity",
    }
}

fn post_form_page(
    classification: &Classification,
    description: &str,
    subjects: &str,
    event_date: &str,
    error: Option<String>,
) -> PageResult {
    render_page(PostFormTemplate {
        title: form_title(classification),
        show_subjects: classification.fields == classify::FieldRule::Subjects,
        show_date: classification.fields == classify::FieldRule::EventDate,
        error,
        description: description.to_owned(),
        subjects: subjects.to_owned(),
        event_date: event_date.to_owned(),
        signed_in: true,
    })
}

pub async fn new_post_form(data: web::Data<AppState>, req: HttpRequest) -> PageResult {
    let actor = session::require_actor(&req, data.auth.as_ref()).await?;
    let author = load_author(&data, actor).await?;
    let classification = classify::classify(author.account, author.year)?;
    post_form_page(&classification, "", "", "", None)
}

pub async fn create_post(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<PostForm>,
) -> PageResult {
    let actor = session::require_actor(&req, data.auth.as_ref()).await?;
    let author = load_author(&data, actor).await?;
    let classification = classify::classify(author.account, author.year)?;

    let event_date = match parse_event_date(&form.event_date) {
        Ok(date) => date,
        Err(err) => {
            return post_form_page(
                &classification,
                &form.description,
                &form.subjects,
                &form.event_date,
                Some(err.to_string()),
            )
        }
    };

    let draft = PostDraft {
        description: form.description.clone(),
        subjects: split_subjects(&form.subjects),
        event_date,
    };

    match classify::compose(&author, draft) {
        Ok(post) => {
            data.store.insert_post(post).await.map_err(internal)?;
            Ok(see_other("/home"))
        }
        Err(err @ AppError::Validation(_)) => post_form_page(
            &classification,
            &form.description,
            &form.subjects,
            &form.event_date,
            Some(err.to_string()),
        ),
        Err(err) => Err(err.into()),
    }
}

fn parse_event_date(raw: &str) -> Result<Option<NaiveDate>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| AppError::Validation(format!("{raw:?} is not a valid date")))
}

/// The form sends tags as one comma-separated field; the caps are enforced
/// later by `classify::compose`.
fn split_subjects(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Settings ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SettingsForm {
    pub handle: String,
}

pub async fn settings_form(data: web::Data<AppState>, req: HttpRequest) -> PageResult {
    let actor = session::require_actor(&req, data.auth.as_ref()).await?;
    let author = load_author(&data, actor).await?;
    render_page(SettingsTemplate {
        handle: author.handle,
        message: None,
        is_error: false,
        signed_in: true,
    })
}

pub async fn update_settings(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<SettingsForm>,
) -> PageResult {
    let actor = session::require_actor(&req, data.auth.as_ref()).await?;
    let handle = form.handle.trim().to_string();

    let (message, is_error) = match change_handle(&data, actor, &handle).await {
        Ok(()) => ("Profile updated successfully!".to_string(), false),
        Err(err @ (AppError::Validation(_) | AppError::Conflict(_))) => (err.to_string(), true),
        Err(err) => return Err(err.into()),
    };

    render_page(SettingsTemplate {
        handle,
        message: Some(message),
        is_error,
        signed_in: true,
    })
}

async fn change_handle(data: &AppState, actor: Actor, handle: &str) -> Result<(), AppError> {
    identity::validate_handle(handle)?;
    // Taken by someone else? Checked before the write so the conflict is
    // surfaced as such; the store's unique index is the backstop.
    match data.store.find_user_by_handle(handle).await {
        Ok(Some(user)) if user.id != actor.user_id => {
            return Err(AppError::Conflict(format!(
                "the username {handle:?} is already taken"
            )));
        }
        Ok(_) => {}
        Err(err) => return Err(internal(err)),
    }
    data.store
        .update_user(
            actor.user_id,
            UserPatch {
                handle: Some(handle.to_string()),
            },
        )
        .await
        .map_err(internal)
}

pub async fn delete_account(data: web::Data<AppState>, req: HttpRequest) -> PageResult {
    let actor = session::require_actor(&req, data.auth.as_ref()).await?;
    data.store
        .delete_user(actor.user_id)
        .await
        .map_err(internal)?;
    if let Some(token) = session::session_token(&req) {
        if let Err(err) = data.auth.sign_out(&token).await {
            log::warn!("sign-out after account deletion failed: {err}");
        }
    }
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/"))
        .cookie(session::removal_cookie())
        .finish())
}

// ── Auth ────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AuthParams {
    pub mode: Option<String>,
}

#[derive(Deserialize)]
pub struct SigninForm {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub handle: String,
    pub phone: String,
    pub account: String,
    pub year: Option<String>,
}

pub async fn auth_page(params: web::Query<AuthParams>) -> PageResult {
    render_page(AuthTemplate {
        signup: params.mode.as_deref() == Some("signup"),
        error: None,
        email: String::new(),
        handle: String::new(),
        phone: String::new(),
        signed_in: false,
    })
}

fn signin_page(email: &str, error: String) -> PageResult {
    render_page(AuthTemplate {
        signup: false,
        error: Some(error),
        email: email.to_owned(),
        handle: String::new(),
        phone: String::new(),
        signed_in: false,
    })
}

fn signup_page(form: &SignupForm, error: String) -> PageResult {
    render_page(AuthTemplate {
        signup: true,
        error: Some(error),
        email: form.email.clone(),
        handle: form.handle.clone(),
        phone: form.phone.clone(),
        signed_in: false,
    })
}

fn signed_in_redirect(access_token: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", "/home"))
        .cookie(session::session_cookie(access_token))
        .finish()
}

pub async fn sign_in(data: web::Data<AppState>, form: web::Form<SigninForm>) -> PageResult {
    match data.auth.sign_in(form.email.trim(), &form.password).await {
        Ok(Some(session)) => Ok(signed_in_redirect(&session.access_token)),
        Ok(None) => signin_page(&form.email, "Invalid email or password.".into()),
        Err(err) => {
            log::error!("sign-in failed: {err}");
            signin_page(&form.email, "Something went wrong. Please try again.".into())
        }
    }
}

pub async fn sign_up(data: web::Data<AppState>, form: web::Form<SignupForm>) -> PageResult {
    let profile = match build_profile(&form) {
        Ok(profile) => profile,
        Err(err) => return signup_page(&form, err.to_string()),
    };

    // Handle-taken check before touching the auth backend, so a duplicate
    // never half-registers.
    match data.store.find_user_by_handle(&profile.handle).await {
        Ok(Some(_)) => {
            return signup_page(
                &form,
                "Username is already taken. Please choose another one.".into(),
            )
        }
        Ok(None) => {}
        Err(err) => return Err(internal(err).into()),
    }

    match data
        .auth
        .sign_up(form.email.trim(), &form.password, profile)
        .await
    {
        Ok(session) => Ok(signed_in_redirect(&session.access_token)),
        Err(err) => signup_page(&form, err.to_string()),
    }
}

fn build_profile(form: &SignupForm) -> Result<SignupProfile, AppError> {
    let handle = form.handle.trim().to_string();
    identity::validate_handle(&handle)?;

    let account = AccountKind::parse(&form.account)
        .ok_or_else(|| AppError::Validation(format!("unknown account type {:?}", form.account)))?;
    let year = match account {
        AccountKind::Student => Some(
            form.year
                .as_deref()
                .and_then(ClassYear::parse)
                .ok_or_else(|| {
                    AppError::Validation("students must pick an academic year".into())
                })?,
        ),
        AccountKind::ExtracurricularHost => None,
    };

    let phone = form.phone.trim().to_string();
    if phone.is_empty() {
        return Err(AppError::Validation("a contact phone number is required".into()));
    }

    Ok(SignupProfile {
        handle,
        phone,
        account,
        year,
    })
}

pub async fn sign_out(data: web::Data<AppState>, req: HttpRequest) -> PageResult {
    if let Some(token) = session::session_token(&req) {
        if let Err(err) = data.auth.sign_out(&token).await {
            log::warn!("sign-out failed: {err}");
        }
    }
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/"))
        .cookie(session::removal_cookie())
        .finish())
}
