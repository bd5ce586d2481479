//! # hr-ui
//!
//! Askama templates for the Homeroom pages. Template structs are thin
//! bags of view models produced by `hr-core`; all display decisions (badge
//! labels, which optional block a card shows) happen in
//! [`hr_core::render`] so they stay testable without HTML.

use askama::Template;
use hr_core::models::User;
use hr_core::render::{DetailBlock, PostCard};

#[derive(Template)]
#[template(path = "home.html")]
pub struct FeedTemplate {
    pub cards: Vec<PostCard>,
    /// The selected `?filter=` value, echoed back into the select control.
    pub filter: &'static str,
    pub signed_in: bool,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub profile: User,
    pub cards: Vec<PostCard>,
    pub is_owner: bool,
    pub signed_in: bool,
}

impl ProfileTemplate {
    /// Avatar letter, as the original mock-up drew it.
    pub fn initial(&self) -> String {
        self.profile
            .handle
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase().to_string())
            .unwrap_or_default()
    }
}

#[derive(Template)]
#[template(path = "post_form.html")]
pub struct PostFormTemplate {
    pub title: &'static str,
    pub show_subjects: bool,
    pub show_date: bool,
    pub error: Option<String>,
    // Previous input, echoed back when validation fails.
    pub description: String,
    pub subjects: String,
    pub event_date: String,
    pub signed_in: bool,
}

#[derive(Template)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub handle: String,
    pub message: Option<String>,
    pub is_error: bool,
    pub signed_in: bool,
}

#[derive(Template)]
#[template(path = "auth.html")]
pub struct AuthTemplate {
    pub signup: bool,
    pub error: Option<String>,
    // Previous input, echoed back when the backend rejects the attempt.
    pub email: String,
    pub handle: String,
    pub phone: String,
    pub signed_in: bool,
}
