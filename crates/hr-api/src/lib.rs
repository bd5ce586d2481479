//! # hr-api
//!
//! The web routing and orchestration layer for Homeroom.

pub mod handlers;
pub mod middleware;
pub mod session;

use actix_web::web;

/// Configures the page routes.
///
/// # Developer Note
/// We use a scoped configuration to allow the main binary to mount
/// everything under a different prefix if needed. `/account/{token}`
/// accepts either a user id or a handle; the resolver decides which.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            .route("/", web::get().to(handlers::landing))
            .route("/home", web::get().to(handlers::home))
            .route("/account/posts/{id}/delete", web::post().to(handlers::delete_post))
            .route("/account/{token}", web::get().to(handlers::profile))
            .route("/post", web::get().to(handlers::new_post_form))
            .route("/post", web::post().to(handlers::create_post))
            .route("/settings", web::get().to(handlers::settings_form))
            .route("/settings", web::post().to(handlers::update_settings))
            .route("/settings/delete", web::post().to(handlers::delete_account))
            .route("/auth", web::get().to(handlers::auth_page))
            .route("/auth/signin", web::post().to(handlers::sign_in))
            .route("/auth/signup", web::post().to(handlers::sign_up))
            .route("/auth/signout", web::post().to(handlers::sign_out)),
    );
}
