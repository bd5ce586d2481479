//! Full HTTP flows through the page handlers over the memory backend.

use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use hr_api::handlers::AppState;
use hr_core::feed::author_query;
use hr_core::traits::DirectoryStore;
use hr_store_memory::MemoryBackend;
use integration_tests::{host, stored_post, student};
use hr_core::models::ClassYear;

fn state(backend: &Arc<MemoryBackend>) -> web::Data<AppState> {
    web::Data::new(AppState {
        store: backend.clone(),
        auth: backend.clone(),
    })
}

fn session_pair<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

fn location<B>(resp: &ServiceResponse<B>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .expect("redirect location")
        .to_str()
        .unwrap()
}

async fn body_string(resp: ServiceResponse<impl actix_web::body::MessageBody>) -> String {
    String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
}

#[actix_web::test]
async fn student_signup_post_and_feed() {
    let backend = Arc::new(MemoryBackend::new());
    let app = test::init_service(
        App::new()
            .app_data(state(&backend))
            .configure(hr_api::configure_routes),
    )
    .await;

    // Sign up a sophomore.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/signup")
            .set_form([
                ("email", "amara@example.com"),
                ("password", "hunter2"),
                ("handle", "amara"),
                ("phone", "555-0100"),
                ("account", "student"),
                ("year", "sophomore"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/home");
    let cookie = session_pair(&resp);

    // The form is the student variant.
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/post")
            .insert_header((header::COOKIE, cookie.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_string(resp).await;
    assert!(page.contains("Request a Tutor"));
    assert!(page.contains("name=\"subjects\""));
    assert!(!page.contains("name=\"event_date\""));

    // Submit a post.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/post")
            .insert_header((header::COOKIE, cookie.clone()))
            .set_form([("description", "Need algebra help"), ("subjects", "Math")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/home");

    // The feed carries the classified card.
    let resp = test::call_service(&app, test::TestRequest::get().uri("/home").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_string(resp).await;
    assert!(page.contains("Requesting Help"));
    assert!(page.contains("Need algebra help"));
    assert!(page.contains("Math"));
    assert!(page.contains("badge-info"));

    // Filtering to activities hides it.
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/home?filter=extracurricular")
            .to_request(),
    )
    .await;
    let page = body_string(resp).await;
    assert!(!page.contains("Need algebra help"));
}

#[actix_web::test]
async fn host_signup_and_activity_post() {
    let backend = Arc::new(MemoryBackend::new());
    let app = test::init_service(
        App::new()
            .app_data(state(&backend))
            .configure(hr_api::configure_routes),
    )
    .await;

    // The browser still submits a year; hosts just don't keep one.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/signup")
            .set_form([
                ("email", "club@example.com"),
                ("password", "hunter2"),
                ("handle", "chess-club"),
                ("phone", "555-0101"),
                ("account", "extracurricular_host"),
                ("year", "freshman"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let cookie = session_pair(&resp);
    let user_id = backend
        .find_user_by_handle("chess-club")
        .await
        .unwrap()
        .unwrap()
        .id;

    // The form is the activity variant.
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/post")
            .insert_header((header::COOKIE, cookie.clone()))
            .to_request(),
    )
    .await;
    let page = body_string(resp).await;
    assert!(page.contains("Post an Activity"));
    assert!(page.contains("name=\"event_date\""));
    assert!(!page.contains("name=\"subjects\""));

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/post")
            .insert_header((header::COOKIE, cookie.clone()))
            .set_form([
                ("description", "Chess club meetup"),
                ("event_date", "2024-05-01"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    // Stored exactly as classified: date, no subjects.
    let mine = backend.query_posts(author_query(user_id)).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].post.kind, "extracurricular");
    assert_eq!(mine[0].post.subjects, None);
    assert!(mine[0].post.event_date.is_some());

    let resp = test::call_service(&app, test::TestRequest::get().uri("/home").to_request()).await;
    let page = body_string(resp).await;
    assert!(page.contains("Activity"));
    assert!(page.contains("Event Date: May 01, 2024"));
}

#[actix_web::test]
async fn profile_pages_resolve_and_scope_ownership() {
    let backend = Arc::new(MemoryBackend::new());
    let app = test::init_service(
        App::new()
            .app_data(state(&backend))
            .configure(hr_api::configure_routes),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/signup")
            .set_form([
                ("email", "amara@example.com"),
                ("password", "hunter2"),
                ("handle", "amara"),
                ("phone", "555-0100"),
                ("account", "student"),
                ("year", "junior"),
            ])
            .to_request(),
    )
    .await;
    let cookie = session_pair(&resp);
    let user_id = backend
        .find_user_by_handle("amara")
        .await
        .unwrap()
        .unwrap()
        .id;

    // By handle, signed out: visitor view.
    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/account/amara").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_string(resp).await;
    assert!(page.contains("amara"));
    assert!(page.contains("Junior Student"));
    assert!(!page.contains("My Posts"));

    // By id, signed in as the owner.
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/account/{user_id}"))
            .insert_header((header::COOKIE, cookie))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_string(resp).await;
    assert!(page.contains("My Posts"));

    // Unknown identifier: not found, not an error page.
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/account/{}", uuid::Uuid::new_v4()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn post_deletion_and_account_lifecycle() {
    let backend = Arc::new(MemoryBackend::new());
    let app = test::init_service(
        App::new()
            .app_data(state(&backend))
            .configure(hr_api::configure_routes),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/signup")
            .set_form([
                ("email", "amara@example.com"),
                ("password", "hunter2"),
                ("handle", "amara"),
                ("phone", "555-0100"),
                ("account", "student"),
                ("year", "senior"),
            ])
            .to_request(),
    )
    .await;
    let cookie = session_pair(&resp);
    let user_id = backend
        .find_user_by_handle("amara")
        .await
        .unwrap()
        .unwrap()
        .id;

    for description in ["first offer", "second offer"] {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/post")
                .insert_header((header::COOKIE, cookie.clone()))
                .set_form([("description", description), ("subjects", "Math")])
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }

    // Delete one post through its owner.
    let target = backend.query_posts(author_query(user_id)).await.unwrap()[0]
        .post
        .id;
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/account/posts/{target}/delete"))
            .insert_header((header::COOKIE, cookie.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(backend.query_posts(author_query(user_id)).await.unwrap().len(), 1);

    // Account deletion cascades and kills the session.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/settings/delete")
            .insert_header((header::COOKIE, cookie.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    assert!(backend.query_posts(author_query(user_id)).await.unwrap().is_empty());

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/account/amara").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn settings_surface_validation_and_conflicts_inline() {
    let backend = Arc::new(MemoryBackend::new());
    let app = test::init_service(
        App::new()
            .app_data(state(&backend))
            .configure(hr_api::configure_routes),
    )
    .await;

    for (email, handle) in [("a@example.com", "amara"), ("b@example.com", "badru")] {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/signup")
                .set_form([
                    ("email", email),
                    ("password", "hunter2"),
                    ("handle", handle),
                    ("phone", "555-0100"),
                    ("account", "student"),
                    ("year", "junior"),
                ])
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/signin")
            .set_form([("email", "b@example.com"), ("password", "hunter2")])
            .to_request(),
    )
    .await;
    let cookie = session_pair(&resp);

    // Someone else's handle.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/settings")
            .insert_header((header::COOKIE, cookie.clone()))
            .set_form([("handle", "amara")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_string(resp).await;
    assert!(page.contains("already taken"));

    // An identifier-shaped handle can never be registered.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/settings")
            .insert_header((header::COOKIE, cookie.clone()))
            .set_form([("handle", "a1b2c3d4-e5f6-7890-abcd-ef1234567890")])
            .to_request(),
    )
    .await;
    let page = body_string(resp).await;
    assert!(page.contains("flash-error"));

    // A clean rename sticks.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/settings")
            .insert_header((header::COOKIE, cookie))
            .set_form([("handle", "badru-v2")])
            .to_request(),
    )
    .await;
    let page = body_string(resp).await;
    assert!(page.contains("updated successfully"));
    assert!(backend
        .find_user_by_handle("badru-v2")
        .await
        .unwrap()
        .is_some());
}

#[actix_web::test]
async fn signed_out_visitors_are_redirected_from_gated_pages() {
    let backend = Arc::new(MemoryBackend::new());
    let app = test::init_service(
        App::new()
            .app_data(state(&backend))
            .configure(hr_api::configure_routes),
    )
    .await;

    for uri in ["/post", "/settings"] {
        let resp =
            test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&resp), "/auth");
    }

    // Bad credentials re-render the form instead of erroring.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/signin")
            .set_form([("email", "ghost@example.com"), ("password", "nope")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_string(resp).await;
    assert!(page.contains("Invalid email or password."));
}

#[actix_web::test]
async fn anomalous_rows_render_without_type_blocks() {
    let backend = Arc::new(MemoryBackend::new());
    let club = host("chess-club");
    backend.seed_user(club.clone());
    backend.seed_post(stored_post(
        club.id,
        "extracurricular",
        Some(vec!["Math".into()]),
        None,
    ));
    backend.seed_post(stored_post(club.id, "job_listing", None, None));
    // A well-formed row for contrast.
    let amara = student("amara", ClassYear::Freshman);
    backend.seed_user(amara.clone());
    backend.seed_post(stored_post(
        amara.id,
        "tutor_request",
        Some(vec!["History".into()]),
        None,
    ));

    let app = test::init_service(
        App::new()
            .app_data(state(&backend))
            .configure(hr_api::configure_routes),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/home").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_string(resp).await;

    // All three bodies render.
    assert_eq!(page.matches("fixture body").count(), 3);
    // The anomalous activity shows no date line and no chips of its own;
    // the only chip on the page is the healthy row's.
    assert!(!page.contains("Event Date:"));
    assert!(!page.contains(">Math<"));
    assert!(page.contains(">History<"));
    // The unknown kind shows no badge; the two known kinds show theirs.
    assert!(page.contains("Activity"));
    assert!(page.contains("Requesting Help"));
}
