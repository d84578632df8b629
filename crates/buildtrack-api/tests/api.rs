//! End-to-end tests over the full router with an in-memory database and a
//! throwaway media directory.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::Datelike;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use buildtrack_api::email::{Email, Mailer, Outbox};
use buildtrack_api::images::MAX_IMAGE_SIZE;
use buildtrack_api::storage::MediaStore;
use buildtrack_api::{AppStateInner, auth, router};
use buildtrack_db::Database;

const ADMIN_EMAIL: &str = "admin@example.com";
const PASSWORD: &str = "hunter2hunter2";

struct TestApp {
    app: Router,
    media_dir: PathBuf,
    outbox: Outbox,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.media_dir);
    }
}

async fn setup() -> TestApp {
    let media_dir = std::env::temp_dir().join(format!("buildtrack-api-test-{}", Uuid::new_v4()));
    let db = Database::open_in_memory().unwrap();
    auth::bootstrap_admin(&db, ADMIN_EMAIL, PASSWORD).unwrap();
    let outbox = Outbox::new();

    let state = Arc::new(AppStateInner {
        db,
        jwt_secret: "test-secret".into(),
        media: MediaStore::new(media_dir.clone(), "http://localhost:3000").await.unwrap(),
        mailer: Mailer::Memory(outbox.clone()),
        app_url: "http://localhost:5173".into(),
        dev_endpoints: true,
    });

    TestApp {
        app: router(state),
        media_dir,
        outbox,
    }
}

/// Emails go out on a spawned task, so give it a moment to land.
async fn wait_for_email(outbox: &Outbox, subject: &str) -> Email {
    for _ in 0..100 {
        if let Some(email) = outbox.sent().into_iter().find(|e| e.subject == subject) {
            return email;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no '{subject}' email was sent");
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    send(app, builder.body(body).unwrap()).await
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed for {email}: {body}");
    body["token"].as_str().unwrap().to_string()
}

async fn create_user(app: &Router, token: &str, email: &str, role: &str, builder_id: Option<&str>) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/users",
        Some(token),
        Some(json!({
            "email": email,
            "password": PASSWORD,
            "first_name": email.split('@').next().unwrap(),
            "role": role,
            "builder_id": builder_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create user failed: {body}");
    body["id"].as_str().unwrap().to_string()
}

/// Admin, one builder, two homeowners (the first linked to the builder), and
/// a project for the first homeowner assigned to the builder.
struct World {
    admin: String,
    builder: String,
    builder_id: String,
    alice: String,
    bob: String,
    alice_id: String,
    project_id: String,
}

async fn world(app: &Router) -> World {
    let admin = login(app, ADMIN_EMAIL).await;
    let builder_id = create_user(app, &admin, "builder@example.com", "builder", None).await;
    let alice_id = create_user(app, &admin, "alice@example.com", "homeowner", Some(builder_id.as_str())).await;
    create_user(app, &admin, "bob@example.com", "homeowner", None).await;

    let (status, project) = call(
        app,
        Method::POST,
        "/projects",
        Some(admin.as_str()),
        Some(json!({
            "title": "Kitchen remodel",
            "address": "12 Oak Lane",
            "status": "in-progress",
            "homeowner_id": alice_id,
            "builder_id": builder_id,
            "progress": 35,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create project failed: {project}");

    World {
        builder: login(app, "builder@example.com").await,
        alice: login(app, "alice@example.com").await,
        bob: login(app, "bob@example.com").await,
        admin,
        builder_id,
        alice_id,
        project_id: project["id"].as_str().unwrap().to_string(),
    }
}

async fn upload(app: &Router, token: &str, project_id: &str, content_type: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::POST)
        .uri(format!("/projects/{project_id}/images?caption=Framing&category=structural"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3]))
        .unwrap();
    send(app, req).await
}

#[tokio::test]
async fn signup_login_and_session() {
    let t = setup().await;

    let (status, body) = call(
        &t.app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "email": "new@example.com", "password": PASSWORD, "first_name": "Nia" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "homeowner");

    let (status, _) = call(
        &t.app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "email": "NEW@example.com", "password": PASSWORD, "first_name": "Nia" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let token = login(&t.app, "new@example.com").await;
    let (status, me) = call(&t.app, Method::GET, "/auth/me", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "new@example.com");
    assert_eq!(me["name"], "Nia");

    let (status, _) = call(&t.app, Method::GET, "/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = call(&t.app, Method::GET, "/auth/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &t.app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "new@example.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn homeowners_cannot_see_each_others_projects() {
    let t = setup().await;
    let w = world(&t.app).await;

    let (status, list) = call(&t.app, Method::GET, "/projects", Some(w.bob.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 0);

    let uri = format!("/projects/{}", w.project_id);
    let (status, _) = call(&t.app, Method::GET, &uri, Some(w.bob.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, list) = call(&t.app, Method::GET, "/projects", Some(w.alice.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["homeowner_name"], "alice");
    assert_eq!(list[0]["status"], "in-progress");

    let (_, list) = call(&t.app, Method::GET, "/projects", Some(w.builder.as_str()), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    // Homeowners are read-only.
    let (status, _) = call(&t.app, Method::PATCH, &uri, Some(w.alice.as_str()), Some(json!({ "progress": 90 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, project) = call(&t.app, Method::PATCH, &uri, Some(w.builder.as_str()), Some(json!({ "progress": 90 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(project["progress"], 90);

    let (status, _) = call(&t.app, Method::PATCH, &uri, Some(w.admin.as_str()), Some(json!({ "progress": 101 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn role_gated_user_management() {
    let t = setup().await;
    let w = world(&t.app).await;

    let (status, _) = call(&t.app, Method::GET, "/users", Some(w.alice.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Builders only see the homeowners linked to them.
    let (status, list) = call(&t.app, Method::GET, "/users", Some(w.builder.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    let emails: Vec<&str> = list.as_array().unwrap().iter().map(|u| u["email"].as_str().unwrap()).collect();
    assert_eq!(emails, vec!["alice@example.com"]);

    let (status, _) = call(
        &t.app,
        Method::POST,
        "/users",
        Some(w.builder.as_str()),
        Some(json!({ "email": "x@example.com", "password": PASSWORD, "first_name": "X", "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, list) = call(&t.app, Method::GET, "/users?role=homeowner", Some(w.admin.as_str()), None).await;
    assert_eq!(list.as_array().unwrap().len(), 2);

    let (status, _) = call(&t.app, Method::GET, "/logs", Some(w.builder.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn photo_upload_filter_and_favorites() {
    let t = setup().await;
    let w = world(&t.app).await;
    let images_uri = format!("/projects/{}/images", w.project_id);

    let (status, _) = upload(&t.app, &w.alice, &w.project_id, "image/jpeg").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = upload(&t.app, &w.builder, &w.project_id, "text/plain").await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let (status, image) = upload(&t.app, &w.builder, &w.project_id, "image/jpeg").await;
    assert_eq!(status, StatusCode::CREATED, "{image}");
    assert_eq!(image["category"], "structural");
    let image_id = image["id"].as_str().unwrap().to_string();

    // The first upload becomes the project thumbnail and is publicly served.
    let (_, project) = call(&t.app, Method::GET, &format!("/projects/{}", w.project_id), Some(w.alice.as_str()), None).await;
    assert_eq!(project["thumbnail"], image["url"]);
    let media_path = image["url"].as_str().unwrap().trim_start_matches("http://localhost:3000");
    let (status, _) = call(&t.app, Method::GET, media_path, None, None).await;
    assert_eq!(status, StatusCode::OK);

    let year = chrono::Utc::now().year();
    let (status, list) = call(&t.app, Method::GET, &format!("{images_uri}?year={year}&month=all"), Some(w.alice.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (_, list) = call(&t.app, Method::GET, &format!("{images_uri}?year=1999&month=all"), Some(w.alice.as_str()), None).await;
    assert_eq!(list.as_array().unwrap().len(), 0);

    let (_, list) = call(&t.app, Method::GET, &format!("{images_uri}?category=interior"), Some(w.alice.as_str()), None).await;
    assert_eq!(list.as_array().unwrap().len(), 0);

    let (status, _) = call(&t.app, Method::GET, &format!("{images_uri}?month=13"), Some(w.alice.as_str()), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, periods) = call(
        &t.app,
        Method::GET,
        &format!("/projects/{}/gallery-periods", w.project_id),
        Some(w.alice.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(periods["years"], json!([year]));

    let (status, _) = call(&t.app, Method::GET, &images_uri, Some(w.bob.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Favorites: toggling twice restores the original state.
    let toggle_uri = format!("/favorites/{image_id}/toggle");
    let (status, fav) = call(&t.app, Method::POST, &toggle_uri, Some(w.alice.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fav["favorited"], true);
    let (_, list) = call(&t.app, Method::GET, "/favorites", Some(w.alice.as_str()), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    let (_, fav) = call(&t.app, Method::POST, &toggle_uri, Some(w.alice.as_str()), None).await;
    assert_eq!(fav["favorited"], false);
    let (_, list) = call(&t.app, Method::GET, "/favorites", Some(w.alice.as_str()), None).await;
    assert_eq!(list.as_array().unwrap().len(), 0);

    let (status, _) = call(&t.app, Method::PUT, &format!("/favorites/{image_id}"), Some(w.bob.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&t.app, Method::DELETE, &format!("/images/{image_id}"), Some(w.builder.as_str()), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&t.app, Method::GET, media_path, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_user_cascades_to_projects() {
    let t = setup().await;
    let w = world(&t.app).await;

    let (status, _) = call(&t.app, Method::DELETE, &format!("/users/{}", w.alice_id), Some(w.builder.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&t.app, Method::DELETE, &format!("/users/{}", w.alice_id), Some(w.admin.as_str()), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(&t.app, Method::GET, &format!("/projects/{}", w.project_id), Some(w.admin.as_str()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The deleted user's session is dead.
    let (status, _) = call(&t.app, Method::GET, "/auth/me", Some(w.alice.as_str()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_and_logs() {
    let t = setup().await;
    let w = world(&t.app).await;

    let (status, me) = call(
        &t.app,
        Method::PATCH,
        "/profile",
        Some(w.bob.as_str()),
        Some(json!({ "last_name": "Builder", "phone": "555-0100" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["name"], "bob Builder");
    assert_eq!(me["phone"], "555-0100");

    let (status, _) = call(
        &t.app,
        Method::POST,
        "/profile/password",
        Some(w.bob.as_str()),
        Some(json!({ "current_password": "not-it-at-all", "new_password": "another-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &t.app,
        Method::POST,
        "/logs",
        Some(w.bob.as_str()),
        Some(json!({ "level": "error", "message": "gallery failed to load" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, logs) = call(&t.app, Method::GET, "/logs?level=error", Some(w.admin.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs[0]["message"], "gallery failed to load");

    let (status, logs) = call(&t.app, Method::GET, "/api/logs?limit=5", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs.as_array().unwrap().len(), 1);

    let (status, sent) = call(
        &t.app,
        Method::POST,
        "/api/test-email",
        None,
        Some(json!({ "to": "dev@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent["provider"], "memory");
    assert_eq!(sent["sent"], true);
    assert_eq!(t.outbox.sent().iter().filter(|e| e.to == "dev@example.com").count(), 1);
}

#[tokio::test]
async fn password_reset_for_unknown_email_is_accepted() {
    let t = setup().await;

    let (status, _) = call(
        &t.app,
        Method::POST,
        "/auth/password-reset",
        None,
        Some(json!({ "email": "ghost@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, _) = call(
        &t.app,
        Method::POST,
        "/auth/password-reset/confirm",
        None,
        Some(json!({ "token": "made-up", "new_password": "long-enough-pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn password_reset_round_trip() {
    let t = setup().await;
    let w = world(&t.app).await;

    let (status, _) = call(
        &t.app,
        Method::POST,
        "/auth/password-reset",
        None,
        Some(json!({ "email": "Alice@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let email = wait_for_email(&t.outbox, "Reset your BuildTrack password").await;
    assert_eq!(email.to, "alice@example.com");
    let token = email
        .html
        .split("reset-password?token=")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .unwrap()
        .to_string();

    let confirm = json!({ "token": token, "new_password": "brand-new-password" });
    let (status, _) = call(&t.app, Method::POST, "/auth/password-reset/confirm", None, Some(confirm.clone())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Single use.
    let (status, _) = call(&t.app, Method::POST, "/auth/password-reset/confirm", None, Some(confirm)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &t.app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) = call(
        &t.app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "brand-new-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], w.alice_id.as_str());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_duplicate_signups_conflict() {
    let t = setup().await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let app = t.app.clone();
        handles.push(tokio::spawn(async move {
            let body = json!({ "email": "race@example.com", "password": PASSWORD, "first_name": "Rae" });
            call(&app, Method::POST, "/auth/signup", None, Some(body)).await.0
        }));
    }
    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 1, "{statuses:?}");
    assert!(
        statuses.iter().all(|s| *s == StatusCode::CREATED || *s == StatusCode::CONFLICT),
        "{statuses:?}"
    );
}

#[tokio::test]
async fn builders_add_homeowners_and_projects_for_themselves() {
    let t = setup().await;
    let w = world(&t.app).await;

    let carol_id = create_user(&t.app, &w.builder, "carol@example.com", "homeowner", None).await;
    let (status, carol) = call(&t.app, Method::GET, &format!("/users/{carol_id}"), Some(w.admin.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(carol["builder_id"], w.builder_id.as_str());

    let (status, project) = call(
        &t.app,
        Method::POST,
        "/projects",
        Some(w.builder.as_str()),
        Some(json!({ "title": "Basement", "homeowner_id": carol_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{project}");
    assert_eq!(project["builder_id"], w.builder_id.as_str());
    assert_eq!(project["status"], "planning");

    let other_id = create_user(&t.app, &w.admin, "other@example.com", "builder", None).await;
    let (status, _) = call(
        &t.app,
        Method::POST,
        "/projects",
        Some(w.builder.as_str()),
        Some(json!({ "title": "Attic", "homeowner_id": carol_id, "builder_id": other_id })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, list) = call(&t.app, Method::GET, "/projects", Some(w.builder.as_str()), None).await;
    assert_eq!(list.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn deleting_a_builder_cascades_to_assigned_projects() {
    let t = setup().await;
    let w = world(&t.app).await;

    let (status, _) = call(&t.app, Method::DELETE, &format!("/users/{}", w.builder_id), Some(w.admin.as_str()), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(&t.app, Method::GET, &format!("/projects/{}", w.project_id), Some(w.admin.as_str()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The linked homeowner survives, unlinked.
    let (status, alice) = call(&t.app, Method::GET, &format!("/users/{}", w.alice_id), Some(w.admin.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alice["builder_id"], Value::Null);
}

#[tokio::test]
async fn role_changes_keep_builder_links_consistent() {
    let t = setup().await;
    let w = world(&t.app).await;

    // A linked homeowner promoted to builder loses the link.
    let carol_id = create_user(&t.app, &w.admin, "carol@example.com", "homeowner", Some(w.builder_id.as_str())).await;
    let (status, carol) = call(
        &t.app,
        Method::PATCH,
        &format!("/users/{carol_id}"),
        Some(w.admin.as_str()),
        Some(json!({ "role": "builder" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{carol}");
    assert_eq!(carol["role"], "builder");
    assert_eq!(carol["builder_id"], Value::Null);

    // A homeowner who still owns projects keeps the role.
    let (status, _) = call(
        &t.app,
        Method::PATCH,
        &format!("/users/{}", w.alice_id),
        Some(w.admin.as_str()),
        Some(json!({ "role": "builder" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // A demoted builder is released from projects and homeowners.
    let (status, _) = call(
        &t.app,
        Method::PATCH,
        &format!("/users/{}", w.builder_id),
        Some(w.admin.as_str()),
        Some(json!({ "role": "homeowner" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, project) = call(&t.app, Method::GET, &format!("/projects/{}", w.project_id), Some(w.admin.as_str()), None).await;
    assert_eq!(project["builder_id"], Value::Null);
    let (_, alice) = call(&t.app, Method::GET, &format!("/users/{}", w.alice_id), Some(w.admin.as_str()), None).await;
    assert_eq!(alice["builder_id"], Value::Null);

    let (_, list) = call(&t.app, Method::GET, "/projects", Some(w.builder.as_str()), None).await;
    assert_eq!(list.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn image_delete_succeeds_when_file_cannot_be_removed() {
    let t = setup().await;
    let w = world(&t.app).await;

    let (status, image) = upload(&t.app, &w.builder, &w.project_id, "image/png").await;
    assert_eq!(status, StatusCode::CREATED);

    // Swap the stored file for a directory so removing it fails.
    let relative = image["url"].as_str().unwrap().split("/media/").nth(1).unwrap();
    let path = t.media_dir.join(relative);
    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir_all(path.join("stuck")).unwrap();

    let image_id = image["id"].as_str().unwrap();
    let (status, _) = call(&t.app, Method::DELETE, &format!("/images/{image_id}"), Some(w.builder.as_str()), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, list) = call(&t.app, Method::GET, &format!("/projects/{}/images", w.project_id), Some(w.builder.as_str()), None).await;
    assert_eq!(list.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn oversized_upload_gets_json_error() {
    let t = setup().await;
    let w = world(&t.app).await;

    let req = Request::builder()
        .method(Method::POST)
        .uri(format!("/projects/{}/images", w.project_id))
        .header(header::AUTHORIZATION, format!("Bearer {}", w.builder))
        .header(header::CONTENT_TYPE, "image/jpeg")
        .body(Body::from(vec![0u8; MAX_IMAGE_SIZE + 1]))
        .unwrap();
    let (status, body) = send(&t.app, req).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "Payload too large");
}
