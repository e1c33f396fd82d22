//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for the notes service REST API.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use notekeep::api::create_router;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_router(common::build_state())
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str, user: Uuid) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-user-id", user.to_string())
        .body(Body::empty())
        .unwrap()
}

fn send_json(method: &str, uri: &str, user: Uuid, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", user.to_string())
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Registers a user through the API and returns its id.
async fn register_user(app: &Router, first: &str, last: &str, email: &str) -> Uuid {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/users")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"first_name": first, "last_name": last, "email": email}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_to_json(response.into_body()).await;
    body["user"]["id"].as_str().unwrap().parse().unwrap()
}

// == Note CRUD ==

#[tokio::test]
async fn test_create_and_list_notes() {
    let app = create_test_app();
    let user = Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/notes",
            user,
            json!({"title": "T1", "description": "D1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_to_json(response.into_body()).await;
    assert_eq!(created["title"], "T1");

    let response = app.oneshot(get("/notes", user)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_to_json(response.into_body()).await;
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["notes"][0]["title"], "T1");
}

#[tokio::test]
async fn test_create_note_validation_failure() {
    let app = create_test_app();
    let user = Uuid::new_v4();

    let response = app
        .oneshot(send_json(
            "POST",
            "/notes",
            user,
            json!({"title": "  ", "description": "D"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_to_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn test_update_note_roundtrip() {
    let app = create_test_app();
    let user = Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/notes",
            user,
            json!({"title": "T1", "description": "D1"}),
        ))
        .await
        .unwrap();
    let created = body_to_json(response.into_body()).await;
    let note_id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(send_json(
            "PATCH",
            &format!("/notes/{}", note_id),
            user,
            json!({"title": "T2"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/notes", user)).await.unwrap();
    let listed = body_to_json(response.into_body()).await;
    assert_eq!(listed["notes"][0]["title"], "T2");
}

#[tokio::test]
async fn test_trash_restore_and_permanent_delete() {
    let app = create_test_app();
    let user = Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/notes",
            user,
            json!({"title": "T", "description": "D"}),
        ))
        .await
        .unwrap();
    let created = body_to_json(response.into_body()).await;
    let note_id = created["id"].as_str().unwrap().to_string();

    // Trash
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/notes/{}", note_id))
                .header("x-user-id", user.to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/notes/trash", user)).await.unwrap();
    let trash = body_to_json(response.into_body()).await;
    assert_eq!(trash["count"], 1);

    // Restore
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            &format!("/notes/{}/restore", note_id),
            user,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Permanent delete
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/notes/{}/permanent", note_id))
                .header("x-user-id", user.to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get(&format!("/notes/{}", note_id), user))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == Views ==

#[tokio::test]
async fn test_archived_and_pinned_views() {
    let app = create_test_app();
    let user = Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/notes",
            user,
            json!({"title": "pinned", "description": "D", "is_pinned": true}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/notes",
            user,
            json!({"title": "to archive", "description": "D"}),
        ))
        .await
        .unwrap();
    let created = body_to_json(response.into_body()).await;
    let note_id = created["id"].as_str().unwrap();

    app.clone()
        .oneshot(send_json(
            "PATCH",
            &format!("/notes/{}", note_id),
            user,
            json!({"is_archived": true}),
        ))
        .await
        .unwrap();

    let response = app.clone().oneshot(get("/notes/pinned", user)).await.unwrap();
    let pinned = body_to_json(response.into_body()).await;
    assert_eq!(pinned["count"], 1);
    assert_eq!(pinned["notes"][0]["title"], "pinned");

    let response = app
        .clone()
        .oneshot(get("/notes/archived", user))
        .await
        .unwrap();
    let archived = body_to_json(response.into_body()).await;
    assert_eq!(archived["count"], 1);
    assert_eq!(archived["notes"][0]["title"], "to archive");

    let response = app
        .oneshot(get("/notes/search?q=archive", user))
        .await
        .unwrap();
    let found = body_to_json(response.into_body()).await;
    assert_eq!(found["count"], 1);
}

// == Labels ==

#[tokio::test]
async fn test_label_lifecycle() {
    let app = create_test_app();
    let user = Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(send_json("POST", "/labels", user, json!({"name": "work"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let label = body_to_json(response.into_body()).await;
    let label_id = label["id"].as_str().unwrap().to_string();

    // Duplicate name rejected
    let response = app
        .clone()
        .oneshot(send_json("POST", "/labels", user, json!({"name": "work"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Attach to a note and read the by-label view
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/notes",
            user,
            json!({"title": "T", "description": "D"}),
        ))
        .await
        .unwrap();
    let note = body_to_json(response.into_body()).await;
    let note_id = note["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            &format!("/notes/{}/labels", note_id),
            user,
            json!({"label_id": label_id}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get(&format!("/notes/label/{}", label_id), user))
        .await
        .unwrap();
    let by_label = body_to_json(response.into_body()).await;
    assert_eq!(by_label["count"], 1);

    // Delete the label; its view becomes a 404
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/labels/{}", label_id))
                .header("x-user-id", user.to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get(&format!("/notes/label/{}", label_id), user))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == Sharing ==

#[tokio::test]
async fn test_share_note_through_api() {
    let app = create_test_app();

    let owner = register_user(&app, "Ada", "Lovelace", "ada@example.com").await;
    let collaborator = register_user(&app, "Carol", "Jones", "c@x.com").await;

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/notes",
            owner,
            json!({"title": "T2", "description": "D"}),
        ))
        .await
        .unwrap();
    let note = body_to_json(response.into_body()).await;
    let note_id = note["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            &format!("/notes/{}/collaborators", note_id),
            owner,
            json!({"email": "c@x.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The collaborator sees the note in their shared view and can read it.
    let response = app
        .clone()
        .oneshot(get("/notes/shared", collaborator))
        .await
        .unwrap();
    let shared = body_to_json(response.into_body()).await;
    assert_eq!(shared["count"], 1);
    assert_eq!(shared["notes"][0]["title"], "T2");

    let response = app
        .clone()
        .oneshot(get(&format!("/notes/{}", note_id), collaborator))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Unknown email is a 404, invalid email a 400.
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            &format!("/notes/{}/collaborators", note_id),
            owner,
            json!({"email": "nobody@x.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(send_json(
            "POST",
            &format!("/notes/{}/collaborators", note_id),
            owner,
            json!({"email": "not-an-email"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// == Identity & infrastructure ==

#[tokio::test]
async fn test_missing_identity_header_is_rejected() {
    let app = create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/notes").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_identity_header_is_rejected() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/notes")
                .header("x-user-id", "not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_users_are_isolated() {
    let app = create_test_app();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    app.clone()
        .oneshot(send_json(
            "POST",
            "/notes",
            alice,
            json!({"title": "private", "description": "D"}),
        ))
        .await
        .unwrap();

    let response = app.oneshot(get("/notes", bob)).await.unwrap();
    let listed = body_to_json(response.into_body()).await;
    assert_eq!(listed["count"], 0);
}

#[tokio::test]
async fn test_cache_stats_expose_hits_and_misses() {
    let app = create_test_app();
    let user = Uuid::new_v4();

    // Miss then hit.
    app.clone().oneshot(get("/notes", user)).await.unwrap();
    app.clone().oneshot(get("/notes", user)).await.unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/cache/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stats = body_to_json(response.into_body()).await;
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["hits"], 1);
}
