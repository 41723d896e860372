use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::api::build_router;
use crate::service::SocialConfig;
use crate::service::testing::{make_service, make_service_with};

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {}", t));
    }
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Register and log in; returns (user id, token).
async fn signup(app: &axum::Router, email: &str, role: &str) -> (String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/users",
        None,
        Some(json!({
            "first_name": "Test", "last_name": "User",
            "email": email, "password": "hunter22", "role": role
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["user"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        app,
        "POST",
        "/users/login",
        None,
        Some(json!({"email": email, "password": "hunter22"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    (id, body["token"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn register_hides_hash_and_rejects_duplicates() {
    let (svc, _dir) = make_service();
    let app = build_router(svc);

    let payload = json!({
        "first_name": "Ada", "last_name": "Lovelace",
        "email": "ada@example.com", "password": "hunter22"
    });
    let (status, body) = send(&app, "POST", "/users", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["error"], false);
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["user"].get("password").is_none());

    let (status, body) = send(&app, "POST", "/users", None, Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
    assert_eq!(body["message"], "User exists with the provided email");
}

#[tokio::test]
async fn malformed_body_uses_envelope() {
    let (svc, _dir) = make_service();
    let app = build_router(svc);

    let req = Request::builder()
        .method("POST")
        .uri("/users")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn login_failure_is_401() {
    let (svc, _dir) = make_service();
    let app = build_router(svc);
    signup(&app, "a@example.com", "user").await;

    let (status, body) = send(
        &app,
        "POST",
        "/users/login",
        None,
        Some(json!({"email": "a@example.com", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn protected_routes_require_token() {
    let (svc, _dir) = make_service();
    let app = build_router(svc);

    let (status, body) = send(&app, "POST", "/posts", None, Some(json!({"title": "t", "content": "c"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);

    let (status, body) = send(&app, "POST", "/posts", Some("garbage"), Some(json!({"title": "t", "content": "c"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid token");

    let (status, _) = send(&app, "DELETE", "/users/whatever", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Nothing was written.
    let (status, body) = send(&app, "GET", "/posts", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn post_lifecycle_and_reactions() {
    let (svc, _dir) = make_service();
    let app = build_router(svc);
    let (alice, token) = signup(&app, "alice@example.com", "user").await;

    let (status, body) = send(
        &app,
        "POST",
        "/posts",
        Some(&token),
        Some(json!({"title": "Hello", "content": "World", "postedBy": "someone-else"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["post"]["postedBy"], alice.as_str());
    let post_id = body["post"]["id"].as_str().unwrap().to_string();

    let likes = format!("/posts/{}/likes", post_id);
    let (status, body) = send(&app, "POST", &likes, Some(&token), Some(json!({"action": "like"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["likes"], 1);
    assert_eq!(body["dislikes"], 0);

    let (status, body) = send(&app, "POST", &likes, Some(&token), Some(json!({"action": "like"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "already liked");

    let (status, body) = send(&app, "POST", &likes, Some(&token), Some(json!({"action": "shrug"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "no valid action");

    let (status, body) = send(&app, "POST", "/posts/nope/likes", Some(&token), Some(json!({"action": "like"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, body) = send(&app, "GET", "/posts", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["posts"][0]["author"]["id"], alice.as_str());
    assert_eq!(body["posts"][0]["likes"], json!([alice]));

    let uri = format!("/posts/{}", post_id);
    let (status, body) = send(&app, "PATCH", &uri, Some(&token), Some(json!({"title": "Edited"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"]["title"], "Edited");
    assert_eq!(body["post"]["content"], "World");

    let (status, body) = send(&app, "PATCH", &uri, Some(&token), Some(json!({"title": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "title is required");

    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn admin_cannot_create_posts() {
    let (svc, _dir) = make_service();
    let app = build_router(svc);
    let (_, token) = signup(&app, "root@example.com", "admin").await;

    let (status, body) = send(&app, "POST", "/posts", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Cannot create posts with role: admin");

    let (status, _) = send(&app, "POST", "/comments", Some(&token), Some(json!({"content": "hi"}))).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn friendship_over_http() {
    let (svc, _dir) = make_service();
    let app = build_router(svc);
    let (alice, alice_token) = signup(&app, "alice@example.com", "user").await;
    let (bob, _) = signup(&app, "bob@example.com", "user").await;

    let (status, body) = send(
        &app,
        "POST",
        "/users/addfriend",
        Some(&alice_token),
        Some(json!({"action": "add", "friendId": bob})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Friend added");

    let (_, body) = send(&app, "GET", &format!("/users/{}", bob), None, None).await;
    assert_eq!(body["user"]["friends"], json!([alice]));

    let (status, body) = send(
        &app,
        "POST",
        "/users/addfriend",
        Some(&alice_token),
        Some(json!({"action": "add", "friendId": bob})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "already friends");

    let (status, body) = send(
        &app,
        "POST",
        "/users/addfriend",
        Some(&alice_token),
        Some(json!({"action": "add", "friendId": alice})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "cannot befriend yourself");

    let (_, body) = send(&app, "GET", "/users", None, None).await;
    assert_eq!(body["total"], 2);
    let listed = body["users"].as_array().unwrap();
    let entry = listed.iter().find(|u| u["id"] == alice.as_str()).unwrap();
    assert_eq!(entry["friends"][0]["email"], "bob@example.com");

    let (status, body) = send(
        &app,
        "POST",
        "/users/addfriend",
        Some(&alice_token),
        Some(json!({"action": "delete", "friendId": bob})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Friend deleted");

    for id in [&alice, &bob] {
        let (_, body) = send(&app, "GET", &format!("/users/{}", id), None, None).await;
        assert_eq!(body["user"]["friends"], json!([]), "{id}");
    }

    let (status, body) = send(
        &app,
        "POST",
        "/users/addfriend",
        Some(&alice_token),
        Some(json!({"action": "delete", "friendId": bob})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "not a friend");
}

#[tokio::test]
async fn expired_token_is_401() {
    let config = SocialConfig {
        token_ttl_minutes: -5,
        ..Default::default()
    };
    let (svc, _dir) = make_service_with(config);
    let app = build_router(svc);
    let (_, token) = signup(&app, "late@example.com", "user").await;

    let (status, body) = send(&app, "POST", "/posts", Some(&token), Some(json!({"title": "t", "content": "c"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);
    assert_eq!(body["message"], "token expired");

    let (_, body) = send(&app, "GET", "/posts", None, None).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn comment_lifecycle() {
    let (svc, _dir) = make_service();
    let app = build_router(svc);
    let (_, token) = signup(&app, "alice@example.com", "user").await;

    let (_, body) = send(&app, "POST", "/posts", Some(&token), Some(json!({"title": "t", "content": "c"}))).await;
    let post_id = body["post"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/comments",
        Some(&token),
        Some(json!({"content": "first", "commentOnPost": post_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = body["comment"]["id"].as_str().unwrap().to_string();
    let uri = format!("/comments/{}", comment_id);

    let (status, body) = send(&app, "POST", &uri, Some(&token), Some(json!({"content": "edited"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comment"]["content"], "edited");

    let (status, body) = send(
        &app,
        "POST",
        &format!("{}/likes", uri),
        Some(&token),
        Some(json!({"action": "dislike"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dislikes"], 1);

    let (_, body) = send(&app, "GET", "/comments", None, None).await;
    assert_eq!(body["comments"][0]["post"]["id"], post_id.as_str());
    assert_eq!(body["comments"][0]["post"]["author"]["email"], "alice@example.com");

    let (status, _) = send(&app, "POST", "/comments/missing", Some(&token), Some(json!({"content": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}
