//! HTTP-level tests against the full router

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use super::{build_router, AppState};
use crate::config::BlogConfig;
use crate::db::{create_test_pool, migrations};

struct TestApp {
    server: TestServer,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_config(BlogConfig::default()).await
    }

    async fn with_config(blog: BlogConfig) -> Self {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(pool, &blog);
        let router = build_router(state, "http://localhost:3000").expect("Failed to build router");
        let server = TestServer::new(router).expect("Failed to start test server");
        Self { server }
    }

    /// Register a user and return their session token
    async fn register(&self, username: &str) -> String {
        let response = self
            .server
            .post("/api/v1/auth/register")
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "correct horse battery",
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        response.json::<Value>()["token"]
            .as_str()
            .expect("token in response")
            .to_string()
    }

    async fn me(&self, token: &str) -> Value {
        self.server
            .get("/api/v1/auth/me")
            .authorization_bearer(token)
            .await
            .json::<Value>()
    }

    async fn create_category(&self, token: &str, slug: &str) -> i64 {
        let response = self
            .server
            .post("/api/v1/admin/categories")
            .authorization_bearer(token)
            .json(&json!({ "title": slug, "slug": slug }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        response.json::<Value>()["id"].as_i64().expect("category id")
    }

    async fn create_post(&self, token: &str, body: Value) -> i64 {
        let response = self
            .server
            .post("/api/v1/posts")
            .authorization_bearer(token)
            .json(&body)
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        response.json::<Value>()["post"]["id"]
            .as_i64()
            .expect("post id")
    }

    async fn add_comment(&self, token: &str, post_id: i64, text: &str) -> i64 {
        let response = self
            .server
            .post(&format!("/api/v1/posts/{}/comments", post_id))
            .authorization_bearer(token)
            .json(&json!({ "text": text }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        response.json::<Value>()["comment"]["id"]
            .as_i64()
            .expect("comment id")
    }
}

fn published_in(category_id: i64, title: &str) -> Value {
    json!({
        "title": title,
        "text": "Some text",
        "category_id": category_id,
        "pub_date": (Utc::now() - Duration::hours(1)).to_rfc3339(),
    })
}

#[tokio::test]
async fn test_first_user_is_superuser() {
    let app = TestApp::new().await;
    let admin = app.register("admin").await;
    let reader = app.register("reader").await;

    let admin = app.me(&admin).await;
    assert_eq!(admin["is_staff"], true);
    assert_eq!(admin["is_superuser"], true);

    let reader = app.me(&reader).await;
    assert_eq!(reader["is_staff"], false);
    assert_eq!(reader["is_superuser"], false);
}

#[tokio::test]
async fn test_empty_feed() {
    let app = TestApp::new().await;
    let response = app.server.get("/api/v1/posts").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["total"], 0);
    assert_eq!(body["page"], 1);
    assert_eq!(body["total_pages"], 1);
    assert_eq!(body["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_mutations_require_auth() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/v1/posts")
        .json(&json!({ "title": "t", "text": "x" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"]["code"], "UNAUTHORIZED");

    let response = app
        .server
        .post("/api/v1/posts/1/comments")
        .authorization_bearer("not-a-session")
        .json(&json!({ "text": "hi" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_comment_delete_scenario() {
    let app = TestApp::new().await;
    let staff = app.register("bob").await;
    let alice = app.register("alice").await;
    let carol = app.register("carol").await;
    let news = app.create_category(&staff, "news").await;

    let post_id = app.create_post(&staff, published_in(news, "Bob's post")).await;
    let comment_id = app.add_comment(&alice, post_id, "Nice post").await;

    let feed = app.server.get("/api/v1/posts").await.json::<Value>();
    assert_eq!(feed["items"][0]["id"], post_id);
    assert_eq!(feed["items"][0]["comment_count"], 1);

    let path = format!("/api/v1/posts/{}/comments/{}", post_id, comment_id);

    let response = app.server.delete(&path).authorization_bearer(&carol).await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body = response.json::<Value>();
    assert_eq!(
        body["error"]["details"]["redirect"],
        format!("/posts/{}", post_id)
    );

    let response = app.server.delete(&path).authorization_bearer(&staff).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let feed = app.server.get("/api/v1/posts").await.json::<Value>();
    assert_eq!(feed["items"][0]["comment_count"], 0);

    let detail = app
        .server
        .get(&format!("/api/v1/posts/{}", post_id))
        .await
        .json::<Value>();
    assert_eq!(detail["comment_count"], 0);
}

#[tokio::test]
async fn test_comment_edit_author_only() {
    let app = TestApp::new().await;
    let staff = app.register("admin").await;
    let alice = app.register("alice").await;
    let news = app.create_category(&staff, "news").await;
    let post_id = app.create_post(&staff, published_in(news, "p")).await;
    let comment_id = app.add_comment(&alice, post_id, "frist").await;
    let path = format!("/api/v1/posts/{}/comments/{}", post_id, comment_id);

    let response = app
        .server
        .put(&path)
        .authorization_bearer(&staff)
        .json(&json!({ "text": "moderated" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = app
        .server
        .put(&path)
        .authorization_bearer(&alice)
        .json(&json!({ "text": "   " }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .server
        .put(&path)
        .authorization_bearer(&alice)
        .json(&json!({ "text": "first" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["comment"]["text"], "first");
}

#[tokio::test]
async fn test_future_post_visible_only_to_author() {
    let app = TestApp::new().await;
    let staff = app.register("admin").await;
    let author = app.register("author").await;
    let reader = app.register("reader").await;
    let news = app.create_category(&staff, "news").await;

    let post_id = app
        .create_post(
            &author,
            json!({
                "title": "Scheduled",
                "text": "Later",
                "category_id": news,
                "pub_date": (Utc::now() + Duration::days(1)).to_rfc3339(),
            }),
        )
        .await;
    let path = format!("/api/v1/posts/{}", post_id);

    let response = app.server.get(&path).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app.server.get(&path).authorization_bearer(&reader).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app.server.get(&path).authorization_bearer(&author).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // Hidden from the reader, so no confirmation that it exists
    let response = app
        .server
        .delete(&path)
        .authorization_bearer(&reader)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let feed = app.server.get("/api/v1/posts").await.json::<Value>();
    assert_eq!(feed["total"], 0);
    let feed = app
        .server
        .get("/api/v1/posts")
        .authorization_bearer(&author)
        .await
        .json::<Value>();
    assert_eq!(feed["total"], 1);
}

#[tokio::test]
async fn test_post_edit_and_delete_rules() {
    let app = TestApp::new().await;
    let staff = app.register("admin").await;
    let author = app.register("author").await;
    let other = app.register("other").await;
    let news = app.create_category(&staff, "news").await;
    let post_id = app.create_post(&author, published_in(news, "Mine")).await;
    let path = format!("/api/v1/posts/{}", post_id);

    let response = app
        .server
        .put(&path)
        .authorization_bearer(&other)
        .json(&json!({ "title": "Theirs" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(
        response.json::<Value>()["error"]["details"]["redirect"],
        format!("/posts/{}", post_id)
    );

    // Staff may not delete posts by default
    let response = app.server.delete(&path).authorization_bearer(&staff).await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(
        response.json::<Value>()["error"]["details"]["redirect"],
        "/"
    );

    let response = app
        .server
        .put(&path)
        .authorization_bearer(&author)
        .json(&json!({ "title": "Renamed", "category_id": null }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let post = response.json::<Value>();
    assert_eq!(post["title"], "Renamed");
    assert_eq!(post["category"], Value::Null);

    let response = app.server.delete(&path).authorization_bearer(&author).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["redirect"], "/");

    let response = app.server.get(&path).authorization_bearer(&author).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_staff_post_delete_when_configured() {
    let app = TestApp::with_config(BlogConfig {
        staff_can_delete_posts: true,
        ..BlogConfig::default()
    })
    .await;
    let staff = app.register("admin").await;
    let author = app.register("author").await;
    let news = app.create_category(&staff, "news").await;
    let post_id = app.create_post(&author, published_in(news, "p")).await;

    let response = app
        .server
        .delete(&format!("/api/v1/posts/{}", post_id))
        .authorization_bearer(&staff)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_post_redirects_to_profile() {
    let app = TestApp::new().await;
    let token = app.register("writer").await;

    let response = app
        .server
        .post("/api/v1/posts")
        .authorization_bearer(&token)
        .json(&json!({ "title": "Hello", "text": "World" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["redirect"], "/profile/writer");

    let response = app
        .server
        .post("/api/v1/posts")
        .authorization_bearer(&token)
        .json(&json!({ "title": "  ", "text": "World" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_feed_pagination_clamps() {
    let app = TestApp::new().await;
    let staff = app.register("admin").await;
    let news = app.create_category(&staff, "news").await;
    for i in 0..12 {
        app.create_post(&staff, published_in(news, &format!("post {}", i)))
            .await;
    }

    let first = app
        .server
        .get("/api/v1/posts")
        .add_query_param("page", "abc")
        .await
        .json::<Value>();
    assert_eq!(first["page"], 1);
    assert_eq!(first["items"].as_array().map(Vec::len), Some(10));
    assert_eq!(first["total_pages"], 2);
    assert_eq!(first["has_next"], true);

    let last = app
        .server
        .get("/api/v1/posts")
        .add_query_param("page", "99")
        .await
        .json::<Value>();
    assert_eq!(last["page"], 2);
    assert_eq!(last["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(last["has_next"], false);
    assert_eq!(last["has_prev"], true);

    let negative = app
        .server
        .get("/api/v1/posts")
        .add_query_param("page", "-3")
        .await
        .json::<Value>();
    assert_eq!(negative["page"], 1);
}

#[tokio::test]
async fn test_category_feed() {
    let app = TestApp::new().await;
    let staff = app.register("admin").await;
    let travel = app.create_category(&staff, "travel").await;
    let food = app.create_category(&staff, "food").await;
    app.create_post(&staff, published_in(travel, "Trip")).await;
    app.create_post(&staff, published_in(food, "Soup")).await;

    let response = app.server.get("/api/v1/category/travel").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["category"]["slug"], "travel");
    assert_eq!(body["posts"]["total"], 1);
    assert_eq!(body["posts"]["items"][0]["title"], "Trip");

    let response = app
        .server
        .put(&format!("/api/v1/admin/categories/{}", travel))
        .authorization_bearer(&staff)
        .json(&json!({ "is_published": false }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = app.server.get("/api/v1/category/travel").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let response = app.server.get("/api/v1/category/nowhere").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    // The hidden category also hides its posts from the global feed
    let feed = app.server.get("/api/v1/posts").await.json::<Value>();
    assert_eq!(feed["total"], 1);
    assert_eq!(feed["items"][0]["title"], "Soup");
}

#[tokio::test]
async fn test_profile_feed_and_edit() {
    let app = TestApp::new().await;
    let staff = app.register("admin").await;
    let author = app.register("author").await;
    let news = app.create_category(&staff, "news").await;
    app.create_post(&author, published_in(news, "Public")).await;
    let mut draft = published_in(news, "Draft");
    draft["is_published"] = json!(false);
    app.create_post(&author, draft).await;

    let public = app
        .server
        .get("/api/v1/profile/author")
        .await
        .json::<Value>();
    assert_eq!(public["profile"]["username"], "author");
    assert_eq!(public["posts"]["total"], 1);

    let own = app
        .server
        .get("/api/v1/profile/author")
        .authorization_bearer(&author)
        .await
        .json::<Value>();
    assert_eq!(own["posts"]["total"], 2);

    let response = app.server.get("/api/v1/profile/nobody").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app
        .server
        .put("/api/v1/profile")
        .authorization_bearer(&author)
        .json(&json!({ "first_name": "Ada", "bio": "Writes things" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let view = response.json::<Value>();
    assert_eq!(view["first_name"], "Ada");
    assert_eq!(view["bio"], "Writes things");

    let response = app
        .server
        .put("/api/v1/profile")
        .authorization_bearer(&author)
        .json(&json!({ "username": "admin" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_routes_need_staff() {
    let app = TestApp::new().await;
    let superuser = app.register("admin").await;
    let reader = app.register("reader").await;

    let response = app.server.get("/api/v1/admin/categories").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .post("/api/v1/admin/categories")
        .authorization_bearer(&reader)
        .json(&json!({ "title": "X", "slug": "x" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let reader_id = app.me(&reader).await["id"].as_i64().expect("user id");
    let response = app
        .server
        .put(&format!("/api/v1/admin/users/{}/staff", reader_id))
        .authorization_bearer(&superuser)
        .json(&json!({ "is_staff": true }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["is_staff"], true);

    // Staff now, but still not a superuser
    let response = app
        .server
        .get("/api/v1/admin/categories")
        .authorization_bearer(&reader)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let admin_id = app.me(&superuser).await["id"].as_i64().expect("user id");
    let response = app
        .server
        .put(&format!("/api/v1/admin/users/{}/staff", admin_id))
        .authorization_bearer(&reader)
        .json(&json!({ "is_staff": false }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_login_and_logout() {
    let app = TestApp::new().await;
    app.register("alice").await;

    let response = app
        .server
        .post("/api/v1/auth/login")
        .json(&json!({ "username_or_email": "alice", "password": "wrong" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .post("/api/v1/auth/login")
        .json(&json!({
            "username_or_email": "alice@example.com",
            "password": "correct horse battery",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let token = response.json::<Value>()["token"]
        .as_str()
        .expect("token")
        .to_string();

    let response = app
        .server
        .post("/api/v1/auth/logout")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = app
        .server
        .get("/api/v1/auth/me")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_conflict() {
    let app = TestApp::new().await;
    app.register("alice").await;

    let response = app
        .server
        .post("/api/v1/auth/register")
        .json(&json!({
            "username": "alice",
            "email": "other@example.com",
            "password": "correct horse battery",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}
