/// Authentication flow tests: registration, login, logout, and the session
/// lifecycle, exercised end to end through the real router and guard chain.
use axum::{
    body::Body,
    extract::Request,
    http::{header, Method, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

mod test_utils {
    use super::*;
    use cadence_api::{
        auth::{AuthService, MemorySessionStore, SessionStore},
        db::{Datastore, MemoryStore},
        utils::Config,
        AppState,
    };
    use std::sync::Arc;

    pub struct TestContext {
        pub app: Router,
        pub store: Arc<MemoryStore>,
    }

    impl TestContext {
        pub fn new() -> Self {
            let store = Arc::new(MemoryStore::new());
            let datastore: Arc<dyn Datastore> = store.clone();
            let sessions: Arc<dyn SessionStore> =
                Arc::new(MemorySessionStore::new(chrono::Duration::days(7)));
            let auth = Arc::new(AuthService::new(datastore.clone(), sessions.clone()));
            let config = Arc::new(Config::for_tests());

            let state = AppState {
                store: datastore,
                sessions,
                auth,
                config,
            };

            Self {
                app: cadence_api::app(state),
                store,
            }
        }

        pub async fn post_json(&self, uri: &str, body: Value) -> axum::response::Response {
            let request = Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            self.app.clone().oneshot(request).await.unwrap()
        }

        pub async fn post_json_with_cookie(
            &self,
            uri: &str,
            body: Value,
            cookie: &str,
        ) -> axum::response::Response {
            let request = Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::COOKIE, cookie)
                .body(Body::from(body.to_string()))
                .unwrap();
            self.app.clone().oneshot(request).await.unwrap()
        }

        pub async fn get_with_cookie(&self, uri: &str, cookie: &str) -> axum::response::Response {
            let request = Request::builder()
                .method(Method::GET)
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap();
            self.app.clone().oneshot(request).await.unwrap()
        }

        pub async fn get(&self, uri: &str) -> axum::response::Response {
            let request = Request::builder()
                .method(Method::GET)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            self.app.clone().oneshot(request).await.unwrap()
        }

        /// Register a user and return the session cookie plus response body.
        pub async fn register(
            &self,
            email: &str,
            password: &str,
            name: &str,
        ) -> (String, Value) {
            let response = self
                .post_json(
                    "/api/v1/auth/register",
                    json!({ "email": email, "password": password, "name": name }),
                )
                .await;
            assert_eq!(response.status(), StatusCode::CREATED);
            let cookie = session_cookie(&response);
            let body = body_json(response).await;
            (cookie, body)
        }
    }

    /// Extract the `name=value` part of the session Set-Cookie header.
    pub fn session_cookie(response: &axum::response::Response) -> String {
        response
            .headers()
            .get(header::SET_COOKIE)
            .expect("response should set a session cookie")
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    pub async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}

use test_utils::{body_json, session_cookie, TestContext};

#[tokio::test]
async fn register_creates_user_workspace_and_session() {
    let ctx = TestContext::new();

    let (cookie, body) = ctx
        .register("alice@example.com", "password123", "Alice")
        .await;

    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["name"], "Alice");
    // Hash is redacted from every outward-facing shape.
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("password_hash").is_none());

    let workspaces = body["workspaces"].as_array().unwrap();
    assert_eq!(workspaces.len(), 1);
    assert_eq!(workspaces[0]["name"], "Alice's Workspace");
    assert_eq!(workspaces[0]["role"], "owner");

    // The returned session is immediately usable.
    let response = ctx.get_with_cookie("/api/v1/auth/me", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["email"], "alice@example.com");
    assert_eq!(me["workspaces"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn session_cookie_carries_the_expected_attributes() {
    let ctx = TestContext::new();

    let response = ctx
        .post_json(
            "/api/v1/auth/register",
            json!({ "email": "alice@example.com", "password": "password123", "name": "Alice" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();

    assert!(cookie.starts_with("cadence_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    // Seven days, in seconds.
    assert!(cookie.contains("Max-Age=604800"));
    // Development settings: SameSite=Lax and no Secure flag.
    assert!(cookie.contains("SameSite=Lax"));
    assert!(!cookie.contains("Secure"));

    // Login mints a cookie with the same attributes.
    let login = ctx
        .post_json(
            "/api/v1/auth/login",
            json!({ "email": "alice@example.com", "password": "password123" }),
        )
        .await;
    assert_eq!(login.status(), StatusCode::OK);
    let login_cookie = login
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(login_cookie.starts_with("cadence_session="));
    assert!(login_cookie.contains("HttpOnly"));
    assert!(login_cookie.contains("Max-Age=604800"));
    assert!(login_cookie.contains("SameSite=Lax"));
}

#[tokio::test]
async fn register_honors_explicit_workspace_name() {
    let ctx = TestContext::new();

    let response = ctx
        .post_json(
            "/api/v1/auth/register",
            json!({
                "email": "bob@example.com",
                "password": "password123",
                "name": "Bob",
                "workspaceName": "Acme Marketing"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["workspaces"][0]["name"], "Acme Marketing");
}

#[tokio::test]
async fn register_rejects_invalid_input() {
    let ctx = TestContext::new();

    // Missing fields entirely.
    let response = ctx.post_json("/api/v1/auth/register", json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Weak password.
    let response = ctx
        .post_json(
            "/api/v1/auth/register",
            json!({ "email": "carol@example.com", "password": "short", "name": "Carol" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("password"));

    // Malformed email.
    let response = ctx
        .post_json(
            "/api/v1/auth/register",
            json!({ "email": "not-an-email", "password": "password123", "name": "Carol" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_registration_fails_and_first_account_survives() {
    let ctx = TestContext::new();

    let (first_cookie, _) = ctx
        .register("alice@example.com", "password123", "Alice")
        .await;

    let response = ctx
        .post_json(
            "/api/v1/auth/register",
            json!({ "email": "alice@example.com", "password": "different456", "name": "Mallory" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "User with this email already exists");

    // The original user and session are unaffected.
    let response = ctx.get_with_cookie("/api/v1/auth/me", &first_cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["name"], "Alice");
}

#[tokio::test]
async fn login_succeeds_with_correct_password() {
    let ctx = TestContext::new();
    ctx.register("alice@example.com", "password123", "Alice")
        .await;

    let response = ctx
        .post_json(
            "/api/v1/auth/login",
            json!({ "email": "alice@example.com", "password": "password123" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    let body = body_json(response).await;
    assert_eq!(body["email"], "alice@example.com");
    assert!(body.get("passwordHash").is_none());

    let response = ctx.get_with_cookie("/api/v1/auth/me", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let ctx = TestContext::new();
    ctx.register("alice@example.com", "password123", "Alice")
        .await;

    let wrong_password = ctx
        .post_json(
            "/api/v1/auth/login",
            json!({ "email": "alice@example.com", "password": "wrongpassword" }),
        )
        .await;
    let unknown_email = ctx
        .post_json(
            "/api/v1/auth/login",
            json!({ "email": "nobody@example.com", "password": "password123" }),
        )
        .await;

    // Same status and same body for both failure causes, so the response
    // never reveals whether the account exists.
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let wrong_password_body = body_json(wrong_password).await;
    let unknown_email_body = body_json(unknown_email).await;
    assert_eq!(wrong_password_body, unknown_email_body);
    assert_eq!(wrong_password_body["error"], "Invalid email or password");
}

#[tokio::test]
async fn logout_invalidates_session_and_is_idempotent() {
    let ctx = TestContext::new();
    let (cookie, _) = ctx
        .register("alice@example.com", "password123", "Alice")
        .await;

    let response = ctx
        .post_json_with_cookie("/api/v1/auth/logout", json!({}), &cookie)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    // The cookie is cleared on the client.
    let clearing = response.headers().get(header::SET_COOKIE).unwrap();
    assert!(clearing.to_str().unwrap().contains("Max-Age=0"));

    // A stale token is treated exactly like no token at all.
    let stale = ctx.get_with_cookie("/api/v1/auth/me", &cookie).await;
    let missing = ctx.get("/api/v1/auth/me").await;
    assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    let stale_body = body_json(stale).await;
    let missing_body = body_json(missing).await;
    assert_eq!(stale_body, missing_body);
    assert_eq!(stale_body["error"], "Unauthorized");

    // Second logout with the dead cookie still succeeds.
    let response = ctx
        .post_json_with_cookie("/api/v1/auth/logout", json!({}), &cookie)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn me_requires_a_session() {
    let ctx = TestContext::new();

    let response = ctx.get("/api/v1/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn session_for_deleted_user_is_rejected() {
    let ctx = TestContext::new();
    let (cookie, body) = ctx
        .register("alice@example.com", "password123", "Alice")
        .await;
    let user_id = body["id"].as_str().unwrap().parse().unwrap();

    // The user vanishes between session creation and the next request.
    ctx.store.remove_user(user_id).await;

    let response = ctx.get_with_cookie("/api/v1/auth/me", &cookie).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "User not found");
}
