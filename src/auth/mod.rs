pub mod session;

pub use session::{MemorySessionStore, SessionStore};

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::Datastore,
    models::{AuthenticatedIdentity, LoginRequest, RegisterRequest, UserResponse},
    utils::{config::SessionConfig, ApiError, ApiResult},
};

/// Authenticated session attached to the request by [`require_session`].
/// Carries the token alongside the user id so downstream code can reference
/// the exact session that authenticated the request.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub token: String,
}

/// Authentication service: password hashing plus the register/login flows
/// that compose the credential and session stores.
pub struct AuthService {
    store: Arc<dyn Datastore>,
    sessions: Arc<dyn SessionStore>,
    argon2: Argon2<'static>,
}

impl AuthService {
    pub fn new(store: Arc<dyn Datastore>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            sessions,
            argon2: Argon2::default(),
        }
    }

    /// Hash a password for storage: argon2id with a fresh OS salt.
    pub fn hash_password(&self, password: &str) -> ApiResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| ApiError::Internal(anyhow::anyhow!("Failed to hash password")))?;
        Ok(password_hash.to_string())
    }

    /// Verify a password against a stored hash. Malformed stored hashes read
    /// as non-matching, never as an error.
    pub fn verify_password(&self, password: &str, stored: &str) -> bool {
        match PasswordHash::new(stored) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Register a new user: user record, personal workspace with an `owner`
    /// membership and seeded channels, and a fresh session.
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<(UserResponse, String)> {
        let password_hash = self.hash_password(&request.password)?;
        let user = self
            .store
            .create_user(&request.email, &request.name, &password_hash)
            .await?;

        let workspace_name = request
            .workspace_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("{}'s Workspace", user.name));
        self.store.create_workspace(user.id, &workspace_name).await?;

        let token = self.sessions.create(user.id).await?;
        tracing::info!(user_id = %user.id, "registered new user");

        let identity = self.identity_or_internal(user.id).await?;
        Ok((UserResponse::from(identity), token))
    }

    /// Log a user in. Unknown email and wrong password produce the identical
    /// generic error.
    pub async fn login(&self, request: LoginRequest) -> ApiResult<(UserResponse, String)> {
        let Some(user) = self.store.user_by_email(&request.email).await? else {
            return Err(ApiError::invalid_credentials());
        };
        if !self.verify_password(&request.password, &user.password_hash) {
            return Err(ApiError::invalid_credentials());
        }

        let token = self.sessions.create(user.id).await?;
        tracing::info!(user_id = %user.id, "user logged in");

        let identity = self.identity_or_internal(user.id).await?;
        Ok((UserResponse::from(identity), token))
    }

    /// Destroy a session token. A no-op for tokens that are already gone.
    pub async fn logout(&self, token: &str) -> ApiResult<()> {
        self.sessions.destroy(token).await?;
        Ok(())
    }

    async fn identity_or_internal(&self, user_id: Uuid) -> ApiResult<AuthenticatedIdentity> {
        self.store
            .user_identity(user_id)
            .await?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("user vanished during auth flow")))
    }
}

/// Pull the session token out of the request's cookies.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == cookie_name && !value.is_empty()).then(|| value.to_string())
        })
        .next()
}

/// Build the `Set-Cookie` value that binds the client to a session.
pub fn session_cookie(config: &SessionConfig, token: &str) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; Max-Age={}; SameSite={}",
        config.cookie_name,
        token,
        config.ttl_days * 86_400,
        config.same_site,
    );
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the `Set-Cookie` value that clears the session cookie.
pub fn clear_session_cookie(config: &SessionConfig) -> String {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; Max-Age=0; SameSite={}",
        config.cookie_name, config.same_site,
    );
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Authentication guard: rejects requests without a valid session and
/// attaches the resolved [`SessionUser`] for the stages after it.
pub async fn require_session(
    State(state): State<crate::AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = session_token(request.headers(), &state.config.session.cookie_name) else {
        return Err(ApiError::unauthorized());
    };
    let Some(user_id) = state.sessions.lookup(&token).await? else {
        tracing::debug!(path = %request.uri().path(), "rejected stale or unknown session token");
        return Err(ApiError::unauthorized());
    };

    request.extensions_mut().insert(SessionUser { user_id, token });
    Ok(next.run(request).await)
}

/// Identity loader: expands the authenticated user id into the full
/// [`AuthenticatedIdentity`], re-fetched fresh on every request so membership
/// changes are never served stale.
pub async fn load_identity(
    State(state): State<crate::AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = request
        .extensions()
        .get::<SessionUser>()
        .cloned()
        .ok_or_else(ApiError::unauthorized)?;

    let Some(identity) = state.store.user_identity(session.user_id).await? else {
        // The user was deleted after the session was minted. The caller has
        // no other identity to present, so this is an authentication failure
        // rather than a 404.
        tracing::warn!(user_id = %session.user_id, "session references a deleted user");
        return Err(ApiError::Unauthenticated("User not found".to_string()));
    };

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
