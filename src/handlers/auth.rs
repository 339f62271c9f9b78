use crate::{
    auth::{clear_session_cookie, session_cookie, session_token},
    models::{AuthenticatedIdentity, LoginRequest, RegisterRequest, UserResponse},
    utils::{ApiJson, ApiResult},
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use validator::Validate;

/// Handle user registration: creates the user, their personal workspace, and
/// binds the caller to a fresh session.
pub async fn register(
    State(state): State<crate::AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate()?;

    let (user, token) = state.auth.register(request).await?;
    let cookie = session_cookie(&state.config.session, &token);

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(user),
    ))
}

/// Handle user login
pub async fn login(
    State(state): State<crate::AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate()?;

    let (user, token) = state.auth.login(request).await?;
    let cookie = session_cookie(&state.config.session, &token);

    Ok(([(header::SET_COOKIE, cookie)], Json(user)))
}

/// Handle logout. Destroys whatever session the caller presents and clears
/// the cookie; succeeds even when the session is already gone, so a repeated
/// logout is never an error.
pub async fn logout(
    State(state): State<crate::AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    if let Some(token) = session_token(&headers, &state.config.session.cookie_name) {
        state.auth.logout(&token).await?;
    }

    Ok((
        [(header::SET_COOKIE, clear_session_cookie(&state.config.session))],
        Json(json!({ "success": true })),
    ))
}

/// Get the current user with their workspace memberships
pub async fn me(Extension(identity): Extension<AuthenticatedIdentity>) -> Json<UserResponse> {
    Json(UserResponse::from(identity))
}
