use axum::{
    body::Body,
    extract::Request,
    http::{header, Uri},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{models::AuthenticatedIdentity, utils::ApiError};

/// Header checked first when resolving the target workspace.
pub const WORKSPACE_HEADER: &str = "x-workspace-id";
/// Query parameter checked second.
pub const WORKSPACE_QUERY_PARAM: &str = "workspaceId";
/// Body field checked last.
const WORKSPACE_BODY_FIELD: &str = "workspaceId";

/// Upper bound on how much of a JSON body the resolver will buffer.
const BODY_PEEK_LIMIT: usize = 256 * 1024;

/// Workspace id as extracted from the request, before any authorization.
/// `None` is not an error here; endpoints that need a workspace fail later in
/// [`require_workspace`].
#[derive(Debug, Clone)]
pub struct WorkspaceParam(pub Option<String>);

/// Workspace id that passed the membership check. Handlers must scope every
/// read and write to this id and never to one pulled from the payload.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizedWorkspace(pub Uuid);

fn query_param(uri: &Uri, name: &str) -> Option<String> {
    uri.query()?.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

fn is_json(headers: &axum::http::HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

/// Workspace resolver: pure extraction with the fixed precedence
/// header > query parameter > body field. First non-empty value wins. Peeking
/// at a JSON body buffers and restores it for the handler. Extraction never
/// fails; a body over the peek limit simply yields no id.
pub async fn resolve_workspace(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let mut resolved = request
        .headers()
        .get(WORKSPACE_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| query_param(request.uri(), WORKSPACE_QUERY_PARAM));

    if resolved.is_none() && is_json(request.headers()) {
        let (parts, body) = request.into_parts();
        match axum::body::to_bytes(body, BODY_PEEK_LIMIT).await {
            Ok(bytes) => {
                resolved = serde_json::from_slice::<serde_json::Value>(&bytes)
                    .ok()
                    .and_then(|value| {
                        value
                            .get(WORKSPACE_BODY_FIELD)
                            .and_then(|id| id.as_str())
                            .filter(|id| !id.is_empty())
                            .map(str::to_string)
                    });
                request = Request::from_parts(parts, Body::from(bytes));
            }
            Err(_) => {
                // A body over the peek limit resolves as carrying no
                // workspace id. The drained bytes cannot be replayed, so the
                // request continues with an empty body; endpoints behind
                // this resolver all require a workspace and answer 400
                // before reading it.
                tracing::debug!(path = %parts.uri.path(), "request body exceeds workspace peek limit");
                request = Request::from_parts(parts, Body::empty());
            }
        }
    }

    request.extensions_mut().insert(WorkspaceParam(resolved));
    Ok(next.run(request).await)
}

/// Workspace authorization guard. Runs after authentication and identity
/// load; grants access only when the resolved workspace id exactly matches
/// one of the identity's memberships.
pub async fn require_workspace(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let Some(identity) = request.extensions().get::<AuthenticatedIdentity>().cloned() else {
        // Unreachable when the guard chain is ordered correctly; fail closed
        // anyway.
        return Err(ApiError::unauthorized());
    };

    let param = request
        .extensions()
        .get::<WorkspaceParam>()
        .and_then(|p| p.0.clone());
    let Some(workspace_id) = param else {
        return Err(ApiError::BadRequest("Workspace ID required".to_string()));
    };

    let Some(membership) = identity.membership_for(&workspace_id) else {
        tracing::warn!(
            user_id = %identity.user_id,
            workspace_id = %workspace_id,
            path = %request.uri().path(),
            "workspace access denied"
        );
        return Err(ApiError::Forbidden(
            "Access denied to this workspace".to_string(),
        ));
    };

    let authorized = AuthorizedWorkspace(membership.workspace.id);
    request.extensions_mut().insert(authorized);
    Ok(next.run(request).await)
}
