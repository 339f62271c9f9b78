use crate::{
    models::{AuthenticatedIdentity, Channel, CreateWorkspaceRequest, Workspace, WorkspaceMembership},
    utils::{ApiJson, ApiResult},
    workspace::AuthorizedWorkspace,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use validator::Validate;

/// Create an additional workspace for the authenticated user. The caller
/// becomes its owner and the four standard channels are seeded.
pub async fn create_workspace(
    State(state): State<crate::AppState>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    ApiJson(request): ApiJson<CreateWorkspaceRequest>,
) -> ApiResult<(StatusCode, Json<Workspace>)> {
    request.validate()?;

    let workspace = state
        .store
        .create_workspace(identity.user_id, &request.name)
        .await?;
    Ok((StatusCode::CREATED, Json(workspace)))
}

/// List the caller's workspace memberships
pub async fn list_workspaces(
    Extension(identity): Extension<AuthenticatedIdentity>,
) -> Json<Vec<WorkspaceMembership>> {
    let workspaces = identity
        .memberships
        .into_iter()
        .map(|m| WorkspaceMembership {
            workspace_id: m.workspace.id,
            name: m.workspace.name,
            role: m.role,
        })
        .collect();
    Json(workspaces)
}

/// List the authorized workspace's channels
pub async fn list_channels(
    State(state): State<crate::AppState>,
    Extension(workspace): Extension<AuthorizedWorkspace>,
) -> ApiResult<Json<Vec<Channel>>> {
    let channels = state.store.workspace_channels(workspace.0).await?;
    Ok(Json(channels))
}
