use crate::{
    models::{CreateOfferRequest, Offer, UpdateOfferRequest},
    utils::{ApiError, ApiJson, ApiResult},
    workspace::AuthorizedWorkspace,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

// Every query below is scoped by the workspace id the authorization guard
// resolved, never by one taken from the payload.

/// List the authorized workspace's offers
pub async fn list_offers(
    State(state): State<crate::AppState>,
    Extension(workspace): Extension<AuthorizedWorkspace>,
) -> ApiResult<Json<Vec<Offer>>> {
    let offers = state.store.list_offers(workspace.0).await?;
    Ok(Json(offers))
}

/// Create an offer in the authorized workspace
pub async fn create_offer(
    State(state): State<crate::AppState>,
    Extension(workspace): Extension<AuthorizedWorkspace>,
    ApiJson(request): ApiJson<CreateOfferRequest>,
) -> ApiResult<(StatusCode, Json<Offer>)> {
    request.validate()?;

    let offer = state.store.create_offer(workspace.0, request).await?;
    Ok((StatusCode::CREATED, Json(offer)))
}

/// Fetch a single offer by id within the authorized workspace
pub async fn get_offer(
    State(state): State<crate::AppState>,
    Extension(workspace): Extension<AuthorizedWorkspace>,
    Path(offer_id): Path<Uuid>,
) -> ApiResult<Json<Offer>> {
    let offer = state
        .store
        .offer(workspace.0, offer_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Offer not found".to_string()))?;
    Ok(Json(offer))
}

/// Apply partial updates to an offer
pub async fn update_offer(
    State(state): State<crate::AppState>,
    Extension(workspace): Extension<AuthorizedWorkspace>,
    Path(offer_id): Path<Uuid>,
    ApiJson(request): ApiJson<UpdateOfferRequest>,
) -> ApiResult<Json<Offer>> {
    request.validate()?;

    let offer = state
        .store
        .update_offer(workspace.0, offer_id, request)
        .await?
        .ok_or_else(|| ApiError::NotFound("Offer not found".to_string()))?;
    Ok(Json(offer))
}

/// Delete an offer
pub async fn delete_offer(
    State(state): State<crate::AppState>,
    Extension(workspace): Extension<AuthorizedWorkspace>,
    Path(offer_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = state.store.delete_offer(workspace.0, offer_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Offer not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
