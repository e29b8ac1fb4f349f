//! File listing, lookup, mutation, and deletion handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use stashbox_core::types::NodeId;
use stashbox_entity::node::NodePatch;

use crate::dto::request::{CreateNodeRequest, DeleteQuery, ListQuery, validate_request};
use crate::dto::response::RemovedResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::state::AppState;

/// GET /api/files?parent_id=...&filter=...
pub async fn list_children(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let filter = query.filter()?;
    let nodes = state
        .tree_service
        .list_children(&auth, query.parent_id, filter)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": nodes })))
}

/// GET /api/files/starred
pub async fn list_starred(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    let nodes = state.tree_service.list_starred(&auth).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": nodes })))
}

/// GET /api/files/trash
pub async fn list_trash(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    let nodes = state.tree_service.list_trash(&auth).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": nodes })))
}

/// DELETE /api/files/trash
pub async fn empty_trash(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    let removed = state.tree_service.empty_trash(&auth).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "data": RemovedResponse { removed }
    })))
}

/// POST /api/files
pub async fn create_node(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<CreateNodeRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    validate_request(&req)?;

    let node = state.tree_service.create(&auth, req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": node })),
    ))
}

/// GET /api/files/{id}
pub async fn get_node(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<NodeId>,
) -> ApiResult<Json<serde_json::Value>> {
    let node = state.tree_service.get_by_id(&auth, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": node })))
}

/// GET /api/files/{id}/breadcrumbs
pub async fn breadcrumbs(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<NodeId>,
) -> ApiResult<Json<serde_json::Value>> {
    let chain = state.tree_service.breadcrumbs(&auth, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": chain })))
}

/// PATCH /api/files/{id}
pub async fn update_node(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<NodeId>,
    ApiJson(patch): ApiJson<NodePatch>,
) -> ApiResult<Json<serde_json::Value>> {
    let node = state.tree_service.update(&auth, id, patch).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": node })))
}

/// PATCH /api/files/{id}/star
pub async fn toggle_star(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<NodeId>,
) -> ApiResult<Json<serde_json::Value>> {
    let node = state.tree_service.toggle_star(&auth, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": node })))
}

/// PATCH /api/files/{id}/trash
pub async fn toggle_trash(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<NodeId>,
) -> ApiResult<Json<serde_json::Value>> {
    let node = state.tree_service.toggle_trash(&auth, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": node })))
}

/// DELETE /api/files/{id}?mode=soft|hard
pub async fn delete_node(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<NodeId>,
    ApiQuery(query): ApiQuery<DeleteQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let mode = query.mode()?;
    let removed = state.tree_service.delete(&auth, id, mode).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "data": { "mode": mode, "removed": removed }
    })))
}
