//! Folder creation and tree handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::request::{CreateFolderRequest, TreeQuery, validate_request};
use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiQuery, AuthUser};
use crate::state::AppState;

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<CreateFolderRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    validate_request(&req)?;

    let folder = state
        .tree_service
        .create_folder(&auth, &req.name, req.parent_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": folder })),
    ))
}

/// GET /api/folders/tree?root=...
pub async fn get_tree(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<TreeQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let tree = state.tree_service.tree(&auth, query.root).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": tree })))
}
