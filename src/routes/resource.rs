/*!
 * Resource Routes
 * One generic handler set, instantiated per resource kind
 */
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    db::Document,
    error::ApiError,
    resources::{Audience, Kind},
    state::AppState,
};

/// GET /<kind> (approved only for moderated kinds)
pub async fn list_public<K: Kind>(
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(state.resource(K::RESOURCE).list(Audience::Public).await?))
}

/// GET /<kind>/all
pub async fn list_all<K: Kind>(
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(state.resource(K::RESOURCE).list(Audience::Admin).await?))
}

/// GET /<kind>/{id}
pub async fn get_one<K: Kind>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    Ok(Json(state.resource(K::RESOURCE).get(&id).await?))
}

/// POST /<kind>
pub async fn create<K: Kind>(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(body) = body?;
    let kind = K::RESOURCE;
    let id = state.resource(kind).create(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("{} created successfully", kind.label),
            "id": id,
        })),
    ))
}

/// PUT /<kind>/{id}
pub async fn update<K: Kind>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(patch) = body?;
    let kind = K::RESOURCE;
    state.resource(kind).update(&id, patch).await?;

    Ok(Json(json!({
        "message": format!("{} updated successfully", kind.label),
    })))
}

/// DELETE /<kind>/{id}
pub async fn delete<K: Kind>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.resource(K::RESOURCE).delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /<kind>/{id}/approve
pub async fn approve<K: Kind>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let kind = K::RESOURCE;
    state.resource(kind).approve(&id).await?;

    Ok(Json(json!({
        "message": format!("{} approved successfully", kind.label),
    })))
}
