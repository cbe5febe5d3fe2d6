/*!
 * Singleton Routes
 * One shared record per kind (social links, studio config), read publicly and
 * upserted by the admin
 */
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};

use crate::{error::ApiError, resources::Kind, state::AppState};

/// GET /social-links, /studio-config
///
/// Before the first save this returns the kind's defaults (`{}` for social links).
pub async fn get_singleton<K: Kind>(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let kind = K::RESOURCE;
    let body = match state.resource(kind).singleton().await? {
        Some(document) => serde_json::to_value(document).map_err(|e| {
            ApiError::Internal(format!("failed to serialize {}: {e}", kind.collection))
        })?,
        None => Value::Object(
            kind.defaults
                .iter()
                .map(|(field, value)| (field.to_string(), json!(value)))
                .collect(),
        ),
    };
    Ok(Json(body))
}

/// PUT /social-links, /studio-config (behind the auth gate)
pub async fn update_singleton<K: Kind>(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let id = state.resource(K::RESOURCE).upsert_singleton(body).await?;

    Ok(Json(json!({
        "message": format!("{} updated successfully", K::RESOURCE.label),
        "id": id,
    })))
}
