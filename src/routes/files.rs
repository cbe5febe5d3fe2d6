/*!
 * File Routes
 * Multipart upload that records download metadata for a file
 */
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::{db::Fields, error::ApiError, resources::kinds::FILES, state::AppState};

const FILE_FIELD: &str = "file";
const ALLOWED_EXTENSIONS: &[&str] = &["mp3", "wav", "zip", "rar", "pdf", "doc", "docx"];

lazy_static::lazy_static! {
    static ref UNSAFE_CHARS: regex::Regex = regex::Regex::new(r"[^A-Za-z0-9._-]")
        .expect("static regex is valid");
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub id: String,
    pub filename: String,
    pub download_url: String,
}

/// Reduces a client-supplied name to a flat, shell-safe file name.
/// Returns `None` when nothing usable is left.
fn sanitize_filename(raw: &str) -> Option<String> {
    // Browsers on Windows may send the full client path.
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let spaced: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    let cleaned = UNSAFE_CHARS.replace_all(&spaced, "");
    let cleaned = cleaned.trim_start_matches('.');
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::PayloadTooLarge;
    }
    tracing::error!("Multipart error: {}", err);
    ApiError::Validation("Invalid multipart data".to_string())
}

/// POST /files (behind the auth gate)
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut fields = Fields::new();
    let mut upload: Option<(String, usize)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == FILE_FIELD {
            let original_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            upload = Some((original_name, bytes.len()));
        } else {
            let text = field.text().await.map_err(|e| {
                tracing::error!("Failed to read form field {}: {}", name, e);
                ApiError::Validation(format!("Invalid form field: {name}"))
            })?;
            fields.insert(name, Value::String(text));
        }
    }

    let Some((original_name, size)) = upload else {
        return Err(ApiError::Validation("No file part in the request".to_string()));
    };
    if original_name.is_empty() {
        return Err(ApiError::Validation("No file selected".to_string()));
    }

    let filename = sanitize_filename(&original_name)
        .filter(|name| allowed_file(name))
        .ok_or_else(|| {
            ApiError::Validation(format!(
                "File type not allowed. Allowed: {}",
                ALLOWED_EXTENSIONS.join(", ")
            ))
        })?;

    if size == 0 {
        return Err(ApiError::Validation("Empty file".to_string()));
    }

    let download_url = format!("{}/{}", state.download_base_url, filename);

    let mut assigned = Fields::new();
    assigned.insert("filename".into(), Value::String(filename.clone()));
    assigned.insert("download_url".into(), Value::String(download_url.clone()));

    let id = state
        .resource(&FILES)
        .create_with_assigned(fields, assigned)
        .await?;

    tracing::info!("File registered: {} ({} bytes)", filename, size);

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "File uploaded successfully".to_string(),
            id: id.to_string(),
            filename,
            download_url,
        }),
    ))
}
