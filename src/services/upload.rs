//! Image upload gateway.
//!
//! Accepts multipart content, stores it under a per-user collision-free key,
//! and returns a time-limited signed retrieval URL. No resizing or content
//! inspection; the caller-declared content type is stored as-is.

use axum::Json;
use axum::extract::{Multipart, State};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::jwt::AuthInfo;
use crate::startup::AppState;

/// Fallback extension when the declared filename has none.
const DEFAULT_EXTENSION: &str = "bin";

/// Multipart field carrying the image bytes.
const FILE_FIELD: &str = "file";

/// Derive the storage key: `{userId}/{uuid}.{ext}`.
///
/// The random component guarantees no collision within or across users
/// without a lookup; the user prefix scopes the layout by owner.
fn object_key(user_id: Uuid, filename: &str) -> String {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(char::is_alphanumeric))
        .unwrap_or(DEFAULT_EXTENSION);

    format!("{user_id}/{}.{}", Uuid::new_v4(), extension.to_lowercase())
}

/// `POST /upload-image` — store the `file` part and return its signed URL.
pub async fn upload_image(
    State(state): State<AppState>,
    auth: AuthInfo,
    mut multipart: Multipart,
) -> AppResult<Json<Value>> {
    let storage = state
        .storage
        .as_ref()
        .ok_or_else(|| AppError::Configuration("Object storage is not configured".to_string()))?;

    let mut upload: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidArgument(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidArgument(format!("Failed to read upload: {e}")))?;

        upload = Some((filename, content_type, content.to_vec()));
        break;
    }

    let (filename, content_type, content) =
        upload.ok_or_else(|| AppError::InvalidArgument("Missing 'file' field".to_string()))?;

    if content.is_empty() {
        return Err(AppError::InvalidArgument("Empty upload".to_string()));
    }
    if content.len() > state.max_upload_bytes {
        return Err(AppError::InvalidArgument(format!(
            "Upload exceeds {} bytes",
            state.max_upload_bytes
        )));
    }

    let key = object_key(auth.user_id, &filename);
    storage.put_object(&key, content, &content_type).await?;

    let url = storage.presign_get(&key, state.signed_url_ttl_secs).await?;
    tracing::info!(user_id = %auth.user_id, key = %key, "Image uploaded");

    Ok(Json(json!({ "url": url, "path": key })))
}
