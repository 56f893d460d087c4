use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tower_http::limit::RequestBodyLimitLayer;
use uuid::Uuid;

use hearth_core::events::types::ContentEvent;
use hearth_core::site::images;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Image library routes. Uploads are capped at the configured body size.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/v1/images", get(list_images).post(upload_image))
        .route("/v1/images/{id}", delete(delete_image))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
}

async fn list_images(State(state): State<AppState>) -> ApiResult<Json<Vec<images::Image>>> {
    Ok(Json(images::list(state.pool()).await?))
}

/// Accept a multipart upload, write it under the upload directory with a
/// unique name, and record it in the library.
async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<images::Image>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let original = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;
        if data.is_empty() {
            return Err(ApiError::BadRequest("uploaded file is empty".to_string()));
        }

        let filename = unique_filename(&original);
        let dir = state.config().upload_dir.clone();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ApiError::Internal(format!("failed to create upload dir: {e}")))?;
        tokio::fs::write(dir.join(&filename), &data)
            .await
            .map_err(|e| ApiError::Internal(format!("failed to write upload: {e}")))?;

        let url = format!("/uploads/{filename}");
        let image = images::insert(state.pool(), &url, &original).await?;
        state
            .event_bus()
            .publish(ContentEvent::ImageUploaded { id: image.id });
        return Ok((StatusCode::CREATED, Json(image)));
    }
    Err(ApiError::BadRequest(
        "multipart body is missing a 'file' field".to_string(),
    ))
}

/// Remove a library row and best-effort delete the file behind it; a file
/// that is already gone only logs a warning.
async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let image = images::delete(state.pool(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("image {id}")))?;

    if let Some(name) = image.url.rsplit('/').next() {
        let path = state.config().upload_dir.join(name);
        if let Err(err) = tokio::fs::remove_file(&path).await {
            tracing::warn!(image = image.id, error = %err, "failed to remove uploaded file");
        }
    }

    state
        .event_bus()
        .publish(ContentEvent::ImageDeleted { id });
    Ok(StatusCode::NO_CONTENT)
}

/// `Family Photo.JPG` becomes `family-photo-<uuid>.jpg`: lowercase,
/// filesystem- and URL-safe, and never colliding with an earlier upload.
fn unique_filename(original: &str) -> String {
    let path = std::path::Path::new(original);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("upload");
    let base: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => format!("{base}-{}.{}", Uuid::new_v4(), ext.to_ascii_lowercase()),
        None => format!("{base}-{}", Uuid::new_v4()),
    }
}
