use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use hearth_core::content::model::{ContentItem, ContentKind, EditorFields, NewContent};
use hearth_core::content::validate;
use hearth_core::events::types::ContentEvent;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Admin ("mission control") content routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/content", get(list_content).post(create_draft))
        .route(
            "/v1/content/{id}",
            get(get_content).put(update_content).delete(delete_content),
        )
        .route("/v1/content/{id}/publish", post(publish_content))
        .route("/v1/content/{id}/unpublish", post(unpublish_content))
        .route("/v1/content/{id}/feature", post(feature_content))
}

#[derive(Debug, Deserialize)]
struct CreateDraftRequest {
    title: String,
    #[serde(default)]
    kind: ContentKind,
}

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(default)]
    kind: ContentKind,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateContentRequest {
    title: String,
    slug: String,
    body: String,
    #[serde(default)]
    excerpt: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    featured_image: Option<String>,
    #[serde(default)]
    seo_title: Option<String>,
    #[serde(default)]
    seo_description: Option<String>,
}

impl From<UpdateContentRequest> for EditorFields {
    fn from(req: UpdateContentRequest) -> Self {
        EditorFields {
            title: req.title,
            slug: req.slug,
            excerpt: req.excerpt,
            author: req.author,
            body: req.body,
            featured_image: req.featured_image,
            seo_title: req.seo_title,
            seo_description: req.seo_description,
        }
    }
}

/// Create an empty draft from a title. The slug is derived server-side.
async fn create_draft(
    State(state): State<AppState>,
    Json(req): Json<CreateDraftRequest>,
) -> ApiResult<(StatusCode, Json<ContentItem>)> {
    validate::validate_title(&req.title)?;
    let item = state
        .store()
        .insert(NewContent::draft(req.title, req.kind))
        .await?;
    state.event_bus().publish(ContentEvent::Created {
        id: item.id,
        kind: item.kind,
        slug: item.slug.clone(),
    });
    Ok((StatusCode::CREATED, Json(item)))
}

/// Full listing for one kind, drafts included.
async fn list_content(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<ContentItem>>> {
    let items = state.store().list_admin(params.kind).await?;
    Ok(Json(items))
}

async fn get_content(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ContentItem>> {
    let item = state
        .store()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("content item {id}")))?;
    Ok(Json(item))
}

/// Editor save: overwrites the payload fields, leaves the publish and
/// featured flags alone.
async fn update_content(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateContentRequest>,
) -> ApiResult<Json<ContentItem>> {
    let fields: EditorFields = req.into();
    validate::validate_editor_fields(&fields)?;
    let item = state.store().update_fields(id, fields).await?;
    state.event_bus().publish(ContentEvent::Updated {
        id: item.id,
        slug: item.slug.clone(),
    });
    Ok(Json(item))
}

async fn publish_content(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ContentItem>> {
    let item = state.featured().publish(id).await?;
    state.event_bus().publish(ContentEvent::Published {
        id: item.id,
        kind: item.kind,
    });
    Ok(Json(item))
}

async fn unpublish_content(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ContentItem>> {
    let item = state.featured().unpublish(id).await?;
    state.event_bus().publish(ContentEvent::Unpublished {
        id: item.id,
        kind: item.kind,
    });
    Ok(Json(item))
}

async fn feature_content(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ContentItem>> {
    let item = state.featured().set_featured(id).await?;
    state.event_bus().publish(ContentEvent::Featured {
        id: item.id,
        kind: item.kind,
    });
    Ok(Json(item))
}

async fn delete_content(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let item = state.featured().delete(id).await?;
    state.event_bus().publish(ContentEvent::Deleted {
        id: item.id,
        kind: item.kind,
    });
    Ok(StatusCode::NO_CONTENT)
}
