use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use hearth_core::content::model::{ContentItem, ContentKind};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Hero cards plus this many recent items on the home payload.
const RECENT_LIMIT: i64 = 16;
const LIST_DEFAULT_LIMIT: i64 = 10;
const LIST_MAX_LIMIT: i64 = 100;

/// Public read routes, consumed by the rendering layer.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/site/home", get(home))
        .route("/v1/site/content", get(list_published))
        .route("/v1/site/read/{slug}", get(read_by_slug))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HomePayload {
    article: Option<ContentItem>,
    recipe: Option<ContentItem>,
    recent: Vec<ContentItem>,
}

/// Home page payload: one hero per kind (the featured item, falling back to
/// the latest published when nothing is featured), then recent items of
/// either kind excluding the heroes.
async fn home(State(state): State<AppState>) -> ApiResult<Json<HomePayload>> {
    let store = state.store();

    let article = match store.featured(ContentKind::Article).await? {
        Some(item) => Some(item),
        None => store.latest_published(ContentKind::Article).await?,
    };
    let recipe = match store.featured(ContentKind::Recipe).await? {
        Some(item) => Some(item),
        None => store.latest_published(ContentKind::Recipe).await?,
    };

    let mut exclude = Vec::with_capacity(2);
    if let Some(item) = &article {
        exclude.push(item.id);
    }
    if let Some(item) = &recipe {
        exclude.push(item.id);
    }
    let recent = store.recent_published(&exclude, RECENT_LIMIT).await?;

    Ok(Json(HomePayload {
        article,
        recipe,
        recent,
    }))
}

#[derive(Debug, Deserialize)]
struct PublishedListParams {
    #[serde(default)]
    kind: ContentKind,
    limit: Option<i64>,
}

/// Published items of one kind, the featured item first.
async fn list_published(
    State(state): State<AppState>,
    Query(params): Query<PublishedListParams>,
) -> ApiResult<Json<Vec<ContentItem>>> {
    let limit = params
        .limit
        .unwrap_or(LIST_DEFAULT_LIMIT)
        .clamp(1, LIST_MAX_LIMIT);
    let items = state.store().list_published(params.kind, limit).await?;
    Ok(Json(items))
}

/// Single item by slug. Drafts stay addressable here so editors can
/// preview them.
async fn read_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ContentItem>> {
    let item = state
        .store()
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no content at slug '{slug}'")))?;
    Ok(Json(item))
}
