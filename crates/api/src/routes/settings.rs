use axum::{extract::State, routing::get, Json, Router};

use hearth_core::events::types::ContentEvent;
use hearth_core::site::settings::{self, SiteSettings, SiteSettingsInput};

use crate::error::ApiResult;
use crate::state::AppState;

/// Site branding routes backing the style form.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/v1/site-settings",
        get(get_settings).put(update_settings),
    )
}

/// `null` until the first save.
async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<Option<SiteSettings>>> {
    Ok(Json(settings::fetch(state.pool()).await?))
}

async fn update_settings(
    State(state): State<AppState>,
    Json(input): Json<SiteSettingsInput>,
) -> ApiResult<Json<SiteSettings>> {
    let saved = settings::upsert(state.pool(), input).await?;
    state.event_bus().publish(ContentEvent::SettingsUpdated);
    Ok(Json(saved))
}
