use axum::{extract::State, routing::get, Json, Router};

use hearth_core::events::types::ContentEvent;
use hearth_core::site::social::{self, SocialLink, SocialLinkInput};

use crate::error::ApiResult;
use crate::state::AppState;

/// Social link routes backing the social form.
pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/social-links", get(list_links).put(replace_links))
}

async fn list_links(State(state): State<AppState>) -> ApiResult<Json<Vec<SocialLink>>> {
    Ok(Json(social::list(state.pool()).await?))
}

/// The form submits the full set every time; incomplete rows are dropped.
async fn replace_links(
    State(state): State<AppState>,
    Json(links): Json<Vec<SocialLinkInput>>,
) -> ApiResult<Json<Vec<SocialLink>>> {
    let saved = social::replace_all(state.pool(), links).await?;
    state.event_bus().publish(ContentEvent::SocialLinksUpdated);
    Ok(Json(saved))
}
