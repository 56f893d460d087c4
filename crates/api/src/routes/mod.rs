pub mod content;
pub mod health;
pub mod images;
pub mod published;
pub mod settings;
pub mod social;

use axum::Router;

use crate::state::AppState;

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config().max_upload_bytes;
    Router::new()
        .merge(health::routes())
        .merge(content::routes())
        .merge(published::routes())
        .merge(images::routes(max_upload_bytes))
        .merge(settings::routes())
        .merge(social::routes())
        .with_state(state)
}
