use std::sync::Arc;

use axum::{extract::State, response::Html};

use crate::components;
use crate::AppState;

pub async fn map_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(components::render_map(state.store.len(), state.relay.is_some()))
}
