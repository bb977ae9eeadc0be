use axum::Router;
use tableside_db::DbPool;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{customer, health, staff};

pub fn router(state: AppState, db_pool: DbPool) -> Router {
    let llm_online = state.agent.is_online();

    Router::new()
        .merge(customer::routes())
        .merge(staff::routes())
        .with_state(state)
        .merge(health::router(db_pool, llm_online))
        .layer(TraceLayer::new_for_http())
}
