use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::health_check;
use crate::handlers::ticket_assignments::{
    create_assignment, delete_assignment, get_assignment, list_assignments,
    list_assignments_for_event, update_assignment,
};
use crate::state::AppState;

fn ticket_assignment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_assignments))
        .route("/create", post(create_assignment))
        .route("/event/:event_id", get(list_assignments_for_event))
        .route(
            "/:id",
            get(get_assignment)
                .put(update_assignment)
                .delete(delete_assignment),
        )
}

pub fn create_routes(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1/event-ticket-assignments", ticket_assignment_routes())
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(config.production))
        .layer(create_cors_layer(config.cors_allowed_origins.as_deref()))
        .with_state(state)
}

#[cfg(test)]
mod tests;
