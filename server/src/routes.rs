// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::handlers;
use axum::{
    routing::{get, patch, post},
    Router,
};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

/// Creates and configures the application router.
pub fn create_router(pool: SqlitePool) -> Router {
    Router::new()
        .route(
            "/api/goals",
            get(handlers::list_goals).post(handlers::create_goal),
        )
        .route("/api/goals/{id}", get(handlers::get_goal))
        .route("/api/goals/{id}/tasks", get(handlers::list_goal_tasks))
        .route("/api/goals/{id}/advance", post(handlers::advance_goal))
        .route("/api/goals/{id}/dashboard", get(handlers::goal_dashboard))
        // Dashboard of the first goal, or the empty-state message
        .route("/api/dashboard", get(handlers::default_dashboard))
        .route("/api/tasks/{id}", patch(handlers::update_task))
        .layer(TraceLayer::new_for_http())
        // Adds the database pool to the application state
        .with_state(pool)
}
