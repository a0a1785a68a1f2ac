/// Application routes configuration
use crate::handlers::{
    get_stats, health, list_centres, list_credits, list_department_centres, list_departments,
    refresh_department, AppState,
};
use axum::{routing::get, Router};

/// Build the application router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health))
        // Department endpoints
        .route("/departments", get(list_departments))
        .route("/departments/:code/centres", get(list_department_centres))
        .route("/departments/:code/refresh", get(refresh_department))
        // Cross-department views
        .route("/centres", get(list_centres))
        .route("/stats", get(get_stats))
        // Project
        .route("/credits", get(list_credits))
        .with_state(state)
}
