//! Route configuration.

use crate::handlers;
use crate::metrics::metrics_handler;
use crate::preconditions::tus_preconditions;
use crate::state::AppState;
use axum::Router;
use axum::middleware;
use axum::routing::{get, options};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route(
            "/files",
            options(handlers::options_info)
                .post(handlers::create_upload)
                // Methods without tus semantics on this target
                .fallback(handlers::method_not_supported),
        )
        .route(
            "/files/{upload_id}",
            options(handlers::options_info)
                .head(handlers::head_upload)
                .patch(handlers::patch_upload)
                .delete(handlers::delete_upload)
                .fallback(handlers::method_not_supported),
        )
        // /files targets that match no route; paths outside /files are
        // rejected earlier by the precondition middleware
        .fallback(handlers::unknown_target);

    // SECURITY: When enabled, this endpoint MUST be network-restricted
    // to authorized Prometheus scraper IPs only.
    if state.config.server.metrics_enabled {
        router = router.merge(Router::new().route("/metrics", get(metrics_handler)));
    }

    router
        .layer(middleware::from_fn(tus_preconditions))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
