use axum::{
    Json, Router, middleware,
    routing::{delete, get, post},
};

use toilet_types::api::StatusResponse;

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{reviews, toilets, users};

/// All HTTP routes. Cross-cutting layers (CORS, tracing) are added by the
/// binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/user/create", post(users::register))
        .route("/login", post(users::login))
        .route("/user/login", post(users::login))
        .route("/toilets", get(toilets::list_toilets))
        .route(
            "/toilet/{toilet_id}/reviews",
            get(reviews::list_reviews_by_toilet),
        )
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/toilet/add", post(toilets::add_toilet))
        .route(
            "/toilet/delete",
            delete(toilets::delete_toilet).post(toilets::delete_toilet),
        )
        .route("/review/add", post(reviews::add_review))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

async fn health() -> Json<StatusResponse> {
    Json(StatusResponse::new("ok"))
}
