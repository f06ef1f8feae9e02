use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use toilet_types::api::{AddReviewRequest, StatusResponse};

use crate::auth::Identity;
use crate::error::ServiceError;
use crate::extract::ApiJson;
use crate::state::{AppState, run_blocking};

pub async fn add_review(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiJson(req): ApiJson<AddReviewRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    run_blocking(&state, move |svc| svc.add_review(identity, &req)).await?;
    Ok(Json(StatusResponse::new("ok")))
}

pub async fn list_reviews_by_toilet(
    State(state): State<AppState>,
    Path(toilet_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let toilet_id: i64 = toilet_id
        .parse()
        .map_err(|_| ServiceError::validation("invalid toilet id"))?;

    let reviews = run_blocking(&state, move |svc| svc.list_reviews_by_toilet(toilet_id)).await?;
    Ok(Json(reviews))
}
