use axum::{Extension, Json, extract::State, response::IntoResponse};

use toilet_types::api::{AddToiletRequest, AddToiletResponse, DeleteToiletRequest, StatusResponse};

use crate::auth::Identity;
use crate::error::ServiceError;
use crate::extract::ApiJson;
use crate::state::{AppState, run_blocking};

pub async fn list_toilets(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let toilets = run_blocking(&state, |svc| svc.list_toilets()).await?;
    Ok(Json(toilets))
}

pub async fn add_toilet(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiJson(req): ApiJson<AddToiletRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let toilet = run_blocking(&state, move |svc| svc.add_toilet(identity, &req)).await?;
    Ok(Json(AddToiletResponse::from(toilet)))
}

pub async fn delete_toilet(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiJson(req): ApiJson<DeleteToiletRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    run_blocking(&state, move |svc| svc.delete_toilet(identity, req.id)).await?;
    Ok(Json(StatusResponse::new("deleted")))
}
