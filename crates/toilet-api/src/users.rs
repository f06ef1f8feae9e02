use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use toilet_types::api::{LoginRequest, LoginResponse, RegisterRequest};

use crate::error::ServiceError;
use crate::extract::ApiJson;
use crate::state::{AppState, run_blocking};

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = run_blocking(&state, move |svc| svc.register(&req.username, &req.password)).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let token = run_blocking(&state, move |svc| svc.login(&req.username, &req.password)).await?;

    Ok(Json(LoginResponse { token }))
}
