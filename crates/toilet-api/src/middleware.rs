use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};

use crate::error::ServiceError;
use crate::state::AppState;

/// Validate the bearer token and attach the caller's `Identity` to the
/// request. Handlers behind this layer read it with `Extension<Identity>`.
pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut req: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|_| ServiceError::Unauthorized)?;

    let identity = state.authenticator.validate_token(bearer.token())?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
