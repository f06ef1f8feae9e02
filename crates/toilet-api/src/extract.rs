use axum::extract::FromRequest;

use crate::error::ServiceError;

/// `axum::Json` whose rejections come back in the service error envelope
/// (400, JSON body) instead of axum's plain-text defaults.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ServiceError))]
pub struct ApiJson<T>(pub T);
