use std::sync::Arc;

use tracing::error;

use crate::auth::Authenticator;
use crate::error::{Result, ServiceError};
use crate::service::ToiletService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub service: ToiletService,
    pub authenticator: Arc<Authenticator>,
}

impl AppStateInner {
    pub fn new(service: ToiletService, authenticator: Arc<Authenticator>) -> AppState {
        Arc::new(Self {
            service,
            authenticator,
        })
    }
}

/// Runs a service call off the async runtime; store I/O and password hashing
/// both block.
pub async fn run_blocking<F, T>(state: &AppState, f: F) -> Result<T>
where
    F: FnOnce(&ToiletService) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state.service))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ServiceError::Internal(e.into())
        })?
}
