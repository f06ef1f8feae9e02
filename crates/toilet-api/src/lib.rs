pub mod auth;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod reviews;
pub mod routes;
pub mod service;
pub mod state;
pub mod toilets;
pub mod users;

pub use auth::{Authenticator, HashCost, Identity};
pub use error::ServiceError;
pub use routes::router;
pub use service::ToiletService;
pub use state::{AppState, AppStateInner};
