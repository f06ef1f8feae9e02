mod database;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod store;

pub use database::Database;
pub use memory::MemoryStore;
pub use store::{CredentialStore, StoreError, StoreResult};
