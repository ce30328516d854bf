pub mod manager;
pub mod memory;
pub mod models;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryCredentialStore;
pub use models::{User, UserProfile};
pub use store::{CredentialStore, InsertOutcome, PgCredentialStore, StoreError};
