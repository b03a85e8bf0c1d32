//! Vault module: master credential, session and encrypted entry storage.
//!
//! This module provides:
//! - `Entry`, `EntryFields` and `MasterCredential` types (`entry`)
//! - SQLite record store (`db`)
//! - Locked/unlocked session state machine (`session`)
//! - High-level `VaultStore` for entry CRUD (`store`)

pub mod db;
pub mod entry;
pub mod session;
pub mod store;

// Re-export the most commonly used items.
pub use db::VaultDb;
pub use entry::{Entry, EntryFields, MasterCredential, DEFAULT_CATEGORY};
pub use session::AuthSession;
pub use store::VaultStore;
