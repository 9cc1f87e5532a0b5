#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{IdentityRecord, IdentityStore, InMemoryRepository, Storage, StorageError};
