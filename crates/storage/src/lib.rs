pub mod demo;
pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryRepository, ItemRepository, ResultRepository, Storage, StorageError};
