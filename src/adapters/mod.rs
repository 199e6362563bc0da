// Adapters layer: concrete implementations for external systems (files, database).

pub mod sqlite;
pub mod storage;

pub use sqlite::SqliteRepository;
pub use storage::LocalStorage;
