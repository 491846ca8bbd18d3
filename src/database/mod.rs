pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod schema;
pub mod storage;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStorage;
pub use postgres::PostgresStorage;
pub use schema::init_schema;
pub use storage::{Storage, StorageError};
