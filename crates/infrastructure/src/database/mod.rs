use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};

use domain::DomainError;

pub mod schema;
pub use schema::*;

pub type SqlitePool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

const CREATE_USERS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY,
    username TEXT UNIQUE,
    email TEXT UNIQUE,
    specialties TEXT
)";

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new SQLite database instance backed by a file
    pub fn new(database_path: &str) -> Self {
        let manager = ConnectionManager::<SqliteConnection>::new(database_path);
        let pool = r2d2::Pool::builder()
            .build(manager)
            .expect("Failed to create SQLite connection pool");
        Database { pool }
    }

    /// In-memory database for tests. The pool is capped at one connection:
    /// every `:memory:` connection is otherwise a separate database.
    pub fn in_memory() -> Self {
        let manager = ConnectionManager::<SqliteConnection>::new(":memory:");
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .build(manager)
            .expect("Failed to create in-memory SQLite pool");
        Database { pool }
    }

    /// Create the users table if it does not exist yet.
    pub fn create_tables(&self) -> Result<(), DomainError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| DomainError::StorageError(format!("failed to get connection: {e}")))?;
        diesel::sql_query(CREATE_USERS_TABLE)
            .execute(&mut conn)
            .map_err(|e| DomainError::StorageError(format!("failed to create tables: {e}")))?;
        Ok(())
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }
}
