use domain::{DomainError, UserRepository, UserService};
use infrastructure::{Database, SqliteUserRepository};
use std::sync::Arc;

/// Team Application - wires the storage layer into the domain services
pub struct TeamApp {
    pub user_service: UserService,
}

impl TeamApp {
    /// Open (or create) the single-file database and wire up the services.
    pub fn new(database_path: &str) -> Result<Self, DomainError> {
        Self::with_database(Database::new(database_path))
    }

    /// Fully in-memory instance, used by tests.
    pub fn in_memory() -> Result<Self, DomainError> {
        Self::with_database(Database::in_memory())
    }

    fn with_database(database: Database) -> Result<Self, DomainError> {
        database.create_tables()?;
        let pool = database.get_pool().clone();

        let user_repository: Arc<dyn UserRepository> =
            Arc::new(SqliteUserRepository::new(pool));
        let user_service = UserService::new(user_repository);

        Ok(Self { user_service })
    }
}
