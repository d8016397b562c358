use crate::entities::User;
use crate::errors::DomainError;
use async_trait::async_trait;

/// Repository trait - defines what we need from persistence layer
/// This is a PORT in hexagonal architecture
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch by id. Absent rows are `Ok(None)`; rows with blank or malformed
    /// stored username/email surface as `DomainError::DataIntegrity`.
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DomainError>;

    /// Case-insensitive username lookup, used by the creation uniqueness check.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Case-insensitive email lookup, used by the creation uniqueness check.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Exact-match (case-sensitive) email lookup, used by the email-update
    /// check. The creation check is case-insensitive; this one is not.
    async fn find_by_email_exact(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Insert a new user and return it with the storage-assigned id.
    async fn save(&self, user: &User) -> Result<User, DomainError>;

    /// Persist a new email for an existing row.
    async fn update_email(&self, id: i32, email: &str) -> Result<(), DomainError>;

    /// Re-persist the whole specialties column for an existing row.
    async fn update_specialties(&self, id: i32, specialties: &[String])
        -> Result<(), DomainError>;
}
