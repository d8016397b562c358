use crate::entities::{validate_email, validate_specialty, User};
use crate::errors::DomainError;
use crate::repositories::UserRepository;
use std::sync::Arc;

/// User Service - Contains business logic
/// This is the APPLICATION LAYER in clean architecture
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    /// Create a new user with business validation.
    ///
    /// The duplicate pre-checks give a friendly error ahead of the storage
    /// constraint; a race that slips past them still surfaces as
    /// `AlreadyExists` via the UNIQUE violation mapping in the repository.
    pub async fn create_user(
        &self,
        username: String,
        email: String,
        specialties: Vec<String>,
    ) -> Result<User, DomainError> {
        let user = User::new(username, email, specialties)?;

        // Check if username already exists (case-insensitive)
        if self
            .user_repository
            .find_by_username(&user.username)
            .await?
            .is_some()
        {
            return Err(DomainError::AlreadyExists(format!(
                "username '{}' is already taken",
                user.username
            )));
        }

        // Check if email already exists (case-insensitive)
        if self
            .user_repository
            .find_by_email(&user.email)
            .await?
            .is_some()
        {
            return Err(DomainError::AlreadyExists(format!(
                "email '{}' is already registered",
                user.email
            )));
        }

        self.user_repository.save(&user).await
    }

    /// Get user by ID. An absent row is `Ok(None)`, not an error.
    pub async fn get_user(&self, id: i32) -> Result<Option<User>, DomainError> {
        self.user_repository.find_by_id(id).await
    }

    /// Update a user's email.
    ///
    /// The duplicate check here is an exact match, unlike the case-insensitive
    /// check at creation. The asymmetry is inherited behavior, kept until the
    /// intended policy is confirmed.
    pub async fn update_email(&self, user: &mut User, new_email: &str) -> Result<(), DomainError> {
        let new_email = validate_email(new_email)?;
        let id = Self::persisted_id(user)?;

        if let Some(existing) = self.user_repository.find_by_email_exact(new_email).await? {
            if existing.id != user.id {
                return Err(DomainError::AlreadyExists(format!(
                    "email '{new_email}' is already registered"
                )));
            }
        }

        self.user_repository.update_email(id, new_email).await?;
        // In-memory state changes only after the write is confirmed.
        user.email = new_email.to_string();
        Ok(())
    }

    /// Add a specialty. Adding a value already present is a silent no-op with
    /// no persistence call.
    pub async fn add_specialty(&self, user: &mut User, value: &str) -> Result<(), DomainError> {
        let value = validate_specialty(value)?;
        if user.specialties.iter().any(|s| s == value) {
            return Ok(());
        }
        let id = Self::persisted_id(user)?;

        let mut next = user.specialties.clone();
        next.push(value.to_string());
        self.user_repository.update_specialties(id, &next).await?;
        user.specialties = next;
        Ok(())
    }

    /// Remove a specialty. Removing a value that is not present is a silent
    /// no-op with no persistence call.
    pub async fn remove_specialty(&self, user: &mut User, value: &str) -> Result<(), DomainError> {
        let value = validate_specialty(value)?;
        let Some(position) = user.specialties.iter().position(|s| s == value) else {
            return Ok(());
        };
        let id = Self::persisted_id(user)?;

        let mut next = user.specialties.clone();
        next.remove(position);
        self.user_repository.update_specialties(id, &next).await?;
        user.specialties = next;
        Ok(())
    }

    fn persisted_id(user: &User) -> Result<i32, DomainError> {
        user.id.ok_or_else(|| {
            DomainError::InvalidArgument("user has not been persisted".to_string())
        })
    }
}
