use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

// Local part of alphanumerics plus ._%+-, domain of alphanumeric-hyphen labels
// separated by single dots, TLD of at least two letters. Consecutive dots in the
// domain cannot match because every label needs at least one character.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("valid email regex")
});

/// Core User entity - represents a registered team member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i32>, // None for new users before persistence
    pub username: String,
    pub email: String,
    pub specialties: Vec<String>,
}

impl User {
    /// Build a new, not-yet-persisted user after validating all fields.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        specialties: Vec<String>,
    ) -> Result<Self, DomainError> {
        Self::build(None, username.into(), email.into(), specialties)
    }

    /// Build a user that already has a storage-assigned id.
    pub fn with_id(
        id: i32,
        username: impl Into<String>,
        email: impl Into<String>,
        specialties: Vec<String>,
    ) -> Result<Self, DomainError> {
        Self::build(Some(id), username.into(), email.into(), specialties)
    }

    fn build(
        id: Option<i32>,
        username: String,
        email: String,
        specialties: Vec<String>,
    ) -> Result<Self, DomainError> {
        if username.trim().is_empty() {
            return Err(DomainError::InvalidArgument(
                "Username cannot be empty".to_string(),
            ));
        }

        let email = validate_email(&email)?.to_string();

        let specialties = specialties
            .into_iter()
            .map(|s| validate_specialty(&s).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id,
            username,
            email,
            specialties,
        })
    }
}

/// Validate an email address, returning the trimmed form on success.
pub fn validate_email(email: &str) -> Result<&str, DomainError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidArgument(
            "Email cannot be empty".to_string(),
        ));
    }
    if !EMAIL_RE.is_match(trimmed) {
        return Err(DomainError::InvalidArgument(
            "Invalid email format".to_string(),
        ));
    }
    Ok(trimmed)
}

/// Validate a specialty label, returning the trimmed form on success.
pub fn validate_specialty(value: &str) -> Result<&str, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidArgument(
            "Specialty cannot be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

/// Encode specialties into the single comma-joined TEXT column.
///
/// NUL bytes and newlines cannot be carried by the encoding and are rejected
/// before any storage call. Entries containing a literal comma are accepted
/// but split into separate entries on the next read; that lossy round-trip is
/// longstanding behavior the stored format has to keep.
pub fn encode_specialties(values: &[String]) -> Result<String, DomainError> {
    for value in values {
        if value.contains('\0') || value.contains('\n') {
            return Err(DomainError::InvalidArgument(
                "Specialty contains invalid characters".to_string(),
            ));
        }
    }
    Ok(values.join(","))
}

/// Decode the comma-joined TEXT column back into the ordered specialty list.
/// An empty stored value decodes to an empty list.
pub fn decode_specialties(stored: &str) -> Vec<String> {
    if stored.is_empty() {
        return Vec::new();
    }
    stored.split(',').map(str::to_string).collect()
}
