use crate::database::{users, SqlitePool};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::sql_types::{Nullable, Text};
use domain::{decode_specialties, encode_specialties, DomainError, User, UserRepository};

diesel::define_sql_function! {
    fn lower(value: Nullable<Text>) -> Nullable<Text>;
}

// Database model - separate from domain entity. Nullable columns are part of
// the live schema; conversion treats blank or NULL identity fields as
// corrupted rows.
#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct UserRow {
    user_id: i32,
    username: Option<String>,
    email: Option<String>,
    specialties: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
struct NewUserRow {
    username: String,
    email: String,
    specialties: String,
}

fn row_to_user(row: UserRow) -> Result<User, DomainError> {
    let username = row.username.unwrap_or_default();
    let email = row.email.unwrap_or_default();
    if username.trim().is_empty() || email.trim().is_empty() {
        return Err(DomainError::DataIntegrity(format!(
            "user {} has a blank username or email",
            row.user_id
        )));
    }
    let specialties = decode_specialties(row.specialties.as_deref().unwrap_or(""));
    // A stored email that no longer passes validation is corrupted data, not
    // a valid user.
    User::with_id(row.user_id, username, email, specialties)
        .map_err(|e| DomainError::DataIntegrity(format!("user {}: {e}", row.user_id)))
}

fn map_diesel_error(op: &str, e: diesel::result::Error) -> DomainError {
    use diesel::result::{DatabaseErrorKind, Error};
    match e {
        Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DomainError::AlreadyExists(info.message().to_string())
        }
        Error::DatabaseError(_, info) => {
            let message = info.message();
            if message.contains("no such column") {
                let column = message.rsplit(':').next().unwrap_or(message).trim();
                DomainError::SchemaError(format!("{column} column not found"))
            } else {
                DomainError::StorageError(format!("{op}: {message}"))
            }
        }
        other => DomainError::StorageError(format!("{op}: {other}")),
    }
}

fn join_error(e: tokio::task::JoinError) -> DomainError {
    DomainError::StorageError(format!("blocking task failed: {e}"))
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn connection(
        &self,
    ) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>, DomainError> {
        self.pool
            .get()
            .map_err(|e| DomainError::StorageError(format!("failed to get connection: {e}")))
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DomainError> {
        let mut conn = self.connection()?;

        let row = tokio::task::spawn_blocking(move || {
            users::table
                .filter(users::user_id.eq(id))
                .select(UserRow::as_select())
                .first::<UserRow>(&mut conn)
                .optional()
        })
        .await
        .map_err(join_error)?
        .map_err(|e| map_diesel_error("failed to load user", e))?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let mut conn = self.connection()?;
        let needle = username.to_lowercase();

        let row = tokio::task::spawn_blocking(move || {
            users::table
                .filter(lower(users::username).eq(needle))
                .select(UserRow::as_select())
                .first::<UserRow>(&mut conn)
                .optional()
        })
        .await
        .map_err(join_error)?
        .map_err(|e| map_diesel_error("failed to look up username", e))?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let mut conn = self.connection()?;
        let needle = email.to_lowercase();

        let row = tokio::task::spawn_blocking(move || {
            users::table
                .filter(lower(users::email).eq(needle))
                .select(UserRow::as_select())
                .first::<UserRow>(&mut conn)
                .optional()
        })
        .await
        .map_err(join_error)?
        .map_err(|e| map_diesel_error("failed to look up email", e))?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email_exact(&self, email: &str) -> Result<Option<User>, DomainError> {
        let mut conn = self.connection()?;
        let needle = email.to_string();

        let row = tokio::task::spawn_blocking(move || {
            users::table
                .filter(users::email.eq(needle))
                .select(UserRow::as_select())
                .first::<UserRow>(&mut conn)
                .optional()
        })
        .await
        .map_err(join_error)?
        .map_err(|e| map_diesel_error("failed to look up email", e))?;

        row.map(row_to_user).transpose()
    }

    async fn save(&self, user: &User) -> Result<User, DomainError> {
        // Encoding is validated before any storage call.
        let encoded = encode_specialties(&user.specialties)?;
        let mut conn = self.connection()?;
        let new_row = NewUserRow {
            username: user.username.clone(),
            email: user.email.clone(),
            specialties: encoded,
        };

        let row = tokio::task::spawn_blocking(move || {
            conn.transaction::<UserRow, diesel::result::Error, _>(|conn| {
                diesel::insert_into(users::table)
                    .values(&new_row)
                    .execute(conn)?;

                // SQLite doesn't support RETURNING here, so fetch the row
                // inserted by this transaction.
                users::table
                    .order(users::user_id.desc())
                    .select(UserRow::as_select())
                    .first::<UserRow>(conn)
            })
        })
        .await
        .map_err(join_error)?
        .map_err(|e| map_diesel_error("failed to create user", e))?;

        row_to_user(row)
    }

    async fn update_email(&self, id: i32, email: &str) -> Result<(), DomainError> {
        let mut conn = self.connection()?;
        let email = email.to_string();

        let affected = tokio::task::spawn_blocking(move || {
            diesel::update(users::table.filter(users::user_id.eq(id)))
                .set(users::email.eq(email))
                .execute(&mut conn)
        })
        .await
        .map_err(join_error)?
        .map_err(|e| map_diesel_error("failed to update email", e))?;

        if affected == 0 {
            return Err(DomainError::Gone(format!("user {id} no longer exists")));
        }
        Ok(())
    }

    async fn update_specialties(
        &self,
        id: i32,
        specialties: &[String],
    ) -> Result<(), DomainError> {
        let encoded = encode_specialties(specialties)?;
        let mut conn = self.connection()?;

        let affected = tokio::task::spawn_blocking(move || {
            diesel::update(users::table.filter(users::user_id.eq(id)))
                .set(users::specialties.eq(encoded))
                .execute(&mut conn)
        })
        .await
        .map_err(join_error)?
        .map_err(|e| map_diesel_error("failed to update specialties", e))?;

        // The row was deleted out-of-band since it was loaded.
        if affected == 0 {
            return Err(DomainError::Gone(format!("user {id} no longer exists")));
        }
        Ok(())
    }
}
