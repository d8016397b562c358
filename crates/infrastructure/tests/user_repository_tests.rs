use diesel::prelude::*;
use diesel::sql_types::Integer;
use domain::{DomainError, User, UserRepository};
use infrastructure::{Database, SqliteUserRepository};

fn setup() -> (Database, SqliteUserRepository) {
    let database = Database::in_memory();
    database.create_tables().expect("schema created");
    let repository = SqliteUserRepository::new(database.get_pool().clone());
    (database, repository)
}

fn user(username: &str, email: &str, specialties: &[&str]) -> User {
    User::new(
        username,
        email,
        specialties.iter().map(|s| s.to_string()).collect(),
    )
    .expect("valid user")
}

fn run_sql(database: &Database, sql: &str) {
    let mut conn = database.get_pool().get().expect("connection");
    diesel::sql_query(sql).execute(&mut conn).expect("raw sql");
}

#[tokio::test]
async fn save_assigns_id_and_round_trips() {
    let (_db, repo) = setup();

    let saved = repo
        .save(&user("testuser", "test@example.com", &["python", "django"]))
        .await
        .expect("saved");
    let id = saved.id.expect("assigned id");

    let fetched = repo.find_by_id(id).await.expect("query ok").expect("found");
    assert_eq!(fetched.username, "testuser");
    assert_eq!(fetched.email, "test@example.com");
    assert_eq!(fetched.specialties, vec!["python", "django"]);
}

#[tokio::test]
async fn find_by_id_missing_row_is_none() {
    let (_db, repo) = setup();
    let fetched = repo.find_by_id(9999).await.expect("query ok");
    assert!(fetched.is_none());
}

#[tokio::test]
async fn empty_specialties_column_decodes_to_empty_list() {
    let (_db, repo) = setup();
    let saved = repo
        .save(&user("testuser", "test@example.com", &[]))
        .await
        .expect("saved");
    let fetched = repo
        .find_by_id(saved.id.unwrap())
        .await
        .expect("query ok")
        .expect("found");
    assert!(fetched.specialties.is_empty());
}

#[tokio::test]
async fn unique_constraint_violation_maps_to_already_exists() {
    let (_db, repo) = setup();
    repo.save(&user("testuser", "a@example.com", &[]))
        .await
        .expect("saved");

    // Straight to the repository, as a racing caller that passed the
    // service-level pre-check would arrive.
    let err = repo
        .save(&user("testuser", "b@example.com", &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AlreadyExists(_)), "got {err:?}");
}

#[tokio::test]
async fn username_lookup_is_case_insensitive() {
    let (_db, repo) = setup();
    repo.save(&user("TestUser", "a@example.com", &[]))
        .await
        .expect("saved");

    let found = repo.find_by_username("testuser").await.expect("query ok");
    assert!(found.is_some());
    let found = repo.find_by_username("TESTUSER").await.expect("query ok");
    assert!(found.is_some());
}

#[tokio::test]
async fn email_lookup_case_sensitivity_differs_by_method() {
    let (_db, repo) = setup();
    repo.save(&user("testuser", "Test@Example.com", &[]))
        .await
        .expect("saved");

    // Creation-path lookup folds case; update-path lookup does not.
    assert!(repo
        .find_by_email("test@example.com")
        .await
        .expect("query ok")
        .is_some());
    assert!(repo
        .find_by_email_exact("test@example.com")
        .await
        .expect("query ok")
        .is_none());
    assert!(repo
        .find_by_email_exact("Test@Example.com")
        .await
        .expect("query ok")
        .is_some());
}

#[tokio::test]
async fn update_email_persists_new_value() {
    let (_db, repo) = setup();
    let saved = repo
        .save(&user("testuser", "test@example.com", &[]))
        .await
        .expect("saved");
    let id = saved.id.unwrap();

    repo.update_email(id, "newemail@example.com")
        .await
        .expect("updated");
    let fetched = repo.find_by_id(id).await.expect("query ok").expect("found");
    assert_eq!(fetched.email, "newemail@example.com");
}

#[tokio::test]
async fn updates_on_vanished_row_report_gone() {
    let (db, repo) = setup();
    let saved = repo
        .save(&user("testuser", "test@example.com", &["python"]))
        .await
        .expect("saved");
    let id = saved.id.unwrap();

    run_sql(&db, &format!("DELETE FROM users WHERE user_id = {id}"));

    let err = repo
        .update_specialties(id, &["python".to_string(), "flask".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Gone(_)), "got {err:?}");

    let err = repo.update_email(id, "other@example.com").await.unwrap_err();
    assert!(matches!(err, DomainError::Gone(_)), "got {err:?}");
}

#[tokio::test]
async fn missing_specialties_column_reports_schema_error() {
    let (db, repo) = setup();
    let saved = repo
        .save(&user("testuser", "test@example.com", &["python"]))
        .await
        .expect("saved");
    let id = saved.id.unwrap();

    // Recreate the table without the specialties column.
    run_sql(&db, "DROP TABLE users");
    run_sql(
        &db,
        "CREATE TABLE users (user_id INTEGER PRIMARY KEY, username TEXT UNIQUE, email TEXT UNIQUE)",
    );
    run_sql(
        &db,
        &format!(
            "INSERT INTO users (user_id, username, email) VALUES ({id}, 'testuser', 'test@example.com')"
        ),
    );

    let err = repo
        .update_specialties(id, &["python".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::SchemaError(_)), "got {err:?}");
    assert_eq!(
        err.to_string(),
        "Database schema error: specialties column not found"
    );
}

#[tokio::test]
async fn blank_stored_email_reports_data_integrity() {
    let (db, repo) = setup();
    let saved = repo
        .save(&user("testuser", "test@example.com", &["python"]))
        .await
        .expect("saved");
    let id = saved.id.unwrap();

    {
        let mut conn = db.get_pool().get().expect("connection");
        diesel::sql_query("UPDATE users SET email = NULL WHERE user_id = ?")
            .bind::<Integer, _>(id)
            .execute(&mut conn)
            .expect("corrupted row");
    }

    let err = repo.find_by_id(id).await.unwrap_err();
    assert!(matches!(err, DomainError::DataIntegrity(_)), "got {err:?}");
    assert!(err.to_string().contains("Invalid user data format"));
}

#[tokio::test]
async fn malformed_stored_email_reports_data_integrity() {
    let (db, repo) = setup();
    let saved = repo
        .save(&user("testuser", "test@example.com", &[]))
        .await
        .expect("saved");
    let id = saved.id.unwrap();

    run_sql(
        &db,
        &format!("UPDATE users SET email = 'not-an-email' WHERE user_id = {id}"),
    );

    let err = repo.find_by_id(id).await.unwrap_err();
    assert!(matches!(err, DomainError::DataIntegrity(_)), "got {err:?}");
}

#[tokio::test]
async fn nul_or_newline_specialty_is_rejected_before_storage() {
    let (_db, repo) = setup();
    let saved = repo
        .save(&user("testuser", "test@example.com", &["python"]))
        .await
        .expect("saved");
    let id = saved.id.unwrap();

    let err = repo
        .update_specialties(id, &["bad\nvalue".to_string()])
        .await
        .unwrap_err();
    assert!(
        matches!(err, DomainError::InvalidArgument(ref m) if m.contains("invalid characters")),
        "got {err:?}"
    );

    // The stored value is untouched.
    let fetched = repo.find_by_id(id).await.expect("query ok").expect("found");
    assert_eq!(fetched.specialties, vec!["python"]);
}
