// Database schema for the team system
//
// Columns besides the key are nullable in the live schema; blank or NULL
// username/email values are treated as corrupted rows by the repository.
diesel::table! {
    users (user_id) {
        user_id -> Integer,
        username -> Nullable<Text>,   // unique, checked case-insensitively at creation
        email -> Nullable<Text>,      // unique, checked case-insensitively at creation
        specialties -> Nullable<Text>, // comma-joined list
    }
}
