/// Database row types — these map directly to SQLite rows.
/// Distinct from registrar-types models to keep the DB layer independent.

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

pub struct AdminRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

pub struct StudentRow {
    pub id: i64,
    pub reg_no: String,
    pub name: String,
    pub stream: String,
    pub sub_stream: String,
    pub attendance: i64,
    /// JSON array of `{code, score}` objects, at most 6 entries.
    pub marks: String,
    pub cgpa: f64,
    pub profile_pic: String,
}
