use crate::Database;
use crate::models::{AdminRow, StudentRow, UserRow};
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Users --

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    // -- Admins --

    pub fn create_admin(&self, username: &str, password_hash: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO admins (username, password_hash) VALUES (?1, ?2)",
                (username, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_admin_by_username(&self, username: &str) -> Result<Option<AdminRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, username, password_hash FROM admins WHERE username = ?1")?;
            let row = stmt
                .query_row([username], |row| {
                    Ok(AdminRow {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password_hash: row.get(2)?,
                    })
                })
                .optional()?;
            Ok(row)
        })
    }

    // -- Students --

    /// Create the paired User + Student rows for a fresh registration.
    /// Runs in one transaction: both rows are committed or neither is.
    /// The student's name is the username.
    pub fn register_student(
        &self,
        username: &str,
        password_hash: &str,
        reg_no: &str,
        stream: &str,
        sub_stream: &str,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
                (username, password_hash),
            )?;
            tx.execute(
                "INSERT INTO students (reg_no, name, stream, sub_stream) VALUES (?1, ?2, ?3, ?4)",
                (reg_no, username, stream, sub_stream),
            )?;
            let student_id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(student_id)
        })
    }

    pub fn get_student(&self, id: i64) -> Result<Option<StudentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", SELECT_STUDENT))?;
            let row = stmt.query_row([id], student_from_row).optional()?;
            Ok(row)
        })
    }

    pub fn get_student_by_name(&self, name: &str) -> Result<Option<StudentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{} WHERE name = ?1", SELECT_STUDENT))?;
            let row = stmt.query_row([name], student_from_row).optional()?;
            Ok(row)
        })
    }

    pub fn get_student_by_reg_no(&self, reg_no: &str) -> Result<Option<StudentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{} WHERE reg_no = ?1", SELECT_STUDENT))?;
            let row = stmt.query_row([reg_no], student_from_row).optional()?;
            Ok(row)
        })
    }

    pub fn list_students(&self) -> Result<Vec<StudentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_STUDENT))?;
            let rows = stmt
                .query_map([], student_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Overwrite attendance, cgpa, and the full marks sequence.
    pub fn update_student_record(
        &self,
        id: i64,
        attendance: i64,
        cgpa: f64,
        marks_json: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE students SET attendance = ?1, cgpa = ?2, marks = ?3 WHERE id = ?4",
                rusqlite::params![attendance, cgpa, marks_json, id],
            )?;
            Ok(())
        })
    }

    pub fn set_profile_pic(&self, id: i64, filename: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE students SET profile_pic = ?1 WHERE id = ?2",
                (filename, id),
            )?;
            Ok(())
        })
    }
}

const SELECT_STUDENT: &str = "SELECT id, reg_no, name, stream, sub_stream, attendance, marks, \
                              cgpa, profile_pic FROM students";

fn student_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<StudentRow, rusqlite::Error> {
    Ok(StudentRow {
        id: row.get(0)?,
        reg_no: row.get(1)?,
        name: row.get(2)?,
        stream: row.get(3)?,
        sub_stream: row.get(4)?,
        attendance: row.get(5)?,
        marks: row.get(6)?,
        cgpa: row.get(7)?,
        profile_pic: row.get(8)?,
    })
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt =
        conn.prepare("SELECT id, username, password_hash FROM users WHERE username = ?1")?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;
    use anyhow::Result;

    fn row_counts(db: &Database) -> (i64, i64) {
        db.with_conn(|conn| {
            let users: i64 =
                conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            let students: i64 =
                conn.query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?;
            Ok((users, students))
        })
        .unwrap()
    }

    #[test]
    fn register_student_creates_paired_rows() -> Result<()> {
        let db = Database::open_in_memory()?;
        let id = db.register_student("alice", "hash", "2021CS001", "B.Tech(CSE)", "AI")?;

        assert_eq!(row_counts(&db), (1, 1));
        let student = db.get_student(id)?.expect("student row");
        assert_eq!(student.name, "alice");
        assert_eq!(student.reg_no, "2021CS001");
        assert_eq!(student.marks, "[]");
        assert_eq!(student.profile_pic, "default_profile_pic.png");
        Ok(())
    }

    #[test]
    fn duplicate_username_rolls_back_both_rows() -> Result<()> {
        let db = Database::open_in_memory()?;
        db.register_student("alice", "hash", "2021CS001", "B.Tech(CSE)", "NA")?;

        // Same username, fresh reg_no: the users insert fails, so the
        // students insert must not be committed either.
        let err = db.register_student("alice", "hash", "2021CS002", "B.Tech(CSE)", "NA");
        assert!(err.is_err());
        assert_eq!(row_counts(&db), (1, 1));
        Ok(())
    }

    #[test]
    fn duplicate_reg_no_rolls_back_both_rows() -> Result<()> {
        let db = Database::open_in_memory()?;
        db.register_student("alice", "hash", "2021CS001", "B.Tech(CSE)", "NA")?;

        let err = db.register_student("bob", "hash", "2021CS001", "B.Tech(CSE)", "NA");
        assert!(err.is_err());
        assert_eq!(row_counts(&db), (1, 1));
        Ok(())
    }

    #[test]
    fn update_student_record_overwrites_all_fields() -> Result<()> {
        let db = Database::open_in_memory()?;
        let id = db.register_student("alice", "hash", "2021CS001", "B.Tech(CSE)", "NA")?;

        let marks = r#"[{"code":"CS101","score":"80"}]"#;
        db.update_student_record(id, 92, 8.7, marks)?;

        let student = db.get_student(id)?.expect("student row");
        assert_eq!(student.attendance, 92);
        assert_eq!(student.cgpa, 8.7);
        assert_eq!(student.marks, marks);
        Ok(())
    }

    #[test]
    fn unknown_student_is_none() -> Result<()> {
        let db = Database::open_in_memory()?;
        assert!(db.get_student(42)?.is_none());
        Ok(())
    }

    #[test]
    fn admin_lookup_by_username() -> Result<()> {
        let db = Database::open_in_memory()?;
        db.create_admin("admin", "hash")?;
        let admin = db.get_admin_by_username("admin")?.expect("admin row");
        assert_eq!(admin.username, "admin");
        assert!(db.get_admin_by_username("nobody")?.is_none());
        Ok(())
    }
}
