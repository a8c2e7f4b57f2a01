use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY,
            username        TEXT NOT NULL UNIQUE,
            password_hash   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS admins (
            id              INTEGER PRIMARY KEY,
            username        TEXT NOT NULL UNIQUE,
            password_hash   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS students (
            id              INTEGER PRIMARY KEY,
            reg_no          TEXT NOT NULL UNIQUE,
            name            TEXT NOT NULL,
            stream          TEXT NOT NULL DEFAULT 'B.Tech(CSE)',
            sub_stream      TEXT NOT NULL DEFAULT 'NA',
            attendance      INTEGER NOT NULL DEFAULT 0,
            marks           TEXT NOT NULL DEFAULT '[]',
            cgpa            REAL NOT NULL DEFAULT 0.0,
            profile_pic     TEXT NOT NULL DEFAULT 'default_profile_pic.png'
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
