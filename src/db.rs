use anyhow::Context;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

pub const DB_FILE_NAME: &str = "students.sqlite3";

pub fn db_path(workspace: &Path) -> PathBuf {
    workspace.join(DB_FILE_NAME)
}

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace).with_context(|| {
        format!(
            "failed to create workspace {}",
            workspace.to_string_lossy()
        )
    })?;
    let path = db_path(workspace);
    let conn = Connection::open(&path)
        .with_context(|| format!("failed to open database {}", path.to_string_lossy()))?;

    // reg_number is not UNIQUE: duplicate registrations are stored as separate rows.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            reg_number TEXT NOT NULL,
            math_marks INTEGER NOT NULL,
            java_marks INTEGER NOT NULL,
            php_marks INTEGER NOT NULL,
            created_at TEXT
        )",
        [],
    )
    .context("failed to create students table")?;

    Ok(conn)
}
