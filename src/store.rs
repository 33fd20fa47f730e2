use crate::db;
use crate::records::StudentRecord;
use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to connect to the database: {0}")]
    Connection(String),
    #[error("Error loading existing students: {0}")]
    Query(String),
    #[error("Error adding student. Please try again. ({0})")]
    Write(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Connection(_) => "db_open_failed",
            StoreError::Query(_) => "query_failed",
            StoreError::Write(_) => "write_failed",
        }
    }
}

/// Persistence the session depends on. `append` is atomic per call.
pub trait RecordStore {
    fn list_all(&self) -> Result<Vec<StudentRecord>, StoreError>;
    fn append(&mut self, record: &StudentRecord) -> Result<(), StoreError>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(workspace: &Path) -> Result<Self, StoreError> {
        let conn = db::open_db(workspace).map_err(|e| StoreError::Connection(format!("{e:#}")))?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

impl RecordStore for SqliteStore {
    fn list_all(&self) -> Result<Vec<StudentRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name, reg_number, math_marks, java_marks, php_marks
                 FROM students
                 ORDER BY rowid",
            )
            .map_err(|e| StoreError::Query(e.to_string()))?;

        stmt.query_map([], |row| {
            Ok(StudentRecord::from_stored(
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
            ))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())
        .map_err(|e| StoreError::Query(e.to_string()))
    }

    fn append(&mut self, record: &StudentRecord) -> Result<(), StoreError> {
        let id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO students(id, name, reg_number, math_marks, java_marks, php_marks, created_at)
                 VALUES(?, ?, ?, ?, ?, ?, ?)",
                (
                    &id,
                    record.name(),
                    record.reg_number(),
                    record.math_marks(),
                    record.java_marks(),
                    record.php_marks(),
                    &created_at,
                ),
            )
            .map_err(|e| StoreError::Write(e.to_string()))?;
        Ok(())
    }
}
