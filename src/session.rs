use crate::records::{self, DisplayRow, RejectionReason};
use crate::store::{RecordStore, StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Idle,
    Submitting,
}

/// Raw text of the five form fields, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    pub name: String,
    pub reg_number: String,
    pub math_marks: String,
    pub java_marks: String,
    pub php_marks: String,
}

impl FormInput {
    pub fn is_blank(&self) -> bool {
        [
            &self.name,
            &self.reg_number,
            &self.math_marks,
            &self.java_marks,
            &self.php_marks,
        ]
        .iter()
        .all(|v| v.is_empty())
    }
}

/// Partial form update; absent fields keep their current text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPatch {
    pub name: Option<String>,
    pub reg_number: Option<String>,
    pub math_marks: Option<String>,
    pub java_marks: Option<String>,
    pub php_marks: Option<String>,
}

#[derive(Debug, Error)]
pub enum AddError {
    #[error("{0}")]
    Rejected(RejectionReason),
    #[error("{0}")]
    Persistence(StoreError),
}

impl AddError {
    pub fn code(&self) -> &'static str {
        match self {
            AddError::Rejected(r) => r.code(),
            AddError::Persistence(e) => e.code(),
        }
    }
}

/// Owns the store, the form, and the append-only view for one workspace.
pub struct Session<S: RecordStore> {
    store: S,
    rows: Vec<DisplayRow>,
    form: FormInput,
    state: SessionState,
}

impl<S: RecordStore> Session<S> {
    /// Startup transition. A listing failure leaves the view empty and is
    /// handed back for reporting; new submissions still work.
    pub fn start(store: S) -> (Self, Option<StoreError>) {
        let mut session = Self {
            store,
            rows: Vec::new(),
            form: FormInput::default(),
            state: SessionState::Idle,
        };

        let load_error = match session.store.list_all() {
            Ok(stored) => {
                session.rows = stored.iter().map(records::to_display_row).collect();
                tracing::info!(rows = session.rows.len(), "loaded existing students");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not load existing students; starting empty");
                Some(e)
            }
        };

        (session, load_error)
    }

    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn form(&self) -> &FormInput {
        &self.form
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn set_form(&mut self, patch: FormPatch) {
        let FormPatch {
            name,
            reg_number,
            math_marks,
            java_marks,
            php_marks,
        } = patch;
        if let Some(v) = name {
            self.form.name = v;
        }
        if let Some(v) = reg_number {
            self.form.reg_number = v;
        }
        if let Some(v) = math_marks {
            self.form.math_marks = v;
        }
        if let Some(v) = java_marks {
            self.form.java_marks = v;
        }
        if let Some(v) = php_marks {
            self.form.php_marks = v;
        }
    }

    /// Add transition. The row is appended and the form cleared only after
    /// the store acknowledges the write; any failure leaves both untouched.
    pub fn on_add_requested(&mut self) -> Result<DisplayRow, AddError> {
        self.state = SessionState::Submitting;
        let result = self.submit();
        self.state = SessionState::Idle;
        result
    }

    fn submit(&mut self) -> Result<DisplayRow, AddError> {
        let f = &self.form;
        let record = records::validate(
            &f.name,
            &f.reg_number,
            &f.math_marks,
            &f.java_marks,
            &f.php_marks,
        )
        .map_err(|reason| {
            tracing::info!(reason = reason.code(), "student rejected");
            AddError::Rejected(reason)
        })?;

        self.store.append(&record).map_err(|e| {
            tracing::error!(error = %e, reg_number = record.reg_number(), "student write failed");
            AddError::Persistence(e)
        })?;

        let row = records::to_display_row(&record);
        self.rows.push(row.clone());
        self.form = FormInput::default();
        tracing::info!(
            reg_number = %row.reg_number,
            average = row.average_marks,
            "student added"
        );
        Ok(row)
    }

    /// Ends the session and hands the store back so the caller can release it.
    pub fn on_exit_requested(self) -> S {
        tracing::info!(rows = self.rows.len(), "session exit requested");
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::StudentRecord;

    #[derive(Default)]
    struct MemoryStore {
        records: Vec<StudentRecord>,
        fail_list: bool,
        fail_append: bool,
        append_calls: usize,
    }

    impl RecordStore for MemoryStore {
        fn list_all(&self) -> Result<Vec<StudentRecord>, StoreError> {
            if self.fail_list {
                return Err(StoreError::Query("table missing".into()));
            }
            Ok(self.records.clone())
        }

        fn append(&mut self, record: &StudentRecord) -> Result<(), StoreError> {
            self.append_calls += 1;
            if self.fail_append {
                return Err(StoreError::Write("disk full".into()));
            }
            self.records.push(record.clone());
            Ok(())
        }
    }

    fn fill(session: &mut Session<MemoryStore>, name: &str, reg: &str, m: &str, j: &str, p: &str) {
        session.set_form(FormPatch {
            name: Some(name.into()),
            reg_number: Some(reg.into()),
            math_marks: Some(m.into()),
            java_marks: Some(j.into()),
            php_marks: Some(p.into()),
        });
    }

    fn seeded_store() -> MemoryStore {
        MemoryStore {
            records: vec![
                records::validate("Abebe", "R001", "60", "70", "80").expect("seed"),
                records::validate("Sara", "R002", "90", "90", "91").expect("seed"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn startup_lists_rows_in_store_order() {
        let (session, load_error) = Session::start(seeded_store());
        assert!(load_error.is_none());
        let names: Vec<_> = session.rows().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Abebe", "Sara"]);
        assert_eq!(session.rows()[0].average_marks, 70.0);
        assert!(!session.rows()[0].highlighted);
        assert!(session.rows()[1].highlighted);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn startup_list_failure_degrades_to_empty_view() {
        let store = MemoryStore {
            fail_list: true,
            ..seeded_store()
        };
        let (mut session, load_error) = Session::start(store);
        assert!(matches!(load_error, Some(StoreError::Query(_))));
        assert!(session.rows().is_empty());

        fill(&mut session, "Amare", "R100", "90", "80", "100");
        assert!(session.on_add_requested().is_ok());
        assert_eq!(session.rows().len(), 1);
    }

    #[test]
    fn successful_add_appends_row_and_clears_form() {
        let (mut session, _) = Session::start(MemoryStore::default());
        fill(&mut session, "Amare", "R100", "90", "80", "100");

        let row = session.on_add_requested().expect("add");
        assert_eq!(row.name, "Amare");
        assert_eq!(row.reg_number, "R100");
        assert_eq!(row.average_marks, 90.0);
        assert!(records::is_highlighted(row.average_marks));

        assert_eq!(session.rows(), &[row]);
        assert!(session.form().is_blank());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.store.records.len(), 1);
    }

    #[test]
    fn rejection_never_reaches_store_and_keeps_form() {
        let (mut session, _) = Session::start(MemoryStore::default());
        fill(&mut session, "", "R1", "abc", "50", "50");

        let err = session.on_add_requested().expect_err("rejected");
        assert!(matches!(
            err,
            AddError::Rejected(RejectionReason::MissingField)
        ));
        assert_eq!(session.store.append_calls, 0);
        assert!(session.rows().is_empty());
        assert_eq!(session.form().math_marks, "abc");
        assert_eq!(session.state(), SessionState::Idle);

        session.set_form(FormPatch {
            name: Some("Amare".into()),
            math_marks: Some("101".into()),
            ..Default::default()
        });
        let err = session.on_add_requested().expect_err("out of range");
        assert_eq!(err.code(), "out_of_range");
        assert_eq!(session.store.append_calls, 0);
    }

    #[test]
    fn write_failure_leaves_view_and_form_untouched() {
        let store = MemoryStore {
            fail_append: true,
            ..seeded_store()
        };
        let (mut session, _) = Session::start(store);
        fill(&mut session, "Amare", "R100", "90", "80", "100");
        let before = session.form().clone();

        let err = session.on_add_requested().expect_err("write fails");
        assert!(matches!(err, AddError::Persistence(StoreError::Write(_))));
        assert_eq!(err.code(), "write_failed");
        assert_eq!(session.rows().len(), 2);
        assert_eq!(session.form(), &before);
        assert!(!session.form().is_blank());

        // Retry succeeds once the store recovers.
        session.store.fail_append = false;
        session.on_add_requested().expect("retry");
        assert_eq!(session.rows().len(), 3);
        assert_eq!(session.rows()[2].reg_number, "R100");
    }

    #[test]
    fn duplicate_reg_numbers_each_append() {
        let (mut session, _) = Session::start(MemoryStore::default());
        for _ in 0..2 {
            fill(&mut session, "Amare", "R100", "90", "80", "100");
            session.on_add_requested().expect("add");
        }
        assert_eq!(session.rows().len(), 2);
        assert_eq!(session.store.records.len(), 2);
    }

    #[test]
    fn exit_returns_store() {
        let (mut session, _) = Session::start(MemoryStore::default());
        fill(&mut session, "Amare", "R100", "90", "80", "100");
        session.on_add_requested().expect("add");
        let store = session.on_exit_requested();
        assert_eq!(store.records.len(), 1);
    }
}
