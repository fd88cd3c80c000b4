use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use tokio::fs;
use tracing::warn;

use crate::{
    app_error::{AppError, AppResult},
    application::export::{self, COLUMNS, TIMESTAMP_FORMAT},
    use_cases::registration::{
        AttendanceRecord, Masterclass, RecordStore, Registration, SessionDay,
    },
};

/// Append-only attendance table in a local delimited-text file.
///
/// Appends rewrite the whole file in place; there is no locking, so two
/// concurrent writers race and the last write wins. A missing or corrupt
/// file degrades to an empty table on read.
pub struct CsvFileStore {
    path: PathBuf,
}

impl CsvFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecordStore for CsvFileStore {
    async fn load(&self) -> AppResult<Vec<AttendanceRecord>> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                warn!(error = %err, path = %self.path.display(), "attendance file unreadable, treating as empty");
                return Ok(Vec::new());
            }
        };
        Ok(parse_table(&text))
    }

    async fn append(&self, registration: &Registration) -> AppResult<AttendanceRecord> {
        let mut records = self.load().await?;

        let mut timestamp = Utc::now().naive_utc();
        if let Some(last) = records.last() {
            // Keep append order monotonic even if the wall clock steps back.
            timestamp = timestamp.max(last.timestamp);
        }

        let record = AttendanceRecord {
            timestamp,
            name: registration.name.clone(),
            email: registration.email.clone(),
            phone: registration.phone.clone(),
            masterclass: registration.masterclass,
            session: registration.session,
        };
        records.push(record.clone());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| AppError::StoreWrite(e.to_string()))?;
            }
        }
        fs::write(&self.path, export::to_csv(&records))
            .await
            .map_err(|e| AppError::StoreWrite(e.to_string()))?;

        Ok(record)
    }

    async fn count(&self) -> Option<u64> {
        self.load().await.ok().map(|records| records.len() as u64)
    }
}

/// Parses the delimited-text table back into records. The first row is the
/// header; declared columns missing from it are healed with empty values.
/// Rows with an unparseable timestamp are dropped.
fn parse_table(text: &str) -> Vec<AttendanceRecord> {
    let mut rows = parse_rows(text).into_iter();
    let Some(header) = rows.next() else {
        return Vec::new();
    };

    let positions: Vec<Option<usize>> = COLUMNS
        .iter()
        .map(|name| header.iter().position(|h| h == name))
        .collect();

    let mut records = Vec::new();
    for row in rows {
        let field = |column: usize| -> &str {
            positions[column]
                .and_then(|i| row.get(i))
                .map(String::as_str)
                .unwrap_or("")
        };

        let Ok(timestamp) = NaiveDateTime::parse_from_str(field(0), TIMESTAMP_FORMAT) else {
            warn!(value = field(0), "dropping row with unparseable timestamp");
            continue;
        };

        records.push(AttendanceRecord {
            timestamp,
            name: field(1).to_string(),
            email: field(2).to_string(),
            phone: field(3).to_string(),
            masterclass: Masterclass::from_label(field(4)),
            session: SessionDay::from_label(field(5)),
        });
    }
    records
}

/// Splits delimited text into rows of fields, honoring quoted fields with
/// embedded commas, doubled quotes and newlines.
fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn registration(name: &str) -> Registration {
        Registration {
            name: name.to_string(),
            email: "aya@test.com".to_string(),
            phone: "+971501234567".to_string(),
            masterclass: Some(Masterclass::AiFundamentals),
            session: Some(SessionDay::Day2),
        }
    }

    #[tokio::test]
    async fn loading_a_missing_file_yields_the_empty_table() {
        let dir = tempdir().unwrap();
        let store = CsvFileStore::new(dir.path().join("attendance.csv"));
        assert_eq!(store.load().await.unwrap(), Vec::new());
        assert_eq!(store.count().await, Some(0));
    }

    #[tokio::test]
    async fn appended_records_load_back_in_order() {
        let dir = tempdir().unwrap();
        let store = CsvFileStore::new(dir.path().join("attendance.csv"));

        for i in 0..3 {
            store.append(&registration(&format!("Guest {i}"))).await.unwrap();
        }

        let records = store.load().await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "Guest 0");
        assert_eq!(records[2].name, "Guest 2");
        assert_eq!(records[0].email, "aya@test.com");
        assert_eq!(records[0].masterclass, Some(Masterclass::AiFundamentals));
        assert!(records.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(store.count().await, Some(3));
    }

    #[tokio::test]
    async fn append_creates_the_data_directory_on_first_run() {
        let dir = tempdir().unwrap();
        let store = CsvFileStore::new(dir.path().join("data").join("attendance.csv"));
        store.append(&registration("Aya")).await.unwrap();
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn corrupt_file_degrades_to_the_empty_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("attendance.csv");
        tokio::fs::write(&path, "\u{0}\u{1}garbage\nwith,no,header").await.unwrap();

        let store = CsvFileStore::new(path);
        assert_eq!(store.load().await.unwrap(), Vec::new());
    }

    #[tokio::test]
    async fn missing_declared_columns_are_healed_with_empty_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("attendance.csv");
        tokio::fs::write(
            &path,
            "timestamp,name,email\n2026-08-26T10:30:00,Aya,aya@test.com\n",
        )
        .await
        .unwrap();

        let store = CsvFileStore::new(path);
        let records = store.load().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Aya");
        assert_eq!(records[0].phone, "");
        assert_eq!(records[0].masterclass, None);
    }

    #[tokio::test]
    async fn fields_with_commas_quotes_and_newlines_round_trip() {
        let dir = tempdir().unwrap();
        let store = CsvFileStore::new(dir.path().join("attendance.csv"));

        let mut tricky = registration("Doe, Jane \"JD\"\nJr.");
        tricky.masterclass = None;
        tricky.session = None;
        store.append(&tricky).await.unwrap();

        let records = store.load().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Doe, Jane \"JD\"\nJr.");
        assert_eq!(records[0].session, None);
    }

    #[tokio::test]
    async fn exported_csv_reloads_to_the_same_rows() {
        let dir = tempdir().unwrap();
        let store = CsvFileStore::new(dir.path().join("attendance.csv"));
        for i in 0..4 {
            store.append(&registration(&format!("Guest {i}"))).await.unwrap();
        }

        let records = store.load().await.unwrap();
        let copy_path = dir.path().join("copy.csv");
        tokio::fs::write(&copy_path, export::to_csv(&records)).await.unwrap();

        let copy = CsvFileStore::new(copy_path);
        assert_eq!(copy.load().await.unwrap(), records);
    }
}
