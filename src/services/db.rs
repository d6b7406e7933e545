use crate::error::AppError;
use crate::models::prediction_types::{PredictionRecord, Verdict};
use rusqlite::{params, Connection, OpenFlags, Row};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Lexically sortable UTC timestamp with microseconds.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const SELECT_ALL: &str = "SELECT id, filename, result, confidence, timestamp
     FROM predictions
     ORDER BY timestamp DESC, id DESC";

/// Append-only log of analysis results.
///
/// Writes go through one mutex-guarded connection. Reads open their own
/// read-only connection so a history scan never waits on an append.
#[derive(Clone)]
pub struct PredictionLog {
    path: PathBuf,
    writer: Arc<Mutex<Connection>>,
}

impl PredictionLog {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::StorageWrite(format!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let conn = Self::open_writer(&path).map_err(|e| {
            AppError::StorageWrite(format!(
                "Failed to open prediction log {}: {}",
                path.display(),
                e
            ))
        })?;

        info!(path = %path.display(), "Prediction log ready");

        Ok(Self {
            path,
            writer: Arc::new(Mutex::new(conn)),
        })
    }

    fn open_writer(path: &Path) -> rusqlite::Result<Connection> {
        let conn = Connection::open(path)?;

        // WAL lets history reads proceed while an append is in flight
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS predictions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                result TEXT NOT NULL,
                confidence REAL NOT NULL,
                timestamp TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_predictions_timestamp ON predictions(timestamp)",
            [],
        )?;

        Ok(conn)
    }

    fn open_reader(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stores one result. The label is derived from `score` here so it can
    /// never disagree with the stored confidence.
    pub fn append(&self, filename: &str, score: f32) -> Result<PredictionRecord, AppError> {
        let mut conn = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let record = insert_record(&mut conn, filename, score)
            .map_err(|e| AppError::StorageWrite(e.to_string()))?;

        debug!(id = record.id, filename = %record.filename, "Appended prediction");
        Ok(record)
    }

    /// Streams every record, newest first, without collecting them.
    pub fn scan<F>(&self, mut visit: F) -> Result<(), AppError>
    where
        F: FnMut(PredictionRecord),
    {
        self.scan_rows(&mut visit)
            .map_err(|e| AppError::StorageRead(e.to_string()))
    }

    fn scan_rows<F>(&self, visit: &mut F) -> rusqlite::Result<()>
    where
        F: FnMut(PredictionRecord),
    {
        let conn = self.open_reader()?;
        let mut stmt = conn.prepare(SELECT_ALL)?;
        let rows = stmt.query_map([], record_from_row)?;
        for row in rows {
            visit(row?);
        }
        Ok(())
    }

    pub fn list_all(&self) -> Result<Vec<PredictionRecord>, AppError> {
        let mut records = Vec::new();
        self.scan(|record| records.push(record))?;
        Ok(records)
    }

    pub fn count(&self) -> Result<i64, AppError> {
        let conn = self
            .open_reader()
            .map_err(|e| AppError::StorageRead(e.to_string()))?;
        conn.query_row("SELECT COUNT(*) FROM predictions", [], |row| row.get(0))
            .map_err(|e| AppError::StorageRead(e.to_string()))
    }
}

fn insert_record(
    conn: &mut Connection,
    filename: &str,
    score: f32,
) -> rusqlite::Result<PredictionRecord> {
    let result = Verdict::from_score(score).label().to_string();
    let confidence = score as f64;
    let timestamp = chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string();

    // Either the whole row commits or nothing does.
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO predictions (filename, result, confidence, timestamp) VALUES (?1, ?2, ?3, ?4)",
        params![filename, result, confidence, timestamp],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    Ok(PredictionRecord {
        id,
        filename: filename.to_string(),
        result,
        confidence,
        timestamp,
    })
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<PredictionRecord> {
    // Only the two verdict labels are ever written; anything else is corruption.
    let label: String = row.get(2)?;
    let verdict = label.parse::<Verdict>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, e.into())
    })?;

    Ok(PredictionRecord {
        id: row.get(0)?,
        filename: row.get(1)?,
        result: verdict.label().to_string(),
        confidence: row.get(3)?,
        timestamp: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_temp() -> (tempfile::TempDir, PredictionLog) {
        let dir = tempdir().expect("tempdir");
        let log = PredictionLog::open(dir.path().join("database/predictions.db")).unwrap();
        (dir, log)
    }

    #[test]
    fn creates_schema_and_parent_directory() {
        let (dir, log) = open_temp();
        assert!(dir.path().join("database").is_dir());
        assert_eq!(log.count().unwrap(), 0);
        assert!(log.list_all().unwrap().is_empty());
    }

    #[test]
    fn wal_mode_is_enabled() {
        let (_dir, log) = open_temp();
        let conn = log.writer.lock().unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn append_derives_label_and_keeps_raw_score() {
        let (_dir, log) = open_temp();
        let positive = log.append("a.png", 0.73).unwrap();
        let tie = log.append("b.png", 0.5).unwrap();

        assert_eq!(positive.result, "Tumor Detected");
        assert_eq!(positive.confidence, 0.73f32 as f64);
        assert_eq!(tie.result, "No Tumor");
        assert!(tie.id > positive.id);
    }

    #[test]
    fn list_is_newest_first_and_repeatable() {
        let (_dir, log) = open_temp();
        for i in 0..5 {
            log.append(&format!("scan_{}.jpg", i), i as f32 / 5.0).unwrap();
        }

        let first = log.list_all().unwrap();
        let second = log.list_all().unwrap();
        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
        assert_eq!(first[0].filename, "scan_4.jpg");
        assert_eq!(first[4].filename, "scan_0.jpg");
        assert!(first
            .windows(2)
            .all(|w| w[0].timestamp >= w[1].timestamp && w[0].id > w[1].id));
    }

    #[test]
    fn filenames_are_stored_verbatim() {
        let (_dir, log) = open_temp();
        let hostile = "x'); DROP TABLE predictions; -- <b>.png";
        log.append(hostile, 0.1).unwrap();
        let records = log.list_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].filename, hostile);
    }

    #[test]
    fn history_survives_reopen() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("predictions.db");
        {
            let log = PredictionLog::open(&path).unwrap();
            log.append("kept.png", 0.9).unwrap();
        }
        let log = PredictionLog::open(&path).unwrap();
        let records = log.list_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].filename, "kept.png");
        assert_eq!(records[0].id, 1);
    }

    #[test]
    fn foreign_label_in_the_table_fails_the_scan() {
        let (_dir, log) = open_temp();
        log.append("ok.png", 0.2).unwrap();
        {
            let conn = log.writer.lock().unwrap();
            conn.execute(
                "INSERT INTO predictions (filename, result, confidence, timestamp)
                 VALUES ('odd.png', 'Maybe Tumor', 0.4, '2026-01-01 00:00:00.000000')",
                [],
            )
            .unwrap();
        }

        let err = log.list_all().unwrap_err();
        assert!(matches!(err, AppError::StorageRead(_)));
        assert!(err.to_string().contains("Maybe Tumor"));
    }
}
