//! Log Store
//!
//! Append-only JSON-array file. Appends from concurrent requests serialize
//! behind an async mutex; the read-modify-write of the array file is never
//! interleaved. Corrupt or missing content reads as an empty log.

use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::models::LogRecord;

/// File-backed append-only log store.
pub struct LogStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LogStore {
    /// Create a store over the given file, creating parent directories.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    /// Append one record to the log.
    pub async fn append(&self, record: &LogRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.read_records().await?;
        records.push(record.clone());

        let body = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(&self.path, body).await?;
        Ok(())
    }

    /// All records in arrival order. A missing file or corrupt content is
    /// treated as an empty log rather than failing the caller; real I/O
    /// errors propagate.
    pub async fn read_all(&self) -> Result<Vec<LogRecord>, StoreError> {
        self.read_records().await
    }

    async fn read_records(&self) -> Result<Vec<LogRecord>, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::error!("Corrupt log file, treating as empty: {}", e);
                Ok(Vec::new())
            }
        }
    }
}

/// Storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("log I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("log serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventType, UNKNOWN};

    fn record(url: &str) -> LogRecord {
        LogRecord {
            timestamp: "2026-01-01T00:00:00.000Z".to_string(),
            event_type: EventType::Visit,
            url: url.to_string(),
            http_method: "GET".to_string(),
            response_status: 200,
            referer: "N/A".to_string(),
            public_ip: "1.2.3.4".to_string(),
            private_ip: "192.168.1.10".to_string(),
            server_ip: UNKNOWN.to_string(),
            geo_location: UNKNOWN.to_string(),
            is_tor_or_vpn: UNKNOWN.to_string(),
            search_query: "N/A".to_string(),
            user_email: UNKNOWN.to_string(),
            user_agent: "UA".to_string(),
            browser: UNKNOWN.to_string(),
            os_info: UNKNOWN.to_string(),
            device: UNKNOWN.to_string(),
            device_type: "Desktop".to_string(),
            session_id: "session-1".to_string(),
            risk_score: "Low".to_string(),
            file: None,
            server_file_path: None,
        }
    }

    #[tokio::test]
    async fn round_trips_appended_records_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::new(&dir.path().join("logs/access_logs.json")).unwrap();

        store.append(&record("https://example.com/a")).await.unwrap();
        store.append(&record("https://example.com/b")).await.unwrap();

        let records = store.read_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url, "https://example.com/a");
        assert_eq!(records.last().unwrap(), &record("https://example.com/b"));
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::new(&dir.path().join("access_logs.json")).unwrap();
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access_logs.json");
        std::fs::write(&path, "{definitely not a json array").unwrap();

        let store = LogStore::new(&path).unwrap();
        assert!(store.read_all().await.unwrap().is_empty());

        // Appending after corruption starts a fresh log.
        store.append(&record("https://example.com/a")).await.unwrap();
        let records = store.read_all().await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_appends_all_land() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            std::sync::Arc::new(LogStore::new(&dir.path().join("access_logs.json")).unwrap());

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append(&record(&format!("https://example.com/{i}")))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.read_all().await.unwrap().len(), 8);
    }
}
