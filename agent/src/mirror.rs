//! Local Event Mirror
//!
//! Append-only JSONL copy of every enriched event, kept client-side for
//! display regardless of delivery outcome.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::events::EnrichedEvent;

/// Append-only JSONL mirror.
pub struct Mirror {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl Mirror {
    /// Open (or create) the mirror file, creating parent directories.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        log::info!("Opened local mirror: {:?}", path);

        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
        })
    }

    /// Append one event as a JSONL line and flush.
    pub fn append(&mut self, event: &EnrichedEvent) -> std::io::Result<()> {
        let line = serde_json::to_string(event)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }

    /// Read back all mirrored events, in arrival order. Unparseable lines
    /// are skipped rather than failing the read.
    pub fn read_all(&self) -> std::io::Result<Vec<EnrichedEvent>> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        let mut events = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(event) => events.push(event),
                Err(e) => log::warn!("Skipping corrupt mirror line: {}", e),
            }
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{TriState, NOT_APPLICABLE, NOT_AVAILABLE, UNKNOWN};
    use crate::risk::RiskLevel;

    fn sample(url: &str) -> EnrichedEvent {
        EnrichedEvent {
            timestamp: crate::events::now_iso8601(),
            event_type: "Visit".to_string(),
            url: url.to_string(),
            public_ip: UNKNOWN.to_string(),
            private_ip: UNKNOWN.to_string(),
            server_ip: UNKNOWN.to_string(),
            geo_location: UNKNOWN.to_string(),
            is_tor_or_vpn: TriState::Unknown,
            user_email: NOT_AVAILABLE.to_string(),
            referer: NOT_APPLICABLE.to_string(),
            http_method: "GET".to_string(),
            response_status: 200,
            device_type: "Desktop".to_string(),
            user_agent: "TestAgent/1.0".to_string(),
            session_id: "session-1".to_string(),
            risk_score: RiskLevel::Low,
            search_query: Some("N/A".to_string()),
            file_name: None,
            file_type: None,
            file_size: None,
            user_file_path: None,
        }
    }

    #[test]
    fn appends_and_reads_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.jsonl");

        let mut mirror = Mirror::open(&path).unwrap();
        mirror.append(&sample("https://example.com/a")).unwrap();
        mirror.append(&sample("https://example.com/b")).unwrap();

        let events = mirror.read_all().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].url, "https://example.com/a");
        assert_eq!(events[1].url, "https://example.com/b");
    }

    #[test]
    fn corrupt_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.jsonl");

        let mut mirror = Mirror::open(&path).unwrap();
        mirror.append(&sample("https://example.com/a")).unwrap();

        use std::io::Write as _;
        let mut raw = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(raw, "{{not json").unwrap();

        let mut mirror = Mirror::open(&path).unwrap();
        mirror.append(&sample("https://example.com/b")).unwrap();

        let events = mirror.read_all().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].url, "https://example.com/b");
    }
}
