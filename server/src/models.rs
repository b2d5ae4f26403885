//! Log record and request/response models.

use serde::{Deserialize, Serialize};

/// Sentinel for fields the record has no real value for.
pub const UNKNOWN: &str = "Unknown";

fn unknown() -> String {
    UNKNOWN.to_string()
}

/// Event kind stored in the log, tagged on the wire as `eventType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "Visit")]
    Visit,
    #[serde(rename = "File Upload")]
    FileUpload,
}

impl Default for EventType {
    fn default() -> Self {
        EventType::Visit
    }
}

/// File metadata block, present on file-upload records only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDetails {
    pub file_name: String,
    pub file_type: String,
    pub file_size: String,
    pub user_file_path: String,
}

/// One persisted log record. Append-only; ordering is arrival order.
///
/// Fields an event could not resolve carry the "Unknown" sentinel rather
/// than being omitted, so readers always see the full schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub timestamp: String,
    #[serde(default)]
    pub event_type: EventType,
    #[serde(default = "unknown")]
    pub url: String,
    #[serde(default = "unknown")]
    pub http_method: String,
    #[serde(default)]
    pub response_status: u16,
    #[serde(default = "unknown")]
    pub referer: String,
    #[serde(default = "unknown")]
    pub public_ip: String,
    #[serde(default = "unknown")]
    pub private_ip: String,
    #[serde(default = "unknown")]
    pub server_ip: String,
    #[serde(default = "unknown")]
    pub geo_location: String,
    #[serde(rename = "isTorOrVPN", default = "unknown")]
    pub is_tor_or_vpn: String,
    #[serde(default = "unknown")]
    pub search_query: String,
    #[serde(default = "unknown")]
    pub user_email: String,
    #[serde(default = "unknown")]
    pub user_agent: String,
    /// Browser family and major version, derived from the user agent.
    #[serde(default = "unknown")]
    pub browser: String,
    #[serde(default = "unknown")]
    pub os_info: String,
    #[serde(default = "unknown")]
    pub device: String,
    #[serde(default = "unknown")]
    pub device_type: String,
    #[serde(default = "unknown")]
    pub session_id: String,
    #[serde(default = "unknown")]
    pub risk_score: String,
    /// Present on file-upload records.
    #[serde(flatten)]
    pub file: Option<FileDetails>,
    /// Server-side storage path, present on records from `/uploadFile`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_file_path: Option<String>,
}

/// Body of `POST /logVisit`: the enriched event as submitted by an agent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogVisitRequest {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub event_type: Option<EventType>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub response_status: Option<u16>,
    #[serde(default)]
    pub referer: Option<String>,
    #[serde(default)]
    pub public_ip: String,
    #[serde(default)]
    pub server_ip: Option<String>,
    #[serde(default)]
    pub geo_location: Option<String>,
    #[serde(rename = "isTorOrVPN", default)]
    pub is_tor_or_vpn: Option<String>,
    #[serde(default)]
    pub search_query: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub risk_score: Option<String>,
    #[serde(flatten)]
    pub file: Option<FileDetails>,
}

/// Response of `POST /logVisit`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogVisitResponse {
    pub message: String,
    pub private_ip: String,
}

/// Response of `POST /uploadFile`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileResponse {
    pub message: String,
    pub server_file_path: String,
    pub user_file_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_uses_original_wire_labels() {
        assert_eq!(serde_json::to_string(&EventType::Visit).unwrap(), "\"Visit\"");
        assert_eq!(
            serde_json::to_string(&EventType::FileUpload).unwrap(),
            "\"File Upload\""
        );
    }

    #[test]
    fn visit_request_accepts_minimal_body() {
        let body = r#"{"url":"https://example.com","publicIp":"1.2.3.4","userAgent":"UA"}"#;
        let request: LogVisitRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.url, "https://example.com");
        assert_eq!(request.public_ip, "1.2.3.4");
        assert!(request.file.is_none());
    }

    #[test]
    fn visit_request_picks_up_file_block() {
        let body = r#"{
            "url": "https://example.com/upload",
            "publicIp": "1.2.3.4",
            "userAgent": "UA",
            "eventType": "File Upload",
            "fileName": "report.pdf",
            "fileType": "application/pdf",
            "fileSize": "2.00 KB",
            "userFilePath": "Uploaded from this device"
        }"#;
        let request: LogVisitRequest = serde_json::from_str(body).unwrap();
        let file = request.file.expect("file block");
        assert_eq!(file.file_name, "report.pdf");
        assert_eq!(request.event_type, Some(EventType::FileUpload));
    }

    #[test]
    fn tor_flag_round_trips_with_uppercase_vpn_key() {
        let body = r#"{"url":"https://example.com","publicIp":"1.2.3.4","userAgent":"UA","isTorOrVPN":"No"}"#;
        let request: LogVisitRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.is_tor_or_vpn.as_deref(), Some("No"));

        let record = LogRecord {
            is_tor_or_vpn: "Yes".to_string(),
            ..serde_json::from_str::<LogRecord>(
                r#"{"timestamp":"2026-01-01T00:00:00.000Z","eventType":"Visit"}"#,
            )
            .unwrap()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["isTorOrVPN"], "Yes");
        assert!(json.get("isTorOrVpn").is_none());
    }

    #[test]
    fn record_defaults_fill_missing_fields_with_sentinels() {
        let body = r#"{"timestamp":"2026-01-01T00:00:00.000Z","eventType":"Visit"}"#;
        let record: LogRecord = serde_json::from_str(body).unwrap();
        assert_eq!(record.url, UNKNOWN);
        assert_eq!(record.risk_score, UNKNOWN);
        assert!(record.file.is_none());
    }
}
