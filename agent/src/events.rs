//! Event Types
//!
//! Data structures flowing through the capture -> enrichment -> transport
//! chain. No logic here beyond constructors and serialization.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// SENTINELS
// ============================================================================

/// Placeholder for enrichment fields that could not be resolved.
pub const UNKNOWN: &str = "Unknown";

/// Placeholder for the referer when no tab context is available.
pub const NOT_APPLICABLE: &str = "N/A";

/// Placeholder for the user email when no identity provider is available.
pub const NOT_AVAILABLE: &str = "Not Available";

// ============================================================================
// TRI-STATE
// ============================================================================

/// Three-valued flag used where boolean certainty is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriState {
    Yes,
    No,
    Unknown,
}

impl TriState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriState::Yes => "Yes",
            TriState::No => "No",
            TriState::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for TriState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RAW EVENT
// ============================================================================

/// Kind-specific payload of a captured event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawEventKind {
    /// A page visit, with the search query derived from the URL (if any).
    PageVisit { search_query: Option<String> },
    /// A file selected into a file input on the page.
    FileUpload {
        file_name: String,
        file_type: String,
        /// Human-formatted size, e.g. "2.00 KB".
        file_size: String,
        user_file_path: String,
    },
}

/// Event captured at the point of user action, pre-enrichment.
///
/// `url` and `user_agent` are always present; constructors enforce this, so
/// downstream stages may rely on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub kind: RawEventKind,
    pub url: String,
    /// ISO-8601 capture time.
    pub timestamp: String,
    pub user_agent: String,
}

impl RawEvent {
    pub fn page_visit(url: &str, user_agent: &str, search_query: Option<String>) -> Self {
        Self {
            kind: RawEventKind::PageVisit { search_query },
            url: url.to_string(),
            timestamp: now_iso8601(),
            user_agent: user_agent.to_string(),
        }
    }

    pub fn file_upload(
        url: &str,
        user_agent: &str,
        file_name: String,
        file_type: String,
        file_size: String,
        user_file_path: String,
    ) -> Self {
        Self {
            kind: RawEventKind::FileUpload {
                file_name,
                file_type,
                file_size,
                user_file_path,
            },
            url: url.to_string(),
            timestamp: now_iso8601(),
            user_agent: user_agent.to_string(),
        }
    }

    /// Wire label for this event kind ("Visit" / "File Upload").
    pub fn event_type(&self) -> &'static str {
        match self.kind {
            RawEventKind::PageVisit { .. } => "Visit",
            RawEventKind::FileUpload { .. } => "File Upload",
        }
    }
}

// ============================================================================
// ENRICHED EVENT
// ============================================================================

/// RawEvent augmented with network/identity/risk metadata.
///
/// Serializes to the backend wire shape (camelCase keys). Every enrichment
/// field holds a sentinel when its lookup failed, so consumers always see a
/// value for every schema key of the event's kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedEvent {
    pub timestamp: String,
    pub event_type: String,
    pub url: String,
    pub public_ip: String,
    pub private_ip: String,
    pub server_ip: String,
    pub geo_location: String,
    #[serde(rename = "isTorOrVPN")]
    pub is_tor_or_vpn: TriState,
    pub user_email: String,
    pub referer: String,
    pub http_method: String,
    pub response_status: u16,
    pub device_type: String,
    pub user_agent: String,
    pub session_id: String,
    pub risk_score: crate::risk::RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_file_path: Option<String>,
}

/// Mobile/Desktop heuristic from the user-agent string.
pub fn device_type(user_agent: &str) -> &'static str {
    if user_agent.contains("Mobi") {
        "Mobile"
    } else {
        "Desktop"
    }
}

/// Current time as an ISO-8601 string (millisecond precision, like
/// JavaScript's `toISOString`).
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ============================================================================
// TESTS
// ============================================================================
