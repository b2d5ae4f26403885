//! Agent Configuration

use std::env;

/// Default user agent reported when the embedding context provides none.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/122.0.0.0 Safari/537.36";

/// Agent configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Base URL of the log-storage backend.
    pub backend_url: String,

    /// User agent string attached to captured events.
    pub user_agent: String,

    /// Signed-in user email, when known. Absent means no identity provider.
    pub user_email: Option<String>,

    /// IPQualityScore API key for proxy/Tor detection.
    pub ipqs_api_key: Option<String>,

    /// AbuseIPDB API key for abuse-score lookups.
    pub abuseipdb_api_key: Option<String>,

    /// Per-lookup HTTP timeout in seconds.
    pub lookup_timeout_secs: u64,

    /// Path of the local JSONL mirror of delivered events.
    pub mirror_file: String,
}

impl AgentConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            backend_url: env::var("WEBTRAIL_BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),

            user_agent: env::var("WEBTRAIL_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),

            user_email: env::var("WEBTRAIL_USER_EMAIL")
                .ok()
                .filter(|email| !email.is_empty()),

            ipqs_api_key: env::var("IPQS_API_KEY").ok().filter(|key| !key.is_empty()),

            abuseipdb_api_key: env::var("ABUSEIPDB_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),

            lookup_timeout_secs: env::var("WEBTRAIL_LOOKUP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),

            mirror_file: env::var("WEBTRAIL_MIRROR_FILE")
                .unwrap_or_else(|_| "logs/local_mirror.jsonl".to_string()),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:3000".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            user_email: None,
            ipqs_api_key: None,
            abuseipdb_api_key: None,
            lookup_timeout_secs: 10,
            mirror_file: "logs/local_mirror.jsonl".to_string(),
        }
    }
}
