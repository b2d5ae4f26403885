//! Transport
//!
//! Delivers enriched events to the backend's append endpoint and keeps the
//! local mirror. Remote persistence is best-effort with no retry; the local
//! copy is written unconditionally.

use serde::Deserialize;
use std::time::Duration;

use crate::events::EnrichedEvent;
use crate::mirror::Mirror;

/// Outcome of one delivery attempt.
#[derive(Debug, Clone)]
pub struct DeliveryResult {
    /// Did the backend accept the event?
    pub ok: bool,
    /// Private IP the backend resolved for this client, when delivered.
    pub private_ip: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LogVisitResponse {
    #[allow(dead_code)]
    message: String,
    #[serde(rename = "privateIp")]
    private_ip: Option<String>,
}

/// Event transport to the log-storage backend.
pub struct Transport {
    http_client: reqwest::Client,
    backend_url: String,
    mirror: Mirror,
}

impl Transport {
    pub fn new(
        backend_url: &str,
        timeout_secs: u64,
        mirror: Mirror,
    ) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TransportError::ClientError(e.to_string()))?;

        Ok(Self {
            http_client,
            backend_url: backend_url.trim_end_matches('/').to_string(),
            mirror,
        })
    }

    /// Deliver an event to the backend. On success the server-resolved
    /// private IP is adopted into the mirrored copy. The mirror is written
    /// either way; failures are reported, not retried.
    pub async fn deliver(&mut self, mut event: EnrichedEvent) -> DeliveryResult {
        let url = format!("{}/logVisit", self.backend_url);

        let result = match self.post_event(&url, &event).await {
            Ok(response) => {
                if let Some(private_ip) = &response.private_ip {
                    event.private_ip = private_ip.clone();
                }
                log::info!("Log saved: {} ({})", event.url, event.risk_score);
                DeliveryResult {
                    ok: true,
                    private_ip: response.private_ip,
                }
            }
            Err(e) => {
                log::error!("Error sending log to backend: {}", e);
                DeliveryResult {
                    ok: false,
                    private_ip: None,
                }
            }
        };

        if let Err(e) = self.mirror.append(&event) {
            log::error!("Failed to mirror event locally: {}", e);
        }

        result
    }

    async fn post_event(
        &self,
        url: &str,
        event: &EnrichedEvent,
    ) -> Result<LogVisitResponse, TransportError> {
        let response = self
            .http_client
            .post(url)
            .json(event)
            .send()
            .await
            .map_err(|e| TransportError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::ServerError(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::ParseError(e.to_string()))
    }

    /// Read back the locally mirrored events.
    pub fn mirrored_events(&self) -> std::io::Result<Vec<EnrichedEvent>> {
        self.mirror.read_all()
    }
}

/// Transport failures. Absorbed into `DeliveryResult`, never propagated.
#[derive(Debug, Clone)]
pub enum TransportError {
    ClientError(String),
    NetworkError(String),
    ServerError(u16),
    ParseError(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClientError(e) => write!(f, "Client error: {}", e),
            Self::NetworkError(e) => write!(f, "Network error: {}", e),
            Self::ServerError(code) => write!(f, "Server error: {}", code),
            Self::ParseError(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for TransportError {}

// ============================================================================
// TESTS
// ============================================================================
