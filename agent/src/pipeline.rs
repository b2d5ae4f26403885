//! Enrichment Pipeline
//!
//! Turns a RawEvent into a fully-populated EnrichedEvent through a fixed
//! sequence of awaited external lookups, then classifies risk. Each lookup
//! is failure-isolated: a failed call degrades its field to a sentinel and
//! the pipeline carries on, so the result is always complete.

use url::Url;
use uuid::Uuid;

use crate::capabilities::{IdentityProvider, TabContext};
use crate::events::{
    device_type, EnrichedEvent, RawEvent, RawEventKind, TriState, NOT_APPLICABLE, NOT_AVAILABLE,
    UNKNOWN,
};
use crate::lookup::Lookups;
use crate::risk;

/// The enrichment pipeline for one capture context.
///
/// Holds the lookup clients and the optional identity/tab capabilities. The
/// session id is generated once per context, so every event enriched by the
/// same `Enricher` correlates to the same session.
pub struct Enricher {
    lookups: Box<dyn Lookups>,
    identity: Option<Box<dyn IdentityProvider>>,
    tabs: Option<Box<dyn TabContext>>,
    session_id: String,
}

impl Enricher {
    pub fn new(
        lookups: Box<dyn Lookups>,
        identity: Option<Box<dyn IdentityProvider>>,
        tabs: Option<Box<dyn TabContext>>,
    ) -> Self {
        Self {
            lookups,
            identity,
            tabs,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Session correlation token for this capture context.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Enrich a raw event. Suspends at each external call; lookups run in
    /// order because the DNS step needs the event URL's hostname and the
    /// risk step needs the public IP and Tor/VPN status.
    pub async fn enrich(&self, raw: &RawEvent) -> EnrichedEvent {
        // 1. Public IP of this machine.
        let public_ip = match self.lookups.public_ip().await {
            Ok(ip) => ip,
            Err(e) => {
                log::warn!("Public IP lookup failed: {}", e);
                UNKNOWN.to_string()
            }
        };

        // 2. Geolocation of the public IP.
        let geo_location = if public_ip == UNKNOWN {
            UNKNOWN.to_string()
        } else {
            match self.lookups.geolocate(&public_ip).await {
                Ok(geo) => geo.display(),
                Err(e) => {
                    log::warn!("Geolocation lookup failed: {}", e);
                    UNKNOWN.to_string()
                }
            }
        };

        // 3. Proxy/Tor status of the public IP.
        let is_tor_or_vpn = if public_ip == UNKNOWN {
            TriState::Unknown
        } else {
            match self.lookups.proxy_check(&public_ip).await {
                Ok(flags) => {
                    if flags.is_proxy || flags.is_tor {
                        TriState::Yes
                    } else {
                        TriState::No
                    }
                }
                Err(e) => {
                    log::warn!("Proxy/Tor lookup failed: {}", e);
                    TriState::Unknown
                }
            }
        };

        // 4. Server IP of the visited domain.
        let server_ip = match hostname_of(&raw.url) {
            Some(hostname) => match self.lookups.resolve_host(&hostname).await {
                Ok(ip) => ip,
                Err(e) => {
                    log::warn!("DNS resolution failed for {}: {}", hostname, e);
                    UNKNOWN.to_string()
                }
            },
            None => {
                log::warn!("Cannot extract hostname from {}", raw.url);
                UNKNOWN.to_string()
            }
        };

        // 5. Identity (optional capability).
        let user_email = self
            .identity
            .as_ref()
            .and_then(|provider| provider.user_email())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        // 6. Referer from the active tab (optional capability).
        let referer = self
            .tabs
            .as_ref()
            .and_then(|tabs| tabs.active_origin())
            .unwrap_or_else(|| NOT_APPLICABLE.to_string());

        // 7. Risk classification. A failed abuse-score lookup counts as 0
        //    so classification never fails the pipeline.
        let abuse_score = if public_ip == UNKNOWN {
            0
        } else {
            match self.lookups.abuse_score(&public_ip).await {
                Ok(score) => score,
                Err(e) => {
                    log::warn!("Abuse-score lookup failed: {}", e);
                    0
                }
            }
        };
        let risk_score = risk::classify(abuse_score, is_tor_or_vpn, &raw.url, &raw.user_agent);

        // 8. Assemble.
        let (search_query, file_name, file_type, file_size, user_file_path) = match &raw.kind {
            RawEventKind::PageVisit { search_query } => (
                Some(
                    search_query
                        .clone()
                        .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
                ),
                None,
                None,
                None,
                None,
            ),
            RawEventKind::FileUpload {
                file_name,
                file_type,
                file_size,
                user_file_path,
            } => (
                None,
                Some(file_name.clone()),
                Some(file_type.clone()),
                Some(file_size.clone()),
                Some(user_file_path.clone()),
            ),
        };

        EnrichedEvent {
            timestamp: raw.timestamp.clone(),
            event_type: raw.event_type().to_string(),
            url: raw.url.clone(),
            public_ip,
            // The backend resolves its own private IP; Transport adopts it
            // from the delivery response.
            private_ip: UNKNOWN.to_string(),
            server_ip,
            geo_location,
            is_tor_or_vpn,
            user_email,
            referer,
            http_method: "GET".to_string(),
            response_status: 200,
            device_type: device_type(&raw.user_agent).to_string(),
            user_agent: raw.user_agent.clone(),
            session_id: self.session_id.clone(),
            risk_score,
            search_query,
            file_name,
            file_type,
            file_size,
            user_file_path,
        }
    }
}

/// Hostname of a URL, if it parses and has one.
fn hostname_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|h| h.to_string()))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{GeoInfo, LookupError, ProxyFlags};
    use crate::risk::RiskLevel;
    use async_trait::async_trait;

    /// Lookups that fail every call.
    struct DownLookups;

    #[async_trait]
    impl Lookups for DownLookups {
        async fn public_ip(&self) -> Result<String, LookupError> {
            Err(LookupError::NetworkError("connection refused".to_string()))
        }
        async fn geolocate(&self, _ip: &str) -> Result<GeoInfo, LookupError> {
            Err(LookupError::NetworkError("connection refused".to_string()))
        }
        async fn proxy_check(&self, _ip: &str) -> Result<ProxyFlags, LookupError> {
            Err(LookupError::NetworkError("connection refused".to_string()))
        }
        async fn resolve_host(&self, _hostname: &str) -> Result<String, LookupError> {
            Err(LookupError::EmptyAnswer)
        }
        async fn abuse_score(&self, _ip: &str) -> Result<u8, LookupError> {
            Err(LookupError::NotConfigured("ABUSEIPDB_API_KEY"))
        }
    }

    /// Lookups with canned successful answers.
    struct CannedLookups {
        abuse_score: u8,
        tor: bool,
    }

    #[async_trait]
    impl Lookups for CannedLookups {
        async fn public_ip(&self) -> Result<String, LookupError> {
            Ok("198.51.100.7".to_string())
        }
        async fn geolocate(&self, ip: &str) -> Result<GeoInfo, LookupError> {
            assert_eq!(ip, "198.51.100.7");
            Ok(GeoInfo {
                city: "Rotterdam".to_string(),
                country: "Netherlands".to_string(),
                lat: 51.92,
                lon: 4.48,
            })
        }
        async fn proxy_check(&self, _ip: &str) -> Result<ProxyFlags, LookupError> {
            Ok(ProxyFlags {
                is_proxy: false,
                is_tor: self.tor,
            })
        }
        async fn resolve_host(&self, hostname: &str) -> Result<String, LookupError> {
            assert_eq!(hostname, "example.com");
            Ok("93.184.216.34".to_string())
        }
        async fn abuse_score(&self, _ip: &str) -> Result<u8, LookupError> {
            Ok(self.abuse_score)
        }
    }

    fn visit(url: &str) -> RawEvent {
        RawEvent::page_visit(url, "TestAgent/1.0", None)
    }

    #[tokio::test]
    async fn every_lookup_failing_degrades_to_sentinels() {
        let enricher = Enricher::new(Box::new(DownLookups), None, None);
        let event = enricher.enrich(&visit("https://example.com/page")).await;

        assert_eq!(event.public_ip, UNKNOWN);
        assert_eq!(event.geo_location, UNKNOWN);
        assert_eq!(event.server_ip, UNKNOWN);
        assert_eq!(event.is_tor_or_vpn, TriState::Unknown);
        assert_eq!(event.user_email, NOT_AVAILABLE);
        assert_eq!(event.referer, NOT_APPLICABLE);
        // Risk computed from score 0 and Unknown tri-state.
        assert_eq!(event.risk_score, RiskLevel::Low);
        assert_eq!(event.search_query.as_deref(), Some("N/A"));
    }

    #[tokio::test]
    async fn successful_lookups_populate_all_fields() {
        let lookups = CannedLookups {
            abuse_score: 65,
            tor: false,
        };
        let enricher = Enricher::new(Box::new(lookups), None, None);
        let event = enricher.enrich(&visit("https://example.com/page")).await;

        assert_eq!(event.public_ip, "198.51.100.7");
        assert_eq!(event.geo_location, "Rotterdam, Netherlands (51.92, 4.48)");
        assert_eq!(event.server_ip, "93.184.216.34");
        assert_eq!(event.is_tor_or_vpn, TriState::No);
        assert_eq!(event.risk_score, RiskLevel::High);
        assert_eq!(event.event_type, "Visit");
        assert_eq!(event.device_type, "Desktop");
    }

    #[tokio::test]
    async fn tor_flag_maps_to_yes_and_raises_risk() {
        let lookups = CannedLookups {
            abuse_score: 0,
            tor: true,
        };
        let enricher = Enricher::new(Box::new(lookups), None, None);
        let event = enricher.enrich(&visit("https://example.com/page")).await;

        assert_eq!(event.is_tor_or_vpn, TriState::Yes);
        assert_eq!(event.risk_score, RiskLevel::High);
    }

    #[tokio::test]
    async fn identity_and_tab_capabilities_are_injected() {
        struct FixedTab;
        impl crate::capabilities::TabContext for FixedTab {
            fn active_origin(&self) -> Option<String> {
                Some("https://referrer.example".to_string())
            }
        }

        let enricher = Enricher::new(
            Box::new(CannedLookups {
                abuse_score: 0,
                tor: false,
            }),
            Some(Box::new(crate::capabilities::StaticIdentity::new(
                "user@example.com".to_string(),
            ))),
            Some(Box::new(FixedTab)),
        );
        let event = enricher.enrich(&visit("https://example.com/page")).await;

        assert_eq!(event.user_email, "user@example.com");
        assert_eq!(event.referer, "https://referrer.example");
    }

    #[tokio::test]
    async fn enrich_is_idempotent_modulo_session_and_timestamp() {
        let raw = visit("https://example.com/page");
        let enricher = Enricher::new(
            Box::new(CannedLookups {
                abuse_score: 20,
                tor: false,
            }),
            None,
            None,
        );

        let first = enricher.enrich(&raw).await;
        let second = enricher.enrich(&raw).await;
        // Same raw event, same enricher: identical output including the
        // per-context session id.
        assert_eq!(first, second);

        let other_context = Enricher::new(
            Box::new(CannedLookups {
                abuse_score: 20,
                tor: false,
            }),
            None,
            None,
        );
        let third = other_context.enrich(&raw).await;
        assert_ne!(first.session_id, third.session_id);
        let mut third_aligned = third.clone();
        third_aligned.session_id = first.session_id.clone();
        assert_eq!(first, third_aligned);
    }

    #[tokio::test]
    async fn upload_events_carry_file_metadata() {
        let raw = RawEvent::file_upload(
            "https://example.com/upload",
            "TestAgent/1.0",
            "report.pdf".to_string(),
            "application/pdf".to_string(),
            "2.00 KB".to_string(),
            "Uploaded from this device".to_string(),
        );
        let enricher = Enricher::new(
            Box::new(CannedLookups {
                abuse_score: 0,
                tor: false,
            }),
            None,
            None,
        );
        let event = enricher.enrich(&raw).await;

        assert_eq!(event.event_type, "File Upload");
        assert_eq!(event.file_name.as_deref(), Some("report.pdf"));
        assert_eq!(event.file_type.as_deref(), Some("application/pdf"));
        assert_eq!(event.file_size.as_deref(), Some("2.00 KB"));
        assert!(event.search_query.is_none());
    }
}
