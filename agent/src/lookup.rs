//! External Lookup Clients
//!
//! HTTP clients for the enrichment lookups: public IP, geolocation,
//! proxy/Tor detection, DNS-over-HTTPS resolution and abuse score. Each
//! call is bounded by the configured timeout and returns a `LookupError`
//! the pipeline absorbs into a sentinel.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::AgentConfig;

// ============================================================================
// SERVICE ENDPOINTS
// ============================================================================

const IPIFY_URL: &str = "https://api64.ipify.org";
const IP_API_URL: &str = "http://ip-api.com/json";
const IPQS_URL: &str = "https://ipqualityscore.com/api/json/ip";
const DNS_GOOGLE_URL: &str = "https://dns.google/resolve";
const ABUSEIPDB_URL: &str = "https://api.abuseipdb.com/api/v2/check";

// ============================================================================
// LOOKUP SEAM
// ============================================================================

/// Proxy/Tor flag pair reported by the IP quality service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyFlags {
    pub is_proxy: bool,
    pub is_tor: bool,
}

/// Resolved geolocation of an IP.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoInfo {
    pub city: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl GeoInfo {
    /// Human-readable form stored in the log.
    pub fn display(&self) -> String {
        format!("{}, {} ({}, {})", self.city, self.country, self.lat, self.lon)
    }
}

/// The external lookups the enrichment pipeline depends on. A trait so
/// tests can substitute canned responses for the network.
#[async_trait]
pub trait Lookups: Send + Sync {
    /// Public IP of this machine.
    async fn public_ip(&self) -> Result<String, LookupError>;

    /// Geolocation of an IP.
    async fn geolocate(&self, ip: &str) -> Result<GeoInfo, LookupError>;

    /// Proxy/Tor status of an IP.
    async fn proxy_check(&self, ip: &str) -> Result<ProxyFlags, LookupError>;

    /// First A record for a hostname.
    async fn resolve_host(&self, hostname: &str) -> Result<String, LookupError>;

    /// AbuseIPDB confidence score (0-100) for an IP.
    async fn abuse_score(&self, ip: &str) -> Result<u8, LookupError>;
}

// ============================================================================
// HTTP CLIENT
// ============================================================================

/// Production `Lookups` implementation over the public services.
pub struct HttpLookups {
    http_client: reqwest::Client,
    ipqs_api_key: Option<String>,
    abuseipdb_api_key: Option<String>,
}

// Response shapes of the external services, private to this module.

#[derive(Debug, Deserialize)]
struct IpifyResponse {
    ip: String,
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    status: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct IpqsResponse {
    #[serde(default)]
    proxy: bool,
    #[serde(default)]
    tor: bool,
}

#[derive(Debug, Deserialize)]
struct DnsResponse {
    #[serde(rename = "Answer", default)]
    answer: Vec<DnsAnswer>,
}

#[derive(Debug, Deserialize)]
struct DnsAnswer {
    data: String,
}

#[derive(Debug, Deserialize)]
struct AbuseResponse {
    data: AbuseData,
}

#[derive(Debug, Deserialize)]
struct AbuseData {
    #[serde(rename = "abuseConfidenceScore", default)]
    abuse_confidence_score: u8,
}

impl HttpLookups {
    pub fn new(config: &AgentConfig) -> Result<Self, LookupError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.lookup_timeout_secs))
            .build()
            .map_err(|e| LookupError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            ipqs_api_key: config.ipqs_api_key.clone(),
            abuseipdb_api_key: config.abuseipdb_api_key.clone(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, LookupError> {
        let response = request
            .send()
            .await
            .map_err(|e| LookupError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LookupError::ServiceError(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| LookupError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl Lookups for HttpLookups {
    async fn public_ip(&self) -> Result<String, LookupError> {
        let url = format!("{}?format=json", IPIFY_URL);
        let body: IpifyResponse = self.get_json(self.http_client.get(&url)).await?;
        Ok(body.ip)
    }

    async fn geolocate(&self, ip: &str) -> Result<GeoInfo, LookupError> {
        let url = format!("{}/{}", IP_API_URL, ip);
        let body: GeoResponse = self.get_json(self.http_client.get(&url)).await?;

        if body.status != "success" {
            return Err(LookupError::ParseError(format!(
                "geolocation status: {}",
                body.status
            )));
        }

        Ok(GeoInfo {
            city: body.city,
            country: body.country,
            lat: body.lat,
            lon: body.lon,
        })
    }

    async fn proxy_check(&self, ip: &str) -> Result<ProxyFlags, LookupError> {
        let api_key = self
            .ipqs_api_key
            .as_ref()
            .ok_or(LookupError::NotConfigured("IPQS_API_KEY"))?;

        let url = format!("{}/{}/{}", IPQS_URL, api_key, ip);
        let body: IpqsResponse = self.get_json(self.http_client.get(&url)).await?;

        Ok(ProxyFlags {
            is_proxy: body.proxy,
            is_tor: body.tor,
        })
    }

    async fn resolve_host(&self, hostname: &str) -> Result<String, LookupError> {
        let url = format!("{}?name={}&type=A", DNS_GOOGLE_URL, hostname);
        let body: DnsResponse = self.get_json(self.http_client.get(&url)).await?;

        body.answer
            .into_iter()
            .next()
            .map(|a| a.data)
            .ok_or(LookupError::EmptyAnswer)
    }

    async fn abuse_score(&self, ip: &str) -> Result<u8, LookupError> {
        let api_key = self
            .abuseipdb_api_key
            .as_ref()
            .ok_or(LookupError::NotConfigured("ABUSEIPDB_API_KEY"))?;

        let url = format!("{}?ipAddress={}", ABUSEIPDB_URL, ip);
        let request = self
            .http_client
            .get(&url)
            .header("Key", api_key)
            .header("Accept", "application/json");

        let body: AbuseResponse = self.get_json(request).await?;
        Ok(body.data.abuse_confidence_score)
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Lookup failures. Always absorbed by the pipeline, never propagated.
#[derive(Debug, Clone)]
pub enum LookupError {
    NetworkError(String),
    ServiceError(u16),
    ParseError(String),
    /// A DNS query that succeeded but returned no records.
    EmptyAnswer,
    /// The lookup needs an API key that was not configured.
    NotConfigured(&'static str),
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError(e) => write!(f, "Network error: {}", e),
            Self::ServiceError(code) => write!(f, "Service error: {}", code),
            Self::ParseError(e) => write!(f, "Parse error: {}", e),
            Self::EmptyAnswer => write!(f, "Empty DNS answer"),
            Self::NotConfigured(key) => write!(f, "{} not configured", key),
        }
    }
}

impl std::error::Error for LookupError {}
