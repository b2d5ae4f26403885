//! Risk Classifier
//!
//! Only contains classification logic - deterministic, no side effects.
//! Input: abuse confidence score, Tor/VPN tri-state, URL, user-agent.
//! Output: ordinal RiskLevel.
//!
//! Escalation-only: every rule may raise the label, never lower it. Each
//! rule merges with `label = max(label, rule_result)` under the enum order.

use serde::{Deserialize, Serialize};

use crate::events::TriState;

// ============================================================================
// RULES & THRESHOLDS
// ============================================================================

/// Abuse confidence score above this = Critical.
pub const CRITICAL_SCORE_THRESHOLD: u8 = 90;

/// Abuse confidence score above this = High.
pub const HIGH_SCORE_THRESHOLD: u8 = 60;

/// Abuse confidence score above this = Medium.
pub const MEDIUM_SCORE_THRESHOLD: u8 = 30;

/// URL terms that mark a page as suspicious (matched case-insensitively).
pub const SUSPICIOUS_TERMS: [&str; 6] = [
    "hacking",
    "phishing",
    "malware",
    "carding",
    "exploit",
    "sql injection",
];

/// User-agent substrings of known legacy/insecure browsers.
pub const LEGACY_BROWSER_MARKERS: [&str; 2] = ["Chrome/49", "MSIE"];

// ============================================================================
// RISK LEVEL
// ============================================================================

/// Ordinal risk label. Ordering matters: later variants are strictly worse.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum RiskLevel {
    Low,
    #[serde(rename = "Medium-Low")]
    MediumLow,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::MediumLow => "Medium-Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }

    pub fn severity_level(&self) -> u8 {
        match self {
            RiskLevel::Low => 0,
            RiskLevel::MediumLow => 1,
            RiskLevel::Medium => 2,
            RiskLevel::High => 3,
            RiskLevel::Critical => 4,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Classify an event into an ordinal risk label.
///
/// `abuse_score` is the AbuseIPDB confidence score (0-100); callers absorb a
/// failed lookup as 0 so classification never fails the pipeline.
pub fn classify(abuse_score: u8, tor_or_vpn: TriState, url: &str, user_agent: &str) -> RiskLevel {
    let mut label = RiskLevel::Low;

    // Tor/VPN users often bypass security controls.
    if tor_or_vpn == TriState::Yes {
        label = label.max(RiskLevel::High);
    }

    // Abuse-score thresholds, independent of the Tor/VPN rule.
    if abuse_score > CRITICAL_SCORE_THRESHOLD {
        label = label.max(RiskLevel::Critical);
    } else if abuse_score > HIGH_SCORE_THRESHOLD {
        label = label.max(RiskLevel::High);
    } else if abuse_score > MEDIUM_SCORE_THRESHOLD {
        label = label.max(RiskLevel::Medium);
    }

    if url_is_suspicious(url) {
        label = label.max(keyword_escalation(label));
    }

    if is_legacy_browser(user_agent) {
        label = label.max(keyword_escalation(label));
    }

    label
}

/// Escalation for the keyword/legacy-browser rules: Low goes to Medium-Low,
/// anything else to Medium. Caps at Medium on its own.
fn keyword_escalation(current: RiskLevel) -> RiskLevel {
    if current == RiskLevel::Low {
        RiskLevel::MediumLow
    } else {
        RiskLevel::Medium
    }
}

/// Does the URL contain any suspicious term (case-insensitive)?
pub fn url_is_suspicious(url: &str) -> bool {
    let lower = url.to_lowercase();
    SUSPICIOUS_TERMS.iter().any(|term| lower.contains(term))
}

/// Does the user-agent indicate a known legacy/insecure browser?
pub fn is_legacy_browser(user_agent: &str) -> bool {
    LEGACY_BROWSER_MARKERS
        .iter()
        .any(|marker| user_agent.contains(marker))
}

// ============================================================================
// TESTS
// ============================================================================
