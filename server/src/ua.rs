//! User-Agent Parsing
//!
//! Derives browser family + major version, OS and device family from a raw
//! user-agent string for the stored log record. Heuristic, not exhaustive.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::UNKNOWN;

// Order matters: Edge advertises Chrome, Chrome advertises Safari.
static BROWSER_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        ("Edge", Regex::new(r"Edge?/(\d+)").unwrap()),
        ("Opera", Regex::new(r"OPR/(\d+)").unwrap()),
        ("Firefox", Regex::new(r"Firefox/(\d+)").unwrap()),
        ("IE", Regex::new(r"MSIE (\d+)").unwrap()),
        ("Chrome", Regex::new(r"Chrome/(\d+)").unwrap()),
        ("Safari", Regex::new(r"Version/(\d+).*Safari").unwrap()),
    ]
});

/// Browser family and major version, e.g. "Chrome 122".
pub fn browser(user_agent: &str) -> String {
    for (family, pattern) in BROWSER_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(user_agent) {
            return format!("{} {}", family, &captures[1]);
        }
    }
    UNKNOWN.to_string()
}

/// Operating system family.
pub fn os_info(user_agent: &str) -> String {
    let os = if user_agent.contains("Windows NT 10") {
        "Windows 10"
    } else if user_agent.contains("Windows") {
        "Windows"
    } else if user_agent.contains("Android") {
        "Android"
    } else if user_agent.contains("iPhone OS") || user_agent.contains("iOS") {
        "iOS"
    } else if user_agent.contains("Mac OS X") {
        "macOS"
    } else if user_agent.contains("Linux") {
        "Linux"
    } else {
        UNKNOWN
    };
    os.to_string()
}

/// Device family ("iPhone", "Android", "Other").
pub fn device(user_agent: &str) -> String {
    let device = if user_agent.contains("iPhone") {
        "iPhone"
    } else if user_agent.contains("iPad") {
        "iPad"
    } else if user_agent.contains("Android") {
        "Android"
    } else {
        "Other"
    };
    device.to_string()
}

/// Mobile/Desktop split, matching the agent-side heuristic.
pub fn device_type(user_agent: &str) -> String {
    if user_agent.contains("Mobi") || user_agent.contains("Android") {
        "Mobile".to_string()
    } else {
        "Desktop".to_string()
    }
}
