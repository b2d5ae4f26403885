//! Event Capture
//!
//! Derives raw events from navigation and file-input activity: pulls a
//! search query out of the visited URL, formats file metadata, and
//! suppresses duplicate navigations to the same URL.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::events::RawEvent;

// ============================================================================
// SEARCH QUERY DERIVATION
// ============================================================================

/// Query parameter names that carry a search query on common sites
/// ('k' for Amazon, 'p' for Yahoo, etc.). Substring match on the name.
static SEARCH_PARAM_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(search|query|q|keyword|term|k|p)").unwrap());

/// Path segments that indicate a search/results page.
static SEARCH_PATH_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(search|query|results|find)").unwrap());

/// Derive the most relevant search query from a URL, if any.
///
/// Query parameters are scanned in order and the first one whose name looks
/// search-like wins. When no parameter matches, path segments are scanned as
/// a fallback (for sites that put the query in the path); the last matching
/// segment wins.
pub fn derive_search_query(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;

    for (name, value) in parsed.query_pairs() {
        if SEARCH_PARAM_NAME.is_match(&name) {
            return Some(value.replace('+', " "));
        }
    }

    let mut from_path = None;
    if let Some(segments) = parsed.path_segments() {
        for segment in segments.filter(|s| !s.is_empty()) {
            if SEARCH_PATH_SEGMENT.is_match(segment) {
                from_path = Some(segment.replace('+', " "));
            }
        }
    }

    from_path
}

// ============================================================================
// FILE METADATA
// ============================================================================

/// Format a byte count as B / KB / MB / GB with two decimals.
pub fn format_file_size(size_in_bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    const GB: f64 = 1024.0 * 1024.0 * 1024.0;

    let size = size_in_bytes as f64;
    if size < KB {
        format!("{} B", size_in_bytes)
    } else if size < MB {
        format!("{:.2} KB", size / KB)
    } else if size < GB {
        format!("{:.2} MB", size / MB)
    } else {
        format!("{:.2} GB", size / GB)
    }
}

/// Default recorded file path when the page gives no real one.
pub const DEFAULT_USER_FILE_PATH: &str = "Uploaded from this device";

/// Build a file-upload event from observed input metadata.
pub fn file_upload_event(
    url: &str,
    user_agent: &str,
    file_name: &str,
    file_type: Option<&str>,
    size_in_bytes: u64,
    user_file_path: Option<&str>,
) -> RawEvent {
    RawEvent::file_upload(
        url,
        user_agent,
        file_name.to_string(),
        file_type.unwrap_or("Unknown").to_string(),
        format_file_size(size_in_bytes),
        user_file_path.unwrap_or(DEFAULT_USER_FILE_PATH).to_string(),
    )
}

// ============================================================================
// NAVIGATION WATCHER
// ============================================================================

/// Tracks the last seen URL and raises a visit event only when it changes,
/// so mutation-driven re-renders of the same page produce one event.
#[derive(Debug, Default)]
pub struct PageWatcher {
    last_url: Option<String>,
    user_agent: String,
}

impl PageWatcher {
    pub fn new(user_agent: &str) -> Self {
        Self {
            last_url: None,
            user_agent: user_agent.to_string(),
        }
    }

    /// Observe a navigation. Returns a raw event for new URLs, `None` when
    /// the URL is unchanged.
    pub fn on_navigation(&mut self, url: &str) -> Option<RawEvent> {
        if self.last_url.as_deref() == Some(url) {
            return None;
        }
        self.last_url = Some(url.to_string());

        let search_query = derive_search_query(url);
        log::debug!("Logging visit: {} (query: {:?})", url, search_query);
        Some(RawEvent::page_visit(url, &self.user_agent, search_query))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RawEventKind;

    #[test]
    fn derives_query_from_q_param() {
        assert_eq!(
            derive_search_query("https://www.google.com/search?q=rust+borrow+checker"),
            Some("rust borrow checker".to_string())
        );
    }

    #[test]
    fn derives_query_from_amazon_k_param() {
        assert_eq!(
            derive_search_query("https://www.amazon.com/s?k=mechanical+keyboard"),
            Some("mechanical keyboard".to_string())
        );
    }

    #[test]
    fn first_matching_param_wins() {
        assert_eq!(
            derive_search_query("https://example.com/?query=first&q=second"),
            Some("first".to_string())
        );
    }

    #[test]
    fn percent_encoding_is_decoded() {
        assert_eq!(
            derive_search_query("https://example.com/?q=caf%C3%A9%20au%20lait"),
            Some("café au lait".to_string())
        );
    }

    #[test]
    fn falls_back_to_path_segments() {
        assert_eq!(
            derive_search_query("https://example.com/results/video"),
            Some("results".to_string())
        );
        // Last matching segment wins.
        assert_eq!(
            derive_search_query("https://example.com/search/results"),
            Some("results".to_string())
        );
    }

    #[test]
    fn plain_url_has_no_query() {
        assert_eq!(derive_search_query("https://example.com/about"), None);
        assert_eq!(derive_search_query("not a url"), None);
    }

    #[test]
    fn file_sizes_format_per_magnitude() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(2048), "2.00 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024 + 256 * 1024), "5.25 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn upload_event_defaults() {
        let event = file_upload_event(
            "https://example.com/upload",
            "TestAgent/1.0",
            "report.pdf",
            None,
            2048,
            None,
        );
        match event.kind {
            RawEventKind::FileUpload {
                file_name,
                file_type,
                file_size,
                user_file_path,
            } => {
                assert_eq!(file_name, "report.pdf");
                assert_eq!(file_type, "Unknown");
                assert_eq!(file_size, "2.00 KB");
                assert_eq!(user_file_path, DEFAULT_USER_FILE_PATH);
            }
            other => panic!("expected FileUpload, got {other:?}"),
        }
    }

    #[test]
    fn watcher_suppresses_repeated_urls() {
        let mut watcher = PageWatcher::new("TestAgent/1.0");
        assert!(watcher.on_navigation("https://example.com/a").is_some());
        assert!(watcher.on_navigation("https://example.com/a").is_none());
        assert!(watcher.on_navigation("https://example.com/b").is_some());
        // Navigating back counts as a new visit.
        assert!(watcher.on_navigation("https://example.com/a").is_some());
    }
}
