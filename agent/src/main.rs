//! Webtrail Agent binary
//!
//! Headless stand-in for the browser capture layer: reads a line-oriented
//! event feed on stdin and runs each event through the enrichment pipeline.
//!
//! Feed format, one event per line:
//!
//! ```text
//! visit <url>
//! upload <url> <file-path>
//! ```

use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

use webtrail_agent::capabilities::{IdentityProvider, StaticIdentity};
use webtrail_agent::capture::{self, PageWatcher};
use webtrail_agent::config::AgentConfig;
use webtrail_agent::events::RawEvent;
use webtrail_agent::lookup::HttpLookups;
use webtrail_agent::mirror::Mirror;
use webtrail_agent::pipeline::Enricher;
use webtrail_agent::transport::Transport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    dotenvy::dotenv().ok();

    let config = AgentConfig::from_env();
    log::info!("Webtrail agent starting, backend: {}", config.backend_url);

    let lookups = HttpLookups::new(&config)?;
    let identity = config
        .user_email
        .clone()
        .map(|email| Box::new(StaticIdentity::new(email)) as Box<dyn IdentityProvider>);

    // No tab context in a headless run; the referer degrades to "N/A".
    let enricher = Enricher::new(Box::new(lookups), identity, None);
    log::info!("Session: {}", enricher.session_id());

    let mirror = Mirror::open(Path::new(&config.mirror_file))?;
    let mut transport = Transport::new(&config.backend_url, config.lookup_timeout_secs, mirror)?;

    let mut watcher = PageWatcher::new(&config.user_agent);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let Some(raw) = parse_feed_line(&line, &mut watcher, &config).await else {
            continue;
        };

        let event = enricher.enrich(&raw).await;
        let result = transport.deliver(event).await;
        if !result.ok {
            log::warn!("Delivery failed for {}", raw.url);
        }
    }

    Ok(())
}

/// Parse one feed line into a raw event, if it yields one.
async fn parse_feed_line(
    line: &str,
    watcher: &mut PageWatcher,
    config: &AgentConfig,
) -> Option<RawEvent> {
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some("visit") => {
            let url = parts.next()?;
            watcher.on_navigation(url)
        }
        Some("upload") => {
            let url = parts.next()?;
            let file_path = parts.next()?;
            file_event(url, file_path, config).await
        }
        Some(other) => {
            log::warn!("Ignoring unknown feed entry: {}", other);
            None
        }
        None => None,
    }
}

/// Build a file-upload event from a file on disk.
async fn file_event(url: &str, file_path: &str, config: &AgentConfig) -> Option<RawEvent> {
    let path = Path::new(file_path);
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) => {
            log::warn!("Cannot stat {}: {}", file_path, e);
            return None;
        }
    };

    let file_name = path.file_name()?.to_string_lossy();
    log::debug!("File upload detected: {} ({} bytes)", file_name, metadata.len());

    Some(capture::file_upload_event(
        url,
        &config.user_agent,
        &file_name,
        mime_for_extension(path),
        metadata.len(),
        Some(file_path),
    ))
}

/// Best-effort MIME type from the file extension.
fn mime_for_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let mime = match ext.as_str() {
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "zip" => "application/zip",
        "json" => "application/json",
        "csv" => "text/csv",
        "doc" | "docx" => "application/msword",
        _ => return None,
    };
    Some(mime)
}
