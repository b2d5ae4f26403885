//! File-upload handler

use axum::extract::{Multipart, State};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use std::path::Path;

use crate::error::{AppError, AppResult};
use crate::models::{EventType, FileDetails, LogRecord, UploadFileResponse, UNKNOWN};
use crate::state::AppState;

/// Store an uploaded file and log the upload.
///
/// Expects a multipart body with a `file` part (required) and optional
/// `userEmail` / `userFilePath` text parts. The blob is stored as
/// `{unix_millis}-{original_name}` under the uploads directory.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadFileResponse>> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut user_email = None;
    let mut user_file_path = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(e.to_string()))?
    {
        let name = field.name().map(|name| name.to_string());
        match name.as_deref() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| UNKNOWN.to_string());
                let content_type = field
                    .content_type()
                    .map(|mime| mime.to_string())
                    .unwrap_or_else(|| UNKNOWN.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::ValidationError(e.to_string()))?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            Some("userEmail") => {
                user_email = field.text().await.ok();
            }
            Some("userFilePath") => {
                user_file_path = field.text().await.ok();
            }
            _ => {}
        }
    }

    let Some((original_name, content_type, bytes)) = file else {
        return Err(AppError::ValidationError("No file uploaded".to_string()));
    };

    let stored_name = format!("{}-{}", Utc::now().timestamp_millis(), original_name);
    let stored_path = Path::new(&state.config.upload_dir).join(&stored_name);
    tokio::fs::write(&stored_path, &bytes).await?;

    let server_file_path = format!("{}/{}", state.config.upload_dir, stored_name);
    let file_size = format_file_size(bytes.len() as u64);

    let record = LogRecord {
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        event_type: EventType::FileUpload,
        url: UNKNOWN.to_string(),
        http_method: "POST".to_string(),
        response_status: 200,
        referer: UNKNOWN.to_string(),
        public_ip: UNKNOWN.to_string(),
        private_ip: UNKNOWN.to_string(),
        server_ip: UNKNOWN.to_string(),
        geo_location: UNKNOWN.to_string(),
        is_tor_or_vpn: UNKNOWN.to_string(),
        search_query: "N/A".to_string(),
        user_email: user_email.unwrap_or_else(|| UNKNOWN.to_string()),
        user_agent: UNKNOWN.to_string(),
        browser: UNKNOWN.to_string(),
        os_info: UNKNOWN.to_string(),
        device: UNKNOWN.to_string(),
        device_type: UNKNOWN.to_string(),
        session_id: UNKNOWN.to_string(),
        risk_score: UNKNOWN.to_string(),
        file: Some(FileDetails {
            file_name: original_name,
            file_type: content_type,
            file_size,
            user_file_path: user_file_path
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
        }),
        server_file_path: Some(server_file_path.clone()),
    };

    state.store.append(&record).await?;
    tracing::info!("Upload log saved: {}", server_file_path);

    Ok(Json(UploadFileResponse {
        message: "File uploaded successfully".to_string(),
        server_file_path,
        user_file_path: user_file_path.unwrap_or_else(|| UNKNOWN.to_string()),
    }))
}

/// Format a byte count as B / KB / MB / GB with two decimals (same scheme
/// the capture side uses).
fn format_file_size(size_in_bytes: u64) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sizes_match_agent_formatting() {
        assert_eq!(format_file_size(100), "100 B");
        assert_eq!(format_file_size(1536), "1.50 KB");
    }
}
