//! Visit-log handlers

use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};

use crate::error::{AppError, AppResult};
use crate::models::{EventType, LogRecord, LogVisitRequest, LogVisitResponse, UNKNOWN};
use crate::state::AppState;
use crate::{net, ua};

/// Record a visit or file-upload event submitted by an agent.
///
/// `url`, `publicIp` and `userAgent` are required; everything else degrades
/// to its sentinel. The server stamps its own private IP and the
/// user-agent-derived browser/OS/device fields.
pub async fn log_visit(
    State(state): State<AppState>,
    Json(request): Json<LogVisitRequest>,
) -> AppResult<Json<LogVisitResponse>> {
    if request.url.is_empty() || request.public_ip.is_empty() || request.user_agent.is_empty() {
        return Err(AppError::ValidationError("Invalid request data".to_string()));
    }

    let private_ip = net::private_ip();

    let record = LogRecord {
        timestamp: request
            .timestamp
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        event_type: request.event_type.unwrap_or(EventType::Visit),
        url: request.url,
        http_method: request.http_method.unwrap_or_else(|| "GET".to_string()),
        response_status: request.response_status.unwrap_or(200),
        referer: request.referer.unwrap_or_else(|| UNKNOWN.to_string()),
        public_ip: request.public_ip,
        private_ip: private_ip.clone(),
        server_ip: request.server_ip.unwrap_or_else(|| UNKNOWN.to_string()),
        geo_location: request.geo_location.unwrap_or_else(|| UNKNOWN.to_string()),
        is_tor_or_vpn: request.is_tor_or_vpn.unwrap_or_else(|| UNKNOWN.to_string()),
        search_query: request.search_query.unwrap_or_else(|| "N/A".to_string()),
        user_email: request.user_email.unwrap_or_else(|| UNKNOWN.to_string()),
        browser: ua::browser(&request.user_agent),
        os_info: ua::os_info(&request.user_agent),
        device: ua::device(&request.user_agent),
        device_type: request
            .device_type
            .unwrap_or_else(|| ua::device_type(&request.user_agent)),
        user_agent: request.user_agent,
        session_id: request.session_id.unwrap_or_else(|| UNKNOWN.to_string()),
        risk_score: request.risk_score.unwrap_or_else(|| UNKNOWN.to_string()),
        file: request.file,
        server_file_path: None,
    };

    state.store.append(&record).await?;
    tracing::info!("Log saved: {} ({})", record.url, record.risk_score);

    Ok(Json(LogVisitResponse {
        message: "Log saved".to_string(),
        private_ip,
    }))
}

/// Return the full ordered log.
pub async fn get_logs(State(state): State<AppState>) -> AppResult<Json<Vec<LogRecord>>> {
    let records = state.store.read_all().await?;
    Ok(Json(records))
}
