//! Private IP discovery.

use std::net::UdpSocket;

use crate::models::UNKNOWN;

/// LAN address of this host, or "Unknown".
///
/// Binds a UDP socket and "connects" it to a public address; no packet is
/// sent, but the OS picks the outbound interface whose address we report.
pub fn private_ip() -> String {
    let result = UdpSocket::bind("0.0.0.0:0")
        .and_then(|socket| {
            socket.connect("8.8.8.8:80")?;
            socket.local_addr()
        })
        .map(|addr| addr.ip().to_string());

    match result {
        Ok(ip) => ip,
        Err(e) => {
            tracing::warn!("Cannot determine private IP: {}", e);
            UNKNOWN.to_string()
        }
    }
}
