//! Webtrail Agent
//!
//! Capture -> enrichment -> transport pipeline for browsing activity.
//! Raw events are enriched with network/identity lookups and a heuristic
//! risk score, delivered to the log-storage backend, and mirrored locally.

pub mod capabilities;
pub mod capture;
pub mod config;
pub mod events;
pub mod lookup;
pub mod mirror;
pub mod pipeline;
pub mod risk;
pub mod transport;
