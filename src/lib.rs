//! Query composition and result projection core for the APM analytics console.
//!
//! Telemetry (page loads, network calls, errors, sessions, web vitals) lives in a
//! document store partitioned by time. This crate turns optional request filters
//! into one conjunctive filter query over the right partitions, then translates
//! and masks the returned documents before they reach a client.
//!
//! ```text
//! request ──► search::condition ──► search::composer ──► BoolQuery ─┐
//!                                   search::index ──► [indices] ────┤
//!                                                                   ▼
//!                                                      DocumentStore (external)
//!                                                                   │
//!          response ◄── analytics ◄── projection ◄──────────────────┘
//! ```

pub mod analytics;
pub mod cache;
pub mod clock;
pub mod components;
pub mod config;
pub mod error;
pub mod metrics;
pub mod projection;
pub mod search;
pub mod service;
pub mod symbolize;

pub use components::Components;
pub use error::{AppError, Result};
