//! Services Layer
//!
//! Query logic and text rendering shared between the HTTP API, the chat
//! command handlers and the notification scheduler.
//!
//! # Architecture
//!
//! ```text
//! Telegram commands ──┐
//! Notifier ───────────┼──> Services --> RateStore
//! HTTP API ───────────┘
//! ```
//!
//! # Services
//!
//! - `RatesService` - Get one or all rates, HTTP text bodies
//! - `presentation` - Record, one-line and detailed rate formats

pub mod presentation;
pub mod rates_service;

pub use rates_service::RatesService;
