//! ipwatch: public IP change monitor
//!
//! A library for periodically probing the public IP address, recording every
//! change in an append-only history, and notifying subscribers by email and
//! Telegram when it changes.

pub mod api;
pub mod config;
pub mod detect;
pub mod history;
pub mod notify;
pub mod probe;
pub mod scheduler;
pub mod time;
pub mod transport;
