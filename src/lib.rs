//! Hiring handshake: a one-shot startup client for a hiring API.
//!
//! Generates a webhook, captures the returned callback URL and token,
//! waits for the token, and submits a final query with it.

pub mod config;
pub mod context;
pub mod generate;
pub mod shutdown;
pub mod submit;
pub mod webhook;
