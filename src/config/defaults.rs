//! Default values for configuration options.
//!
//! Centralized constants to avoid magic values scattered across the codebase.

use std::time::Duration;

/// Default generation endpoint.
pub const GENERATE_URL: &str = "https://bfhldevapigw.healthrx.co.in/hiring/generateWebhook/JAVA";

/// Default submission endpoint, used when generation yields no callback URL.
pub const SUBMIT_URL: &str = "https://bfhldevapigw.healthrx.co.in/hiring/testWebhook/JAVA";

/// Default candidate name.
pub const NAME: &str = "John Doe";

/// Default registration number.
pub const REG_NO: &str = "REG12347";

/// Default contact e-mail.
pub const EMAIL: &str = "john@example.com";

/// Default delay before submission, in milliseconds.
pub const SUBMIT_DELAY_MS: u64 = 0;

/// Default token wait timeout, in milliseconds.
pub const TOKEN_TIMEOUT_MS: u64 = 10_000;

/// Default token poll interval, in milliseconds.
pub const TOKEN_POLL_MS: u64 = 300;

/// Default token wait timeout as Duration.
#[must_use]
pub const fn token_timeout() -> Duration {
    Duration::from_millis(TOKEN_TIMEOUT_MS)
}

/// Default token poll interval as Duration.
#[must_use]
pub const fn token_poll_interval() -> Duration {
    Duration::from_millis(TOKEN_POLL_MS)
}
