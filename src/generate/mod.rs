//! Webhook generation: the first startup step.
//!
//! This module provides:
//! - The generation payload and settings ([`GenerationRequest`], [`GenerateSettings`])
//! - The step itself ([`WebhookGenerator`])
//! - Pure extraction helpers for the untyped response ([`extract_webhook_url`], [`extract_token`])

mod extract;
mod generator;


pub use extract::{extract_token, extract_webhook_url};
pub use generator::{GenerateSettings, GenerationRequest, WebhookGenerator};

use thiserror::Error;

use crate::webhook::HttpError;

/// Why a generation call produced no usable response.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The request never got a response.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The endpoint answered with a non-2xx status.
    #[error("Generation endpoint returned {status}: {body}")]
    Status {
        /// Status code received
        status: http::StatusCode,
        /// Response body, lossily decoded
        body: String,
    },

    /// The response body was not valid JSON.
    #[error("Failed to decode generation response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The response body was JSON but not an object.
    #[error("Generation response is not a JSON object")]
    NotAnObject,

    /// The request payload could not be serialized.
    #[error("Failed to encode generation request: {0}")]
    Encode(#[source] serde_json::Error),
}

/// What the generation step did.
///
/// Only [`Stored`](Self::Stored) writes to the context.
#[derive(Debug)]
pub enum GenerationOutcome {
    /// Generation is turned off; no call was made.
    Disabled,

    /// A non-empty response was stored.
    Stored {
        /// Whether a callback URL was found
        has_url: bool,
        /// Whether a token was found
        has_token: bool,
    },

    /// The call succeeded but returned an empty object.
    Empty,

    /// Shutdown arrived before the call finished; nothing was stored.
    Cancelled,

    /// The call failed; nothing was stored.
    Failed(GenerateError),
}

impl GenerationOutcome {
    /// Returns `true` if a value was written to the context.
    #[must_use]
    pub const fn is_stored(&self) -> bool {
        matches!(self, Self::Stored { .. })
    }
}
