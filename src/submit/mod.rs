//! Final query submission: the token gate and the retrying pipeline.
//!
//! This module provides:
//! - A polling wait for the token ([`TokenGate`], [`WaitOutcome`])
//! - The submission pipeline ([`SolutionSubmitter`], [`SubmitSettings`])
//! - Per-attempt and overall results ([`AttemptOutcome`], [`SubmissionOutcome`])
//!
//! # Retry
//!
//! The first attempt sends the raw token as the `Authorization` value. Only a
//! 401 response triggers a second attempt, which uses `Bearer <token>`. There
//! is never a third attempt, and no other status or transport error is retried.

mod gate;
mod submitter;


pub use gate::{TokenGate, WaitOutcome};
pub use submitter::{AuthScheme, SolutionSubmitter, SubmissionPayload, SubmitSettings};

use thiserror::Error;
use url::Url;

use crate::webhook::HttpError;

/// Why a submission attempt did not get a 2xx or 401 answer.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// The request never got a response.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The endpoint answered with an error status other than 401.
    #[error("Submission endpoint returned {status}: {body}")]
    Status {
        /// Status code received
        status: http::StatusCode,
        /// Response body, truncated
        body: String,
    },

    /// The token contains characters not allowed in a header value.
    #[error("Token is not a valid Authorization header value: {0}")]
    InvalidAuthorization(#[from] http::header::InvalidHeaderValue),

    /// The payload could not be serialized.
    #[error("Failed to encode submission payload: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Result of a single submission attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// 2xx response. The body may be empty.
    Accepted {
        /// Status code received
        status: http::StatusCode,
        /// Response body, lossily decoded
        body: String,
    },

    /// 401 response; the only retryable outcome.
    Unauthorized,

    /// Transport failure or any other error status.
    Failed(AttemptError),
}

impl AttemptOutcome {
    /// Returns `true` for the outcome that warrants the alternate-scheme retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// What the submission pipeline did.
#[derive(Debug)]
pub enum SubmissionOutcome {
    /// Submission is turned off.
    Disabled,
    /// The configured query is blank after trimming.
    BlankQuery,
    /// Shutdown arrived during the token wait.
    Cancelled,
    /// Generation stored nothing.
    ContextEmpty,
    /// Generation stored a response without a usable token.
    MissingToken,
    /// One or two attempts were made.
    Completed {
        /// URL the query was posted to
        target: Url,
        /// Number of POST requests made (1 or 2)
        attempts: u8,
        /// Outcome of the final attempt
        last: AttemptOutcome,
    },
}

impl SubmissionOutcome {
    /// Number of POST requests the pipeline made.
    #[must_use]
    pub const fn attempts(&self) -> u8 {
        match self {
            Self::Completed { attempts, .. } => *attempts,
            _ => 0,
        }
    }
}
