//! Final query submission with a single alternate-scheme retry.

use std::sync::Arc;
use std::time::Duration;

use http::header::{AUTHORIZATION, HeaderValue};
use serde::Serialize;
use tokio::sync::watch;
use url::Url;

use crate::context::{StoredWebhook, WebhookContext};
use crate::shutdown::unless_shutdown;
use crate::webhook::{HttpClient, HttpRequest, HttpResponse};

use super::{AttemptError, AttemptOutcome, SubmissionOutcome, TokenGate, WaitOutcome};

/// Response bodies are cut to this many characters in logs and errors.
const LOG_BODY_LIMIT: usize = 500;

/// Settings for the submission step.
#[derive(Debug, Clone)]
pub struct SubmitSettings {
    /// Whether submission runs at all
    pub enabled: bool,
    /// Used when generation did not yield a callback URL
    pub fallback_url: Url,
    /// Text submitted as `finalQuery`; trimmed before use
    pub final_query: String,
    /// Delay before the step starts (applied by the sequencer)
    pub delay: Duration,
    /// How long to wait for a token
    pub token_timeout: Duration,
    /// How often to check for a token
    pub token_poll_interval: Duration,
    /// Upper bound for each submission attempt
    pub timeout: Duration,
}

impl SubmitSettings {
    /// Timeout applied to each submission attempt.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
}

/// Body of the submission call, serialized as `{"finalQuery": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    /// The query text
    #[serde(rename = "finalQuery")]
    pub final_query: String,
}

/// How the token is presented in the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// The token as-is, without a scheme prefix.
    Raw,
    /// `Bearer <token>`.
    Bearer,
}

impl AuthScheme {
    /// Prefix used by [`AuthScheme::Bearer`].
    pub const BEARER_PREFIX: &'static str = "Bearer ";

    /// Builds the header value for `token`.
    #[must_use]
    pub fn header_value(self, token: &str) -> String {
        match self {
            Self::Raw => token.to_string(),
            Self::Bearer => format!("{}{token}", Self::BEARER_PREFIX),
        }
    }

    /// Name used in log lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Bearer => "Bearer",
        }
    }

    /// 1-based attempt number this scheme is used for.
    #[must_use]
    pub const fn attempt(self) -> u8 {
        match self {
            Self::Raw => 1,
            Self::Bearer => 2,
        }
    }
}

/// Waits for the token and submits the final query.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
#[derive(Debug)]
pub struct SolutionSubmitter<H> {
    client: H,
    context: Arc<WebhookContext>,
    gate: TokenGate,
    shutdown: Option<watch::Receiver<bool>>,
    settings: SubmitSettings,
}

impl<H> SolutionSubmitter<H> {
    /// Creates a submitter reading from `context`.
    #[must_use]
    pub fn new(client: H, context: Arc<WebhookContext>, settings: SubmitSettings) -> Self {
        Self {
            client,
            gate: TokenGate::new(Arc::clone(&context)),
            context,
            shutdown: None,
            settings,
        }
    }

    /// Attaches a shutdown signal that aborts the token wait and any
    /// in-flight or pending attempt.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.gate = self.gate.with_shutdown(shutdown.clone());
        self.shutdown = Some(shutdown);
        self
    }

    /// Returns the configured settings.
    #[must_use]
    pub const fn settings(&self) -> &SubmitSettings {
        &self.settings
    }
}

impl<H: HttpClient> SolutionSubmitter<H> {
    /// Runs the submission pipeline.
    ///
    /// Makes zero, one or two POST requests. The second is only made when the
    /// first was rejected with 401 and the token does not already carry the
    /// `Bearer ` scheme. A shutdown signal abandons the current attempt and
    /// prevents the next one. Every failure is logged and reported in the
    /// outcome; nothing is propagated.
    pub async fn submit_if_configured(&self) -> SubmissionOutcome {
        if !self.settings.enabled {
            tracing::info!("Solution submission disabled by configuration");
            return SubmissionOutcome::Disabled;
        }

        let query = self.settings.final_query.trim();
        if query.is_empty() {
            tracing::warn!("Final query is blank; aborting submission");
            return SubmissionOutcome::BlankQuery;
        }

        let waited = self
            .gate
            .wait_for_token(self.settings.token_timeout, self.settings.token_poll_interval)
            .await;
        if waited == WaitOutcome::Cancelled {
            return SubmissionOutcome::Cancelled;
        }

        let Some(stored) = self.context.get() else {
            tracing::error!("Cannot submit final query: webhook context empty");
            return SubmissionOutcome::ContextEmpty;
        };

        let target = self.target_url(&stored);

        let Some(token) = stored.jwt_token().filter(|t| !t.trim().is_empty()) else {
            tracing::error!("Cannot submit final query: access token not available");
            return SubmissionOutcome::MissingToken;
        };

        let payload = SubmissionPayload {
            final_query: query.to_string(),
        };
        tracing::info!(
            "Preparing final query submission (length={} chars) to {target}",
            query.chars().count()
        );

        let mut shutdown = self.shutdown.clone();

        let Some(first) = unless_shutdown(
            self.attempt(&target, &payload, token, AuthScheme::Raw),
            shutdown.as_mut(),
        )
        .await
        else {
            tracing::info!("Final query submission abandoned by shutdown");
            return SubmissionOutcome::Cancelled;
        };
        if !first.is_retryable() {
            return SubmissionOutcome::Completed {
                target,
                attempts: 1,
                last: first,
            };
        }

        if token.starts_with(AuthScheme::BEARER_PREFIX) {
            tracing::info!("Token already uses the Bearer scheme; not retrying");
            return SubmissionOutcome::Completed {
                target,
                attempts: 1,
                last: first,
            };
        }

        tracing::info!("Retrying submission with 'Bearer ' prefix added to token");
        let Some(second) = unless_shutdown(
            self.attempt(&target, &payload, token, AuthScheme::Bearer),
            shutdown.as_mut(),
        )
        .await
        else {
            tracing::info!("Bearer retry skipped by shutdown");
            return SubmissionOutcome::Cancelled;
        };
        SubmissionOutcome::Completed {
            target,
            attempts: 2,
            last: second,
        }
    }

    /// The stored callback URL, or the configured fallback when there is none.
    fn target_url(&self, stored: &StoredWebhook) -> Url {
        stored.webhook_url().map_or_else(
            || {
                tracing::warn!(
                    "Stored webhook URL missing; falling back to configured submission URL: {}",
                    self.settings.fallback_url
                );
                self.settings.fallback_url.clone()
            },
            |url| {
                tracing::info!("Using dynamically generated webhook URL: {url}");
                url.clone()
            },
        )
    }

        /// Makes one submission attempt and logs its outcome.
    async fn attempt(
        &self,
        target: &Url,
        payload: &SubmissionPayload,
        token: &str,
        scheme: AuthScheme,
    ) -> AttemptOutcome {
        let outcome = match self.send(target, payload, &scheme.header_value(token)).await {
            Ok(response) => classify(&response),
            Err(e) => AttemptOutcome::Failed(e),
        };
        log_attempt(&outcome, scheme, token);
        outcome
    }

    async fn send(
        &self,
        target: &Url,
        payload: &SubmissionPayload,
        authorization: &str,
    ) -> Result<HttpResponse, AttemptError> {
        let mut value = HeaderValue::from_str(authorization)?;
        value.set_sensitive(true);

        let request = HttpRequest::post(target.clone())
            .with_json(payload)
            .map_err(AttemptError::Encode)?
            .with_header(AUTHORIZATION, value)
            .with_timeout(self.settings.timeout);

        Ok(self.client.request(request).await?)
    }
}

/// Maps a received response onto an attempt outcome. Only 401 is retryable.
fn classify(response: &HttpResponse) -> AttemptOutcome {
    if response.status == http::StatusCode::UNAUTHORIZED {
        AttemptOutcome::Unauthorized
    } else if response.is_success() {
        AttemptOutcome::Accepted {
            status: response.status,
            body: response.body_lossy(),
        }
    } else {
        AttemptOutcome::Failed(AttemptError::Status {
            status: response.status,
            body: truncate(&response.body_lossy(), LOG_BODY_LIMIT).to_string(),
        })
    }
}

fn log_attempt(outcome: &AttemptOutcome, scheme: AuthScheme, token: &str) {
    let attempt = scheme.attempt();
    match outcome {
        AttemptOutcome::Accepted { body, .. } if body.trim().is_empty() => tracing::warn!(
            "Submission completed but empty response body returned (attempt {attempt}, {})",
            describe_authorization(scheme, token)
        ),
        AttemptOutcome::Accepted { status, body } => tracing::info!(
            "Submission response {status} (truncated to {LOG_BODY_LIMIT} chars) [attempt {attempt}]: {}",
            truncate(body, LOG_BODY_LIMIT)
        ),
        AttemptOutcome::Unauthorized => tracing::warn!(
            "Received 401 Unauthorized on attempt {attempt} ({})",
            describe_authorization(scheme, token)
        ),
        AttemptOutcome::Failed(e) => tracing::error!("Submission attempt {attempt} failed: {e}"),
    }
}

/// Returns at most the first `max_chars` characters of `text`.
#[must_use]
pub fn truncate(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(idx, _)| &text[..idx])
}

/// Describes the Authorization value for logs without any token characters.
#[must_use]
pub fn describe_authorization(scheme: AuthScheme, token: &str) -> String {
    format!(
        "{} scheme, {}-char token",
        scheme.label(),
        token.chars().count()
    )
}
