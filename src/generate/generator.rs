//! The startup call that provisions a callback URL and token.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::watch;
use url::Url;

use crate::context::{StoredWebhook, WebhookContext};
use crate::shutdown::unless_shutdown;
use crate::webhook::{HttpClient, HttpRequest};

use super::{GenerateError, GenerationOutcome, extract_token, extract_webhook_url};

/// Body of the generation call.
///
/// Serialized as `{"name": .., "regNo": .., "email": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    /// Candidate name
    pub name: String,
    /// Registration number
    #[serde(rename = "regNo")]
    pub reg_no: String,
    /// Contact e-mail
    pub email: String,
}

/// Settings for the generation step.
#[derive(Debug, Clone)]
pub struct GenerateSettings {
    /// Whether the generation call is made at all
    pub enabled: bool,
    /// Generation endpoint
    pub url: Url,
    /// Payload sent to the endpoint
    pub request: GenerationRequest,
    /// Upper bound for the call
    pub timeout: Duration,
}

impl GenerateSettings {
    /// Timeout applied to the generation call.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
}

/// Performs the generation call and publishes the result into a [`WebhookContext`].
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
#[derive(Debug)]
pub struct WebhookGenerator<H> {
    client: H,
    context: Arc<WebhookContext>,
    settings: GenerateSettings,
    shutdown: Option<watch::Receiver<bool>>,
}

impl<H> WebhookGenerator<H> {
    /// Creates a generator that writes into `context`.
    #[must_use]
    pub const fn new(client: H, context: Arc<WebhookContext>, settings: GenerateSettings) -> Self {
        Self {
            client,
            context,
            settings,
            shutdown: None,
        }
    }

    /// Attaches a shutdown signal that abandons the in-flight call.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }
}

impl<H: HttpClient> WebhookGenerator<H> {
    /// Calls the generation endpoint and stores what it returns.
    ///
    /// Failures are logged and reported in the outcome, never propagated.
    /// Nothing is stored when the step is disabled, the call fails or is
    /// abandoned on shutdown, or the response is empty. Any non-empty response is stored, even when
    /// neither a URL nor a token could be found in it.
    pub async fn generate_and_store(&self) -> GenerationOutcome {
        if !self.settings.enabled {
            tracing::info!("Webhook generation disabled by configuration");
            return GenerationOutcome::Disabled;
        }

        let request = &self.settings.request;
        tracing::info!(
            "Generating webhook via POST {} for regNo={} email={}",
            self.settings.url,
            request.reg_no,
            request.email,
        );

        let mut shutdown = self.shutdown.clone();
        let Some(fetched) = unless_shutdown(self.fetch(), shutdown.as_mut()).await else {
            tracing::info!("Webhook generation abandoned by shutdown");
            return GenerationOutcome::Cancelled;
        };
        let response = match fetched {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Webhook generation call failed: {e}");
                return GenerationOutcome::Failed(e);
            }
        };

        if response.is_empty() {
            tracing::warn!("Webhook generation response empty; downstream steps will not proceed");
            return GenerationOutcome::Empty;
        }

        tracing::debug!(
            "Webhook generation response keys: {:?}",
            response.keys().collect::<Vec<_>>()
        );

        let webhook_url = extract_webhook_url(&response);
        let jwt_token = extract_token(&response);

        if let Some(url) = &webhook_url {
            tracing::info!("Obtained webhook URL: {url}");
        } else {
            tracing::warn!(
                "Could not locate webhook URL in response; keys: {:?}",
                response.keys().collect::<Vec<_>>()
            );
        }
        if jwt_token.is_some() {
            tracing::info!("Captured access token (hidden)");
        } else {
            tracing::warn!("No access token found in response (looked for token/jwt keys)");
        }

        let outcome = GenerationOutcome::Stored {
            has_url: webhook_url.is_some(),
            has_token: jwt_token.is_some(),
        };
        self.context
            .set(StoredWebhook::new(webhook_url, jwt_token, response));
        outcome
    }

    /// Sends the request and decodes the response body into a JSON object.
    ///
    /// An empty or `null` body decodes to an empty object.
    async fn fetch(&self) -> Result<Map<String, Value>, GenerateError> {
        let request = HttpRequest::post(self.settings.url.clone())
            .with_json(&self.settings.request)
            .map_err(GenerateError::Encode)?
            .with_timeout(self.settings.timeout);

        let response = self.client.request(request).await?;

        if !response.is_success() {
            return Err(GenerateError::Status {
                status: response.status,
                body: response.body_lossy(),
            });
        }

        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        match serde_json::from_slice(&response.body).map_err(GenerateError::Decode)? {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            _ => Err(GenerateError::NotAnObject),
        }
    }
}
