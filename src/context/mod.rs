//! Shared hand-off between the generation step and the submission step.
//!
//! The generator publishes one [`StoredWebhook`] into a [`WebhookContext`];
//! the token gate and the submission pipeline read snapshots of it.

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

use std::sync::{Arc, PoisonError, RwLock};

use serde_json::{Map, Value};
use url::Url;

/// Result of a successful webhook generation call.
///
/// Immutable once built. A later generation replaces the whole value in the
/// context rather than patching individual fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredWebhook {
    webhook_url: Option<Url>,
    jwt_token: Option<String>,
    raw: Map<String, Value>,
}

impl StoredWebhook {
    /// Creates a snapshot from the extracted fields and the raw response.
    #[must_use]
    pub const fn new(
        webhook_url: Option<Url>,
        jwt_token: Option<String>,
        raw: Map<String, Value>,
    ) -> Self {
        Self {
            webhook_url,
            jwt_token,
            raw,
        }
    }

    /// Callback URL returned by the generation endpoint, if one was found.
    #[must_use]
    pub const fn webhook_url(&self) -> Option<&Url> {
        self.webhook_url.as_ref()
    }

    /// Access token returned by the generation endpoint, if one was found.
    #[must_use]
    pub fn jwt_token(&self) -> Option<&str> {
        self.jwt_token.as_deref()
    }

    /// The full response object as received.
    #[must_use]
    pub const fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Returns `true` if a non-blank token is present.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.jwt_token().is_some_and(|t| !t.trim().is_empty())
    }
}

/// Single-slot, thread-safe holder for the generation result.
///
/// Values are published whole: [`set`](Self::set) swaps in a fully built
/// `Arc<StoredWebhook>` and [`get`](Self::get) hands out a clone of that `Arc`,
/// so readers never see a half-written value.
///
/// The context does not order writers and readers. Generation must finish
/// before submission starts waiting; the startup sequencer guarantees that.
#[derive(Debug, Default)]
pub struct WebhookContext {
    slot: RwLock<Option<Arc<StoredWebhook>>>,
}

impl WebhookContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `value`, replacing anything stored before.
    pub fn set(&self, value: StoredWebhook) {
        let value = Arc::new(value);
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    /// Returns a snapshot of the current value, or `None` if nothing was stored.
    #[must_use]
    pub fn get(&self) -> Option<Arc<StoredWebhook>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns `true` if a value with a non-blank token is stored.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.get().is_some_and(|stored| stored.has_token())
    }
}
