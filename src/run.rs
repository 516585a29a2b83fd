//! Startup sequencing.
//!
//! Runs generation to completion, then the submission pipeline, either
//! inline or on a deferred task when a start delay is configured.

use std::sync::Arc;

use thiserror::Error;
use tokio::signal;
use tokio::sync::watch;

use hiring_handshake::config::ValidatedConfig;
use hiring_handshake::context::WebhookContext;
use hiring_handshake::generate::{GenerationOutcome, WebhookGenerator};
use hiring_handshake::shutdown::sleep_unless_shutdown;
use hiring_handshake::submit::{SolutionSubmitter, SubmissionOutcome};
use hiring_handshake::webhook::{HttpClient, ReqwestClient};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The deferred submission task panicked or was aborted.
    #[error("Submission task failed: {0}")]
    SubmissionTask(#[source] tokio::task::JoinError),
}

/// What each step of the startup sequence did.
#[derive(Debug)]
pub struct RunReport {
    pub generation: GenerationOutcome,
    pub submission: SubmissionOutcome,
}

/// Executes the startup sequence.
///
/// This function:
/// 1. Installs a Ctrl+C / SIGTERM listener feeding a shutdown channel
/// 2. Creates the shared context, HTTP client, generator and submitter
/// 3. Runs generation, then submission
///
/// Step failures are logged by the steps themselves and do not make this
/// function fail.
///
/// # Errors
///
/// Returns an error if the deferred submission task does not complete.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let listener = tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, stopping...");
        let _ = shutdown_tx.send(true);
    });

    let context = Arc::new(WebhookContext::new());
    let client = ReqwestClient::new();
    let generator = WebhookGenerator::new(client.clone(), Arc::clone(&context), config.generate)
        .with_shutdown(shutdown_rx.clone());
    let submitter = SolutionSubmitter::new(client, context, config.submit)
        .with_shutdown(shutdown_rx.clone());

    let report = run_steps(generator, submitter, shutdown_rx).await;
    listener.abort();

    let report = report?;
    tracing::info!(
        "Startup sequence finished (generation stored: {}, submission requests: {})",
        report.generation.is_stored(),
        report.submission.attempts()
    );
    Ok(())
}

/// Runs generation, then submission.
///
/// Generation always finishes before submission starts waiting for the
/// token. With a non-zero delay, submission runs on its own task after the
/// delay. A shutdown signal at any point ends the remaining steps as
/// cancelled.
async fn run_steps<H>(
    generator: WebhookGenerator<H>,
    submitter: SolutionSubmitter<H>,
    shutdown: watch::Receiver<bool>,
) -> Result<RunReport, RunError>
where
    H: HttpClient + 'static,
{
    tracing::info!("Starting webhook generation step");
    let generation = generator.generate_and_store().await;

    let delay = submitter.settings().delay;
    let submission = if delay.is_zero() || !submitter.settings().enabled {
        submitter.submit_if_configured().await
    } else {
        tracing::info!("Delaying final query submission by {} ms", delay.as_millis());
        let mut shutdown = shutdown;
        let task = tokio::spawn(async move {
            if sleep_unless_shutdown(delay, Some(&mut shutdown)).await {
                tracing::info!("Final query submission skipped by shutdown");
                return SubmissionOutcome::Cancelled;
            }
            submitter.submit_if_configured().await
        });
        task.await.map_err(RunError::SubmissionTask)?
    };

    Ok(RunReport {
        generation,
        submission,
    })
}

/// Returns a future that completes when a shutdown signal is received.
///
/// If a handler cannot be installed, that source simply never fires.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
