//! Cooperative shutdown for the startup steps.
//!
//! The binary feeds a `watch::Receiver<bool>` from Ctrl+C / SIGTERM. Every
//! network call and every sleep in the pipeline is raced against it, so a
//! signal stops the run at the next await point instead of after the
//! current call's timeout.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;

#[cfg(test)]
#[path = "shutdown_tests.rs"]
mod tests;

/// Drives `future` to completion unless `shutdown` turns `true` first.
///
/// Returns `None` when shutdown wins, including when it was already signalled
/// before the call; `future` is then dropped without being polled further.
/// Without a receiver, or once the sender is gone, `future` simply runs.
pub async fn unless_shutdown<F>(
    future: F,
    shutdown: Option<&mut watch::Receiver<bool>>,
) -> Option<F::Output>
where
    F: Future,
{
    let Some(shutdown) = shutdown else {
        return Some(future.await);
    };

    if *shutdown.borrow_and_update() {
        return None;
    }

    tokio::pin!(future);
    loop {
        tokio::select! {
            output = &mut future => return Some(output),
            changed = shutdown.changed() => {
                if changed.is_err() {
                    return Some(future.await);
                }
                if *shutdown.borrow_and_update() {
                    return None;
                }
            }
        }
    }
}

/// Sleeps for `duration`, returning early with `true` if `shutdown` turns `true`.
///
/// Without a receiver this is a plain sleep. A dropped sender can no longer
/// signal, so the full duration is slept.
pub async fn sleep_unless_shutdown(
    duration: Duration,
    shutdown: Option<&mut watch::Receiver<bool>>,
) -> bool {
    unless_shutdown(tokio::time::sleep(duration), shutdown)
        .await
        .is_none()
}
