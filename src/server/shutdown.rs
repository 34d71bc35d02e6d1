// Shutdown signal handling
//
// SIGTERM and SIGINT (Ctrl+C) request a graceful stop: the accept loop
// observes the Notify, stops accepting, and main returns Ok so the process
// exits with status 0.

use std::sync::Arc;
use tokio::sync::Notify;

/// Install signal handlers and return the shutdown `Notify`.
#[cfg(unix)]
pub fn install() -> Arc<Notify> {
    use tokio::signal::unix::{signal, SignalKind};

    let shutdown = Arc::new(Notify::new());
    let notifier = Arc::clone(&shutdown);

    tokio::spawn(async move {
        let Ok(mut sigterm) = signal(SignalKind::terminate()) else {
            crate::logger::log_error("Failed to register SIGTERM handler");
            return;
        };
        let Ok(mut sigint) = signal(SignalKind::interrupt()) else {
            crate::logger::log_error("Failed to register SIGINT handler");
            return;
        };

        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
        // notify_one stores a permit when no task is parked on the Notify,
        // so a signal landing between accept-loop polls is not lost
        notifier.notify_one();
    });

    shutdown
}

/// Non-Unix fallback: only Ctrl+C is supported.
#[cfg(not(unix))]
pub fn install() -> Arc<Notify> {
    let shutdown = Arc::new(Notify::new());
    let notifier = Arc::clone(&shutdown);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            notifier.notify_one();
        }
    });

    shutdown
}
