//! Graceful shutdown signalling.
//!
//! A [`Shutdown`] is a cheap, cloneable handle that resolves once shutdown has
//! been requested, either by a [`ShutdownTrigger`] or by SIGINT/SIGTERM.

use std::future::Future;
use tokio::sync::watch;
use tracing::{info, warn};

/// Handle observed by tasks that must stop on shutdown.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

/// Requests shutdown of every [`Shutdown`] handle created alongside it.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Request shutdown.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

impl Shutdown {
    /// Create a handle and the trigger that fires it.
    ///
    /// Dropping the trigger without firing it also counts as shutdown.
    pub fn new() -> (ShutdownTrigger, Shutdown) {
        let (tx, rx) = watch::channel(false);
        (ShutdownTrigger { tx }, Shutdown { rx })
    }

    /// Create a handle fired by SIGINT or SIGTERM, plus the worker future
    /// that listens for the signals. The worker must be spawned.
    pub fn new_signals() -> (Shutdown, impl Future<Output = ()> + Send + 'static) {
        let (trigger, shutdown) = Self::new();
        let worker = async move {
            wait_for_signal().await;
            info!("shutdown signal received");
            trigger.trigger();
        };
        (shutdown, worker)
    }

    /// Whether shutdown has been requested.
    pub fn is_shutting_down(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Wait until shutdown is requested.
    pub async fn wait(&mut self) {
        // An error means the trigger is gone.
        let _ = self.rx.wait_for(|requested| *requested).await;
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            warn!("failed to install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_wakes_waiters() {
        let (trigger, shutdown) = Shutdown::new();
        let mut waiter = shutdown.clone();
        assert!(!shutdown.is_shutting_down());

        let handle = tokio::spawn(async move { waiter.wait().await });
        trigger.trigger();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter did not wake")
            .unwrap();
        assert!(shutdown.is_shutting_down());
    }

    #[tokio::test]
    async fn test_dropped_trigger_counts_as_shutdown() {
        let (trigger, mut shutdown) = Shutdown::new();
        drop(trigger);
        assert!(shutdown.is_shutting_down());
        tokio::time::timeout(Duration::from_secs(1), shutdown.wait())
            .await
            .expect("wait did not return");
    }
}
