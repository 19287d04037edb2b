//! Cancellable timer tasks that feed signals into a connection's ordered event loop.
//!
//! Timers never touch session state themselves. They only push a signal into the owner's
//! channel, so every mutation still happens on the owner's single message stream.

use std::time::Duration;

use tokio::{
    sync::mpsc,
    time::{Instant, interval_at, sleep},
};
use tokio_util::sync::{CancellationToken, DropGuard};

/// Group of timer tasks that are cancelled together, explicitly or when the scope is dropped.
#[derive(Debug)]
pub struct TaskScope {
    token: CancellationToken,
    _guard: DropGuard,
}

impl Default for TaskScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskScope {
    /// Open an empty scope.
    pub fn new() -> Self {
        let token = CancellationToken::new();
        Self {
            _guard: token.clone().drop_guard(),
            token,
        }
    }

    /// Token observed by every task in this scope.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Send `make()` every `period`, starting one period from now.
    pub fn every<S, F>(&self, period: Duration, tx: mpsc::UnboundedSender<S>, make: F)
    where
        S: Send + 'static,
        F: Fn() -> S + Send + 'static,
    {
        let token = self.token.child_token();
        tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticks.tick() => {
                        if tx.send(make()).is_err() {
                            break;
                        }
                    }
                }
            }
        });
    }

    /// Send `signal` once after `delay`, unless the scope is cancelled first.
    pub fn after<S>(&self, delay: Duration, tx: mpsc::UnboundedSender<S>, signal: S)
    where
        S: Send + 'static,
    {
        let token = self.token.child_token();
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = sleep(delay) => {
                    let _ = tx.send(signal);
                }
            }
        });
    }

    /// Stop every task of the scope.
    pub fn cancel(self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period_until_cancelled() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scope = TaskScope::new();
        let started = Instant::now();
        scope.every(Duration::from_secs(1), tx, || "tick");

        for n in 1..=3u64 {
            assert_eq!(rx.recv().await, Some("tick"));
            assert_eq!(started.elapsed(), Duration::from_secs(n));
        }

        scope.cancel();
        while rx.recv().await.is_some() {}
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_scope_stops_its_tasks() {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        {
            let scope = TaskScope::new();
            scope.every(Duration::from_millis(100), tx.clone(), || ());
            scope.after(Duration::from_secs(5), tx, ());
        }
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_signal_fires_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scope = TaskScope::new();
        let started = Instant::now();
        scope.after(Duration::from_millis(800), tx, 42);

        assert_eq!(rx.recv().await, Some(42));
        assert_eq!(started.elapsed(), Duration::from_millis(800));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_delay_never_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scope = TaskScope::new();
        scope.after(Duration::from_millis(800), tx, 42);
        sleep(Duration::from_millis(400)).await;
        scope.cancel();

        assert_eq!(rx.recv().await, None);
    }
}
