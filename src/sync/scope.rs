use std::future::Future;

use tokio::sync::watch;

/// Lifetime of a mounted view.
///
/// Loads started by the view hold a [`ScopeToken`]. Once the scope is closed,
/// explicitly or by dropping it when the view goes away, any load still in
/// flight resolves to `None` and its result is thrown away.
#[derive(Debug)]
pub struct ViewScope {
    closed: watch::Sender<bool>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    pub fn new() -> Self {
        let (closed, _) = watch::channel(false);
        Self { closed }
    }

    pub fn token(&self) -> ScopeToken {
        ScopeToken {
            closed: self.closed.subscribe(),
        }
    }

    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.close();
    }
}

#[derive(Debug, Clone)]
pub struct ScopeToken {
    closed: watch::Receiver<bool>,
}

impl ScopeToken {
    pub fn is_cancelled(&self) -> bool {
        *self.closed.borrow()
    }

    /// Resolves once the owning scope has closed.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.closed.borrow_and_update() {
                return;
            }
            // The sender only goes away after `Drop` has marked it closed.
            if self.closed.changed().await.is_err() {
                return;
            }
        }
    }

    /// Drive `fut` unless the scope closes first.
    pub async fn run<F: Future>(&mut self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            output = fut => Some(output),
        }
    }
}
