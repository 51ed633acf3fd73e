//! Test-controlled gate that parks callers until opened.

use tokio::sync::watch;

/// A gate that callers wait on.
///
/// Starts open. While closed, [`Gate::pass`] does not return.
pub struct Gate {
    open: watch::Sender<bool>,
}

impl Gate {
    pub fn new() -> Self {
        let (open, _) = watch::channel(true);
        Self { open }
    }

    pub fn close(&self) {
        self.open.send_replace(false);
    }

    pub fn open(&self) {
        self.open.send_replace(true);
    }

    pub fn is_open(&self) -> bool {
        *self.open.borrow()
    }

    /// Wait until the gate is open.
    pub async fn pass(&self) {
        let mut rx = self.open.subscribe();
        if rx.wait_for(|open| *open).await.is_err() {
            tracing::debug!("gate dropped while a caller was parked");
        }
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}
