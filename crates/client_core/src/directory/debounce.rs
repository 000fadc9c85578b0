use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};

use tokio::{sync::mpsc, task::JoinHandle};

pub const SEARCH_DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

/// Trailing-edge debounce for the search box. Each input restarts the timer;
/// a value is emitted only once it has been left alone for `delay`.
pub struct SearchDebouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
    output: mpsc::UnboundedSender<String>,
}

impl SearchDebouncer {
    /// Must be called inside a tokio runtime; pushes spawn timer tasks.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (output, emitted) = mpsc::unbounded_channel();
        (
            Self {
                delay,
                pending: Mutex::new(None),
                output,
            },
            emitted,
        )
    }

    pub fn push(&self, value: impl Into<String>) {
        let value = value.into();
        let output = self.output.clone();
        let delay = self.delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = output.send(value);
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.replace(timer) {
            previous.abort();
        }
    }

    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[path = "tests/debounce_tests.rs"]
mod tests;
