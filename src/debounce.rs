use crate::config::ListConfig;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Collapses bursts of values (search-box keystrokes) into one delivery after a
/// quiet period.
///
/// Each [`push`](Self::push) cancels the pending delivery and schedules a new one.
/// Dropping the debouncer cancels whatever is pending, so nothing fires after the
/// owning view is gone.
pub struct Debouncer<V> {
    delay: Duration,
    sender: mpsc::UnboundedSender<V>,
    pending: Option<JoinHandle<()>>,
}

impl<V: Send + 'static> Debouncer<V> {
    #[must_use]
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<V>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                delay,
                sender,
                pending: None,
            },
            receiver,
        )
    }

    #[must_use]
    pub fn from_config(config: &ListConfig) -> (Self, mpsc::UnboundedReceiver<V>) {
        Self::new(Duration::from_millis(config.debounce_ms))
    }

    /// Schedule `value` for delivery after the quiet period.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn push(&mut self, value: V) {
        self.cancel();
        let sender = self.sender.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // receiver gone means the view is gone
            let _ = sender.send(value);
        }));
    }

    /// Cancel the pending delivery. Returns whether one was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl<V> Drop for Debouncer<V> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_delivers_last_value_once() {
        let (mut debouncer, mut rx) = Debouncer::new(Duration::from_millis(300));
        for text in ["a", "al", "ali", "alic", "alice"] {
            debouncer.push(text.to_string());
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(rx.recv().await.unwrap(), "alice");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_pushes_each_deliver() {
        let (mut debouncer, mut rx) = Debouncer::new(Duration::from_millis(300));
        debouncer.push(1);
        tokio::time::sleep(Duration::from_millis(400)).await;
        debouncer.push(2);
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_delivery() {
        let (mut debouncer, mut rx) = Debouncer::new(Duration::from_millis(300));
        debouncer.push("bob");
        assert!(debouncer.is_pending());
        drop(debouncer);
        tokio::time::sleep(Duration::from_secs(1)).await;
        // sender dropped with the debouncer and nothing was delivered
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_reports_pending() {
        let (mut debouncer, _rx) = Debouncer::<u8>::from_config(&ListConfig::default());
        assert!(!debouncer.cancel());
        debouncer.push(7);
        assert!(debouncer.cancel());
        assert!(!debouncer.is_pending());
    }
}
