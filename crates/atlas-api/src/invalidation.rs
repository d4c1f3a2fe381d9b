use std::sync::Arc;

use tokio::sync::broadcast;

use atlas_types::events::ViewEvent;

/// Invalidation signal for views derived from the store.
///
/// Nothing is cached here. Every list or stats read goes to the store, and
/// subscribers holding their own copy of a view re-read when signalled.
#[derive(Clone)]
pub struct Views {
    inner: Arc<ViewsInner>,
}

struct ViewsInner {
    broadcast_tx: broadcast::Sender<ViewEvent>,
}

impl Default for Views {
    fn default() -> Self {
        Self::new()
    }
}

impl Views {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(256);
        Self {
            inner: Arc::new(ViewsInner { broadcast_tx }),
        }
    }

    /// Receive invalidation signals. Receivers re-read on their own schedule.
    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.inner.broadcast_tx.subscribe()
    }

    /// Notify subscribers that a mutation happened.
    pub fn invalidate(&self, event: ViewEvent) {
        // No subscribers is fine
        let _ = self.inner.broadcast_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_receive_events() {
        let views = Views::new();
        let mut rx = views.subscribe();
        views.invalidate(ViewEvent::HelpfulIncremented { id: 2 });
        assert_eq!(
            rx.try_recv().unwrap(),
            ViewEvent::HelpfulIncremented { id: 2 }
        );
    }

    #[test]
    fn invalidate_without_subscribers_is_harmless() {
        let views = Views::new();
        views.invalidate(ViewEvent::ExperienceCreated { id: 1 });

        let mut late = views.subscribe();
        assert!(late.try_recv().is_err());
    }

    #[test]
    fn clones_share_one_channel() {
        let views = Views::new();
        let mut rx = views.subscribe();
        views.clone().invalidate(ViewEvent::ExperienceDeleted { id: 4 });
        assert_eq!(
            rx.try_recv().unwrap(),
            ViewEvent::ExperienceDeleted { id: 4 }
        );
    }
}
