use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::trace;

/// Broadcast topic with bounded capacity.
/// `T` must be `Send + Sync` because messages cross from the recorder thread
/// and the tokio runtime into the render loop.
#[derive(Debug, Clone)]
pub struct Topic<T> {
    tx: broadcast::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> Topic<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish to every current subscriber. Returns false when nobody listens.
    pub fn publish(&self, msg: T) -> bool {
        match self.tx.send(Arc::new(msg)) {
            Ok(receivers) => {
                trace!(receivers, "Published message");
                true
            }
            Err(_) => false,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<T>> {
        self.tx.subscribe()
    }

    /// Raw sender for tasks that publish `Arc`s themselves.
    pub fn sender(&self) -> broadcast::Sender<Arc<T>> {
        self.tx.clone()
    }
}
