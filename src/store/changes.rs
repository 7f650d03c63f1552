/// Change feed for the document store
///
/// Every successful write publishes a `Change`. Realtime subscriptions listen
/// here and re-read the affected collection.

use tokio::sync::broadcast;

const FEED_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// A write to a single document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub collection: String,
    pub key: String,
    pub kind: ChangeKind,
}

/// Broadcast sender shared by all stores
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<Change>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Change> {
        self.tx.subscribe()
    }

    /// Publish a change; having no listeners is fine
    pub fn publish(&self, collection: &str, key: &str, kind: ChangeKind) {
        let change = Change {
            collection: collection.to_string(),
            key: key.to_string(),
            kind,
        };
        tracing::debug!("📣 {:?} {}/{}", kind, collection, key);
        let _ = self.tx.send(change);
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let feed = ChangeFeed::new();
        let mut rx = feed.subscribe();

        feed.publish("projects", "abc", ChangeKind::Created);

        let change = rx.recv().await.unwrap();
        assert_eq!(change.collection, "projects");
        assert_eq!(change.key, "abc");
        assert_eq!(change.kind, ChangeKind::Created);
    }

    #[test]
    fn test_publish_without_listeners() {
        ChangeFeed::new().publish("settings", "profile", ChangeKind::Updated);
    }
}
