use once_cell::sync::Lazy;
use serde::Serialize;
use tokio::sync::broadcast;

/// Row-change event on the notifications table. Carries no payload
/// beyond the action; subscribers re-fetch (latest fetch wins).
#[derive(Debug, Clone, Serialize)]
pub struct NotificationEvent {
    pub user_id: u64,
    pub action: &'static str, // "insert" | "update" | "delete"
}

static NOTIFICATION_CHANNEL: Lazy<broadcast::Sender<NotificationEvent>> =
    Lazy::new(|| broadcast::channel(256).0);

/// Fire-and-forget; a send error only means nobody is listening.
pub fn publish(user_id: u64, action: &'static str) {
    let _ = NOTIFICATION_CHANNEL.send(NotificationEvent { user_id, action });
}

pub fn subscribe() -> broadcast::Receiver<NotificationEvent> {
    NOTIFICATION_CHANNEL.subscribe()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let mut rx = subscribe();
        publish(7, "insert");

        // The channel is global; skip events from parallel tests.
        loop {
            let event = rx.recv().await.unwrap();
            if event.user_id == 7 {
                assert_eq!(event.action, "insert");
                break;
            }
        }
    }

    #[test]
    fn publish_without_subscribers_does_not_panic() {
        publish(1, "delete");
    }
}
