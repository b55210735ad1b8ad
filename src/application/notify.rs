use crate::domain::ports::NotificationGatewayRef;
use tokio::sync::mpsc;
use uuid::Uuid;

/// A queued notification for one user.
#[derive(Debug, Clone)]
pub struct Notification {
    pub user_id: Uuid,
    pub subject: String,
    pub body: String,
}

/// Fire-and-forget notification dispatch.
///
/// Owns the sending half of a channel drained by a background worker task,
/// so gateway calls never run inside a wallet or subscription unit of work.
/// Delivery failures are logged and dropped; they must never roll back the
/// financial write that triggered them.
#[derive(Clone)]
pub struct Notifier {
    queue: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    /// Spawns the worker task on the current runtime and returns the handle
    /// used to enqueue notifications.
    pub fn spawn(gateway: NotificationGatewayRef) -> Self {
        let (queue, mut inbox) = mpsc::unbounded_channel::<Notification>();
        tokio::spawn(async move {
            while let Some(notification) = inbox.recv().await {
                if let Err(err) = gateway
                    .notify(
                        notification.user_id,
                        &notification.subject,
                        &notification.body,
                    )
                    .await
                {
                    tracing::warn!(
                        user_id = %notification.user_id,
                        error = %err,
                        "can't send notification"
                    );
                }
            }
        });
        Self { queue }
    }

    pub fn send(&self, notification: Notification) {
        if self.queue.send(notification).is_err() {
            tracing::warn!("notification worker is gone; dropping notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::NotificationGateway;
    use crate::error::{LedgerError, Result};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingGateway {
        delivered: Mutex<Vec<Notification>>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationGateway for RecordingGateway {
        async fn notify(&self, user_id: Uuid, subject: &str, body: &str) -> Result<()> {
            if self.fail {
                return Err(LedgerError::Domain("delivery refused".to_string()));
            }
            self.delivered.lock().unwrap().push(Notification {
                user_id,
                subject: subject.to_string(),
                body: body.to_string(),
            });
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_worker_delivers() {
        let gateway = Arc::new(RecordingGateway::default());
        let notifier = Notifier::spawn(gateway.clone());

        let user_id = Uuid::new_v4();
        notifier.send(Notification {
            user_id,
            subject: "subject".to_string(),
            body: "body".to_string(),
        });

        // The worker runs on the same runtime; give it a few polls.
        for _ in 0..100 {
            if !gateway.delivered.lock().unwrap().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }

        let delivered = gateway.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].user_id, user_id);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_swallowed() {
        let gateway = Arc::new(RecordingGateway {
            fail: true,
            ..Default::default()
        });
        let notifier = Notifier::spawn(gateway);

        notifier.send(Notification {
            user_id: Uuid::new_v4(),
            subject: "subject".to_string(),
            body: "body".to_string(),
        });
        tokio::task::yield_now().await;
        // Nothing to assert beyond "no panic, no error surfaced".
    }
}
