use crate::domain::ports::{NotificationGateway, PaymentEvent, PaymentEventPublisher};
use crate::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Logs notifications instead of delivering them.
///
/// The daemon default until a real delivery service is wired in behind the
/// gateway port.
pub struct LoggingNotificationGateway;

#[async_trait]
impl NotificationGateway for LoggingNotificationGateway {
    async fn notify(&self, user_id: Uuid, subject: &str, body: &str) -> Result<()> {
        tracing::info!(user_id = %user_id, subject, body, "notification dispatched");
        Ok(())
    }
}

/// Logs payment events instead of publishing them.
pub struct LoggingPaymentPublisher;

#[async_trait]
impl PaymentEventPublisher for LoggingPaymentPublisher {
    async fn publish(&self, event: PaymentEvent) -> Result<()> {
        tracing::info!(
            user_id = %event.user_id,
            amount = %event.amount,
            "payment event published"
        );
        Ok(())
    }
}
