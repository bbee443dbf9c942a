//! Background tasks for the application.
//!
//! The notification worker drains the queue filled by `NotificationService`
//! and forwards each notice to the WhatsApp gateway.

use tokio::sync::mpsc::Receiver;
use tokio::task::JoinHandle;

use crate::external::WhatsAppClient;
use crate::models::TransactionNotice;

/// Runs until every `NotificationService` handle has been dropped.
pub fn spawn_notification_worker(
    mut receiver: Receiver<TransactionNotice>,
    client: WhatsAppClient,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(notice) = receiver.recv().await {
            if !client.is_enabled() {
                log::debug!(
                    "Notifications disabled, skipping transaction {}",
                    notice.transaction_id
                );
                continue;
            }
            if let Err(e) = client.send_transaction_notice(&notice).await {
                log::error!(
                    "Failed to send notification for transaction {}: {e:?}",
                    notice.transaction_id
                );
            }
        }
        log::info!("Notification worker stopped");
    })
}
