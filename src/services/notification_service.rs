use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};

use crate::models::TransactionNotice;

/// Request-side handle of the notification queue. Sending never blocks.
#[derive(Clone)]
pub struct NotificationService {
    sender: Sender<TransactionNotice>,
}

impl NotificationService {
    pub fn new(capacity: usize) -> (Self, Receiver<TransactionNotice>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Returns whether the notice was queued.
    pub fn notify(&self, notice: TransactionNotice) -> bool {
        match self.sender.try_send(notice) {
            Ok(()) => true,
            Err(TrySendError::Full(n)) => {
                log::warn!(
                    "Notification queue full, dropping notice for transaction {}",
                    n.transaction_id
                );
                false
            }
            Err(TrySendError::Closed(n)) => {
                log::warn!(
                    "Notification worker stopped, dropping notice for transaction {}",
                    n.transaction_id
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TransactionStatus;
    use chrono::Utc;

    fn notice(id: i64) -> TransactionNotice {
        TransactionNotice {
            transaction_id: id,
            status: TransactionStatus::Completed,
            total: 1000,
            lines: vec![],
            completed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_full_queue_drops_notice() {
        let (svc, mut rx) = NotificationService::new(1);
        assert!(svc.notify(notice(1)));
        assert!(!svc.notify(notice(2)));
        assert_eq!(rx.recv().await.map(|n| n.transaction_id), Some(1));
    }

    #[tokio::test]
    async fn test_closed_queue_drops_notice() {
        let (svc, rx) = NotificationService::new(4);
        drop(rx);
        assert!(!svc.notify(notice(1)));
    }
}
