use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::config::NotificationConfig;
use crate::error::{AppError, AppResult};
use crate::models::TransactionNotice;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    target: &'a str,
    message: &'a str,
}

/// Fonnte WhatsApp gateway client.
#[derive(Clone)]
pub struct WhatsAppClient {
    client: Client,
    config: NotificationConfig,
}

impl WhatsAppClient {
    pub fn new(config: NotificationConfig) -> AppResult<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, config })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub async fn send_message(&self, target: &str, message: &str) -> AppResult<()> {
        if self.config.token.is_empty() {
            return Err(AppError::ConfigError(
                "notification.token is not configured".to_string(),
            ));
        }

        let response = self
            .client
            .post(&self.config.base_url)
            .header("Authorization", &self.config.token)
            .json(&SendMessageRequest { target, message })
            .send()
            .await?;

        if response.status().is_success() {
            log::info!("WhatsApp notification sent to {target}");
            Ok(())
        } else {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("WhatsApp notification to {target} failed: {status}, Error: {error_text}");
            Err(AppError::ExternalApiError(format!(
                "WhatsApp gateway returned {status}"
            )))
        }
    }

    pub async fn send_transaction_notice(&self, notice: &TransactionNotice) -> AppResult<()> {
        let message = format_transaction_message(notice);
        self.send_message(&self.config.target_phone, &message).await
    }
}

pub fn format_transaction_message(notice: &TransactionNotice) -> String {
    let mut message = String::from("TRANSAKSI BARU\n\n");
    message.push_str(&format!("ID: #{}\n", notice.transaction_id));
    message.push_str(&format!("Status: {}\n", notice.status));
    message.push_str(&format!("Total: Rp {}\n\n", notice.total));
    message.push_str("*Items:*\n");
    for (i, line) in notice.lines.iter().enumerate() {
        message.push_str(&format!(
            "{}. {} x{} = Rp {}\n",
            i + 1,
            line.item_name,
            line.quantity,
            line.subtotal
        ));
    }
    message.push_str(&format!(
        "\n_Waktu: {}_",
        notice.completed_at.format("%d/%m/%Y %H:%M:%S")
    ));
    message
}
