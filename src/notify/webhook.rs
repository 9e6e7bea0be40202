use alloy::primitives::TxHash;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::config::NotifierConfig;

use super::Notifier;

#[derive(Debug, Serialize, PartialEq)]
pub struct WebhookPayload {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Embed {
    pub title: String,
    pub url: String,
    pub description: String,
}

/// Posts funding reports to a chat webhook as a single embed linking to the
/// block explorer.
pub struct WebhookNotifier {
    http: reqwest::Client,
    webhook_url: String,
    username: String,
    avatar_url: Option<String>,
    explorer_tx_url: String,
}

impl WebhookNotifier {
    pub fn new(
        webhook_url: String,
        config: &NotifierConfig,
        explorer_tx_url: &str,
    ) -> eyre::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| eyre::eyre!("Failed to build webhook client: {}", e))?;

        Ok(Self {
            http,
            webhook_url,
            username: config.username.clone(),
            avatar_url: config.avatar_url.clone(),
            explorer_tx_url: explorer_tx_url.to_string(),
        })
    }

    pub fn payload(&self, summary: &str, block_number: u64, tx_id: TxHash) -> WebhookPayload {
        let tx = tx_id.to_string();
        let short: String = tx.chars().take(30).collect();

        WebhookPayload {
            username: self.username.clone(),
            avatar_url: self.avatar_url.clone(),
            embeds: vec![Embed {
                title: format!("Block: {} TX: {}...", block_number, short),
                url: format!("{}{}", self.explorer_tx_url, tx),
                description: summary.to_string(),
            }],
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, summary: &str, block_number: u64, tx_id: TxHash) {
        let payload = self.payload(summary, block_number, tx_id);
        tracing::debug!(
            payload = %serde_json::to_string(&payload).unwrap_or_default(),
            "Posting webhook"
        );

        match self.http.post(&self.webhook_url).json(&payload).send().await {
            Ok(resp) if !resp.status().is_success() => {
                tracing::warn!(
                    status = %resp.status(),
                    tx = %tx_id,
                    "Webhook rejected funding report"
                );
            }
            Ok(_) => {
                tracing::info!(block = block_number, tx = %tx_id, "Reported: {}", summary);
            }
            Err(e) => {
                tracing::warn!(error = %e, tx = %tx_id, "Failed to post funding report");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::B256;

    fn notifier() -> WebhookNotifier {
        let config = NotifierConfig {
            avatar_url: Some("https://example.org/ubq.png".to_string()),
            ..Default::default()
        };
        WebhookNotifier::new(
            "https://discord.example/api/webhooks/1".to_string(),
            &config,
            "https://ubiqscan.io/tx/",
        )
        .unwrap()
    }

    #[test]
    fn test_payload_title_and_link() {
        let tx_id = B256::repeat_byte(0xab);
        let payload = notifier().payload("Funded - To: x Value: 1 UBQ", 1234, tx_id);

        assert_eq!(payload.username, "Bridge Funder");
        assert_eq!(payload.embeds.len(), 1);
        let embed = &payload.embeds[0];
        assert_eq!(
            embed.title,
            "Block: 1234 TX: 0xabababababababababababababab..."
        );
        assert_eq!(embed.url, format!("https://ubiqscan.io/tx/{}", tx_id));
        assert!(embed.url.ends_with(&"ab".repeat(32)));
        assert_eq!(embed.description, "Funded - To: x Value: 1 UBQ");
    }

    #[test]
    fn test_payload_serializes_discord_shape() {
        let payload = notifier().payload("s", 1, B256::ZERO);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["avatar_url"], "https://example.org/ubq.png");
        assert_eq!(json["embeds"][0]["description"], "s");
        assert!(json["embeds"][0]["title"].as_str().unwrap().starts_with("Block: 1 TX: 0x"));
    }
}
