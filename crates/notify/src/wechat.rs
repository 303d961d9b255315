use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stockwatch_core::notify::error::NotifyError;
use stockwatch_core::notify::port::Notifier;
use tracing::debug;

/// # Summary
/// A notifier implementation that posts text messages to a WeCom (WeChat Work)
/// group robot webhook.
///
/// # Invariants
/// * `webhook_url` is non-empty.
/// * Every request is bounded by a 10 second timeout.
pub struct WeChatNotifier {
    /// The robot webhook URL, including its key.
    webhook_url: String,
    /// The HTTP client used for requests.
    client: reqwest::Client,
}

/// # Summary
/// Payload structure for the webhook `text` message type.
#[derive(Serialize)]
struct WeChatMessage<'a> {
    msgtype: &'static str,
    text: TextContent<'a>,
}

#[derive(Serialize)]
struct TextContent<'a> {
    content: &'a str,
}

/// # Summary
/// Application-level response envelope. `errcode` 0 means delivered.
#[derive(Deserialize, Debug)]
struct WeChatResponse {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

impl WeChatNotifier {
    /// # Summary
    /// Creates a new `WeChatNotifier`.
    ///
    /// # Logic
    /// 1. Rejects an empty webhook URL.
    /// 2. Builds an HTTP client with a 10 second timeout.
    ///
    /// # Arguments
    /// * `webhook_url` - The robot webhook URL.
    ///
    /// # Returns
    /// * A new instance of `WeChatNotifier` or `NotifyError::Config`.
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, NotifyError> {
        let webhook_url = webhook_url.into();
        if webhook_url.trim().is_empty() {
            return Err(NotifyError::Config("webhook URL must not be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { webhook_url, client })
    }

    /// # Summary
    /// Sends a short connectivity message to verify the webhook works.
    pub async fn test_connection(&self) -> Result<(), NotifyError> {
        self.send("🚀 股票指数监视器已启动，连接测试成功！✅").await
    }
}

#[async_trait]
impl Notifier for WeChatNotifier {
    /// # Summary
    /// Posts a text message to the configured webhook.
    ///
    /// # Logic
    /// 1. Wraps the message in a `{msgtype: "text", text: {content}}` envelope.
    /// 2. Sends it as UTF-8 JSON.
    /// 3. A non-2xx status is a failure carrying the response body.
    /// 4. A 2xx response whose `errcode` is non-zero is also a failure.
    ///
    /// # Arguments
    /// * `message` - The message body.
    ///
    /// # Returns
    /// * `Ok(())` if the platform accepted the message.
    /// * `Err(NotifyError)` otherwise.
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let payload = WeChatMessage {
            msgtype: "text",
            text: TextContent { content: message },
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json; charset=utf-8")
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(NotifyError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: WeChatResponse = serde_json::from_str(&body)
            .map_err(|e| NotifyError::Config(format!("Unreadable webhook response '{}': {}", body, e)))?;
        debug!("Webhook response: {:?}", envelope);

        if envelope.errcode != 0 {
            let message = if envelope.errmsg.is_empty() {
                "unknown error".to_string()
            } else {
                envelope.errmsg
            };
            return Err(NotifyError::Platform {
                code: envelope.errcode,
                message,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_webhook() {
        let result = WeChatNotifier::new("  ");
        assert!(matches!(result, Err(NotifyError::Config(_))));
    }

    #[test]
    fn test_payload_shape() {
        let payload = WeChatMessage {
            msgtype: "text",
            text: TextContent { content: "hello" },
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"msgtype": "text", "text": {"content": "hello"}}));
    }
}
