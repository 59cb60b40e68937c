use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

use super::{GatewayError, Notifier};
use crate::config::TwilioConfig;

/// Twilio Programmable Messaging over the WhatsApp channel.
#[derive(Debug, Clone)]
pub struct TwilioNotifier {
    client: Client,
    account_sid: String,
    auth_token: String,
    sender: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

impl TwilioNotifier {
    pub fn new(cfg: &TwilioConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build twilio http client")?;
        Ok(Self {
            client,
            account_sid: cfg.account_sid.clone(),
            auth_token: cfg.auth_token.clone(),
            sender: cfg.sender.clone(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.account_sid
        )
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    async fn send(&self, to: &str, body: &str) -> Result<String, GatewayError> {
        let from = format!("whatsapp:{}", self.sender);
        let to_addr = format!("whatsapp:{}", to);
        let form = [("From", from.as_str()), ("To", to_addr.as_str()), ("Body", body)];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, to = %to, "twilio request failed");
                GatewayError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, to = %to, "twilio rejected message");
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let message: MessageResource = response.json().await?;
        info!(sid = %message.sid, status = ?message.status, to = %to, "message queued");
        Ok(message.sid)
    }
}
