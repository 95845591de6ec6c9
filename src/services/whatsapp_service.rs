/// WhatsApp Cloud API client
///
/// Sends the daily forecast summary as a plain text message.
/// Endpoint: `{api_base_url}/{api_version}/{phone_number_id}/messages`

use reqwest::{Client, Response};
use serde::Deserialize;

use crate::config::WhatsAppConfig;
use crate::error::NotifyError;
use crate::models::forecast::DailyForecast;
use crate::services::summary;

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    messages: Vec<MessageId>,
}

#[derive(Debug, Deserialize)]
struct MessageId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PhoneNumberInfo {
    #[serde(default)]
    display_phone_number: Option<String>,
}
#[derive(Debug, Clone)]
pub struct WhatsAppClient {
    http: Client,
    cfg: WhatsAppConfig,
    recipient: String,
}

/// Strip decoration from a phone number and make sure it carries a `+`.
pub fn format_phone_number(number: &str) -> String {
    let digits: String = number
        .replace("whatsapp:", "")
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();

    if digits.starts_with('+') { digits } else { format!("+{}", digits) }
}

pub fn build_message_payload(recipient: &str, body: &str) -> serde_json::Value {
    serde_json::json!({
        "messaging_product": "whatsapp",
        "recipient_type":    "individual",
        "to":                recipient,
        "type":              "text",
        "text": {
            "preview_url": false,
            "body":        body,
        },
    })
}

/// Non-2xx responses become `NotifyError::Api` carrying the response body.
async fn check_status(response: Response) -> Result<Response, NotifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(NotifyError::Api { status: status.as_u16(), body })
}

impl WhatsAppClient {
    pub fn new(cfg: WhatsAppConfig) -> Self {
        let recipient = format_phone_number(&cfg.recipient_number);
        Self {
            http: Client::new(),
            cfg,
            recipient,
        }
    }

    /// Sender phone-number resource: `{base}/{version}/{phone_number_id}`.
    pub fn phone_number_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.cfg.api_base_url.trim_end_matches('/'),
            self.cfg.api_version,
            self.cfg.phone_number_id
        )
    }

    pub fn api_url(&self) -> String {
        format!("{}/messages", self.phone_number_url())
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Reads the sender's phone-number record to confirm the token works.
    /// Returns the display number reported by the API.
    pub async fn test_connection(&self) -> Result<Option<String>, NotifyError> {
        let response = self
            .http
            .get(self.phone_number_url())
            .bearer_auth(&self.cfg.access_token)
            .send()
            .await?;

        let info: PhoneNumberInfo = check_status(response).await?.json().await?;
        Ok(info.display_phone_number)
    }

    /// Returns the message id assigned by the API, when present.
    pub async fn send_message(&self, body: &str) -> Result<Option<String>, NotifyError> {
        let payload = build_message_payload(&self.recipient, body);

        let response = self
            .http
            .post(self.api_url())
            .bearer_auth(&self.cfg.access_token)
            .json(&payload)
            .send()
            .await?;

        let parsed: SendResponse = check_status(response).await?.json().await?;
        let id = parsed.messages.into_iter().next().map(|m| m.id);
        if let Some(id) = &id {
            tracing::info!(message_id = %id, "WhatsApp message accepted");
        }
        Ok(id)
    }

    pub async fn send_daily_forecast(
        &self,
        forecast: &DailyForecast,
        location_name: &str,
    ) -> Result<Option<String>, NotifyError> {
        let body = summary::format_daily_message(forecast, location_name);
        self.send_message(&body).await
    }
}
