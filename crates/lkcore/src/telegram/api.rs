//! Webhook client
//!
//! The backend exposes one POST endpoint; the `date` field selects the
//! operation (`auth` or `qr`). Non-2xx answers are failures and nothing is
//! retried.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::types::TelegramUser;
use super::unwrap::unwrap_response;
use crate::core::{config, AppError, AppResult};

/// Backend capability consumed by the authorization and QR flows
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Profile records visible to `user`, already unwrapped from envelopes
    async fn authorize(&self, user: &TelegramUser) -> AppResult<Value>;

    /// Submits the text of a scanned QR code
    async fn send_qr_data(&self, qr_data: &str, user: &TelegramUser) -> AppResult<()>;
}

/// Request body of the webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookPayload<'a> {
    pub date: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_data: Option<&'a str>,
    pub user_id: Option<i64>,
    pub username: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
}

impl<'a> WebhookPayload<'a> {
    pub fn auth(user: &'a TelegramUser) -> Self {
        Self::for_user("auth", None, user)
    }

    pub fn qr(qr_data: &'a str, user: &'a TelegramUser) -> Self {
        Self::for_user("qr", Some(qr_data), user)
    }

    fn for_user(date: &'static str, qr_data: Option<&'a str>, user: &'a TelegramUser) -> Self {
        // Empty strings are sent as null, like missing fields
        let non_empty = |field: &'a Option<String>| field.as_deref().filter(|value| !value.is_empty());
        Self {
            date,
            qr_data,
            user_id: user.id.filter(|id| *id != 0),
            username: non_empty(&user.username),
            first_name: non_empty(&user.first_name),
            last_name: non_empty(&user.last_name),
        }
    }
}

/// reqwest-backed [`AuthService`]
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    url: String,
}

impl WebhookClient {
    pub fn new(url: impl Into<String>) -> AppResult<Self> {
        let url = url.into();
        url::Url::parse(&url)?;

        let client = reqwest::Client::builder().timeout(config::network::timeout()).build()?;
        Ok(Self { client, url })
    }

    /// Client for [`config::WEBHOOK_URL`]
    pub fn from_env() -> AppResult<Self> {
        Self::new(config::WEBHOOK_URL.as_str())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, payload: &WebhookPayload<'_>) -> AppResult<reqwest::Response> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::HttpStatus(response.status()));
        }
        Ok(response)
    }
}

#[async_trait]
impl AuthService for WebhookClient {
    async fn authorize(&self, user: &TelegramUser) -> AppResult<Value> {
        let payload = WebhookPayload::auth(user);
        log::info!("📤 [API] Sending auth request: {:?}", payload);

        let body = self.post(&payload).await?.text().await?;
        // Plain-text bodies are kept as strings and rejected by the caller
        let raw = serde_json::from_str(&body).unwrap_or(Value::String(body));
        let result = unwrap_response(raw);

        log::info!("✅ [API] Auth response: {}", result);
        Ok(result)
    }

    async fn send_qr_data(&self, qr_data: &str, user: &TelegramUser) -> AppResult<()> {
        let payload = WebhookPayload::qr(qr_data, user);
        log::info!("📤 [API] Sending QR data: {:?}", payload);

        self.post(&payload).await?;

        log::info!("✅ [API] QR data sent");
        Ok(())
    }
}
