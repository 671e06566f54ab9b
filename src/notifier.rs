use crate::config::ScraperConfig;
use crate::results::LinkRecord;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

/// Pushbullet endpoint for creating a push
pub const PUSHBULLET_API_URL: &str = "https://api.pushbullet.com/v2/pushes";

/// Outcome of a single notification attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The push service accepted the notification
    Sent,
    /// No credential is configured, nothing was sent
    Unconfigured,
    /// The request failed; details were logged
    Failed,
}

impl Delivery {
    pub fn is_sent(self) -> bool {
        self == Delivery::Sent
    }
}

/// Announces newly discovered links
///
/// Implementations never fail the caller: every problem is folded into the
/// returned [`Delivery`]. Rate limiting is left to the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, record: &LinkRecord) -> Delivery;
}

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    title: &'a str,
    body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
}

impl<'a> PushRequest<'a> {
    fn for_record(title: &'a str, record: &'a LinkRecord) -> Self {
        let url = Some(record.url.as_str()).filter(|u| !u.is_empty());
        Self {
            kind: if url.is_some() { "link" } else { "note" },
            title,
            body: format!("{}\n\nSource: {}", record.text, record.source_url),
            url,
        }
    }
}

/// Pushbullet client; a no-op when no access token is configured
pub struct PushbulletNotifier {
    client: Client,
    access_token: Option<String>,
    title: String,
    endpoint: String,
}

impl PushbulletNotifier {
    pub fn new(access_token: Option<String>, title: impl Into<String>) -> Self {
        if access_token.is_none() {
            ::log::warn!("PUSHBULLET_API_KEY is not set, push notifications will not be sent");
        }

        Self {
            client: Client::new(),
            access_token,
            title: title.into(),
            endpoint: PUSHBULLET_API_URL.to_string(),
        }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(
            config.pushbullet_api_key.clone(),
            config.notification_title.clone(),
        )
    }

    /// Send pushes somewhere other than the public API
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Notifier for PushbulletNotifier {
    async fn notify(&self, record: &LinkRecord) -> Delivery {
        let Some(token) = &self.access_token else {
            ::log::debug!("No access token, not sending push for {}", record.url);
            return Delivery::Unconfigured;
        };

        let request = PushRequest::for_record(&self.title, record);
        let response = self
            .client
            .post(&self.endpoint)
            .header("Access-Token", token)
            .json(&request)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                ::log::info!("Push notification sent: {}", record.text);
                Delivery::Sent
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                ::log::error!("Pushbullet rejected push for {}: {} {}", record.url, status, body);
                Delivery::Failed
            }
            Err(e) => {
                ::log::error!("Failed to send push for {}: {}", record.url, e);
                Delivery::Failed
            }
        }
    }
}
