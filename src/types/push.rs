use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use super::preferences::Preferences;

pub type SubscriptionId = Uuid;

#[derive(Debug, Clone)]
pub struct VapidConfig {
    pub private_key: String,
    pub public_key: String,
    pub subject: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// The browser-issued push address, as posted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEndpoint {
    pub endpoint: String,
    #[serde(default)]
    pub keys: SubscriptionKeys,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: SubscriptionId,
    pub endpoint: String,
    pub keys: SubscriptionKeys,
    pub preferences: Preferences,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub client_metadata: Option<String>,
}

impl Subscription {
    pub fn new(
        endpoint: PushEndpoint,
        preferences: Preferences,
        created_at: OffsetDateTime,
        client_metadata: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            endpoint: endpoint.endpoint,
            keys: endpoint.keys,
            preferences,
            created_at,
            client_metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

impl NotificationAction {
    pub fn new(action: &str, title: &str) -> Self {
        Self {
            action: action.to_string(),
            title: title.to_string(),
        }
    }
}

/// Routing data carried with a notification. `url` is where a click lands;
/// anything else rides along untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NotificationData {
    pub fn with_url(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            extra: Map::new(),
        }
    }
}

/// Message handed to the push transport, JSON encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<NotificationData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<NotificationAction>,
}

impl NotificationPayload {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            icon: None,
            image: None,
            badge: None,
            tag: None,
            data: None,
            actions: Vec::new(),
        }
    }

    pub fn flash_sale() -> Self {
        let mut data = NotificationData::with_url("/");
        data.extra
            .insert("productId".to_string(), Value::String("1".to_string()));
        data.extra
            .insert("action".to_string(), Value::String("flash-sale".to_string()));

        Self {
            icon: Some("/icons/icon-192x192.png".to_string()),
            image: Some("/images/flash-sale.jpg".to_string()),
            badge: Some("/icons/badge-72x72.png".to_string()),
            tag: Some("flash-sale".to_string()),
            data: Some(data),
            actions: vec![
                NotificationAction::new("view", "View Deal"),
                NotificationAction::new("dismiss", "Dismiss"),
            ],
            ..Self::new(
                "🚀 Flash Sale Started!",
                "50% OFF on all electronics! Limited time offer!",
            )
        }
    }
}
