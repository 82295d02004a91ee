use crate::error::{DisplayError, WindowError};
use crate::ports::{NotificationDisplay, WindowClients};
use crate::types::push::{NotificationAction, NotificationData};
use crate::types::worker::DisplayedNotification;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

const DEFAULT_TITLE: &str = "FlashStore";
const DEFAULT_BODY: &str = "New notification from FlashStore";
const FALLBACK_BODY: &str = "New flash sale available!";
const DEFAULT_ICON: &str = "/icons/icon-192x192.png";
const DEFAULT_BADGE: &str = "/icons/badge-72x72.png";
const DEFAULT_TAG: &str = "flashstore-notification";

#[derive(Debug, Error)]
pub enum PresenterError {
    #[error(transparent)]
    Display(#[from] DisplayError),

    #[error(transparent)]
    Window(#[from] WindowError),
}

/// What a click ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Focused(String),
    Opened(Url),
}

/// Inbound push body. Every field is optional; the sender decides what to
/// fill in.
#[derive(Debug, Default, Deserialize)]
struct PushMessage {
    title: Option<String>,
    body: Option<String>,
    icon: Option<String>,
    image: Option<String>,
    badge: Option<String>,
    tag: Option<String>,
    data: Option<NotificationData>,
    actions: Option<Vec<NotificationAction>>,
}

impl PushMessage {
    fn malformed() -> Self {
        Self {
            title: Some(DEFAULT_TITLE.to_string()),
            body: Some(FALLBACK_BODY.to_string()),
            icon: Some(DEFAULT_ICON.to_string()),
            ..Self::default()
        }
    }

    fn into_notification(self) -> DisplayedNotification {
        DisplayedNotification {
            title: self.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            body: self.body.unwrap_or_else(|| DEFAULT_BODY.to_string()),
            icon: self.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
            badge: self.badge.unwrap_or_else(|| DEFAULT_BADGE.to_string()),
            image: self.image,
            tag: self.tag.unwrap_or_else(|| DEFAULT_TAG.to_string()),
            data: self.data.unwrap_or_else(|| NotificationData::with_url("/")),
            actions: self.actions.unwrap_or_else(|| {
                vec![
                    NotificationAction::new("view", "View"),
                    NotificationAction::new("dismiss", "Dismiss"),
                ]
            }),
            require_interaction: true,
        }
    }
}

/// Turns a raw push body into a notification with every field filled in. A
/// missing body means all defaults; an unparseable one still produces a
/// notification.
pub fn resolve(raw: Option<&[u8]>) -> DisplayedNotification {
    let message = match raw {
        None => PushMessage::default(),
        Some(bytes) => serde_json::from_slice(bytes).unwrap_or_else(|err| {
            tracing::warn!("malformed push payload, using default: {err}");
            PushMessage::malformed()
        }),
    };
    message.into_notification()
}

pub struct NotificationPresenter<D, W> {
    display: D,
    windows: W,
    origin: Url,
}

impl<D: NotificationDisplay, W: WindowClients> NotificationPresenter<D, W> {
    pub fn new(display: D, windows: W, origin: Url) -> Self {
        Self {
            display,
            windows,
            origin,
        }
    }

    pub async fn on_push_received(
        &self,
        raw: Option<&[u8]>,
    ) -> Result<DisplayedNotification, PresenterError> {
        let notification = resolve(raw);
        self.display.show(&notification).await?;
        tracing::debug!(tag = %notification.tag, "notification displayed");
        Ok(notification)
    }

    pub async fn on_notification_clicked(
        &self,
        notification: &DisplayedNotification,
    ) -> Result<ClickOutcome, PresenterError> {
        self.display.close(notification).await?;

        let target = self.target_url(notification);
        let clients = self.windows.list().await;
        if let Some(client) = clients.iter().find(|client| client.url == target) {
            self.windows.focus(client).await?;
            return Ok(ClickOutcome::Focused(client.id.clone()));
        }

        self.windows.open(&target).await?;
        Ok(ClickOutcome::Opened(target))
    }

    fn target_url(&self, notification: &DisplayedNotification) -> Url {
        let raw = notification.data.url.as_deref().unwrap_or("/");
        match self.origin.join(raw) {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!(url = raw, "invalid click target, using app root: {err}");
                self.origin.clone()
            }
        }
    }
}
