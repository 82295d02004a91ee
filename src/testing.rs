use crate::error::{DisplayError, NetworkError, TransportError, WindowError};
use crate::ports;
use crate::types::push::{PushEndpoint, Subscription, SubscriptionKeys};
use crate::types::worker::{CachedResponse, DisplayedNotification, ResourceRequest, WindowClient};

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use time::OffsetDateTime;
use url::Url;

#[derive(Debug, Clone)]
pub(crate) struct FixedClock {
    now: Arc<Mutex<OffsetDateTime>>,
}

impl FixedClock {
    pub(crate) fn new(now: OffsetDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub(crate) fn set(&self, now: OffsetDateTime) {
        *self.now.lock().expect("clock lock") = now;
    }
}

impl ports::TimeProvider for FixedClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().expect("clock lock")
    }
}

pub(crate) fn endpoint(name: &str) -> PushEndpoint {
    PushEndpoint {
        endpoint: format!("https://push.example/{name}"),
        keys: SubscriptionKeys {
            p256dh: "p256".to_string(),
            auth: "auth".to_string(),
        },
    }
}

type SendHook = Box<dyn Fn() + Send + Sync>;

/// Records every accepted payload; fails, stalls or runs a hook for
/// configured endpoints.
#[derive(Clone, Default)]
pub(crate) struct RecordingSender {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    failures: Arc<Mutex<HashMap<String, TransportError>>>,
    stalls: Arc<Mutex<HashMap<String, Duration>>>,
    hooks: Arc<Mutex<HashMap<String, SendHook>>>,
}

impl RecordingSender {
    pub(crate) fn fail_for(&self, endpoint: &str, error: TransportError) {
        self.failures
            .lock()
            .expect("failures lock")
            .insert(endpoint.to_string(), error);
    }

    pub(crate) fn stall_for(&self, endpoint: &str, delay: Duration) {
        self.stalls
            .lock()
            .expect("stalls lock")
            .insert(endpoint.to_string(), delay);
    }

    /// Runs `hook` each time a send to `endpoint` starts.
    pub(crate) fn on_send(&self, endpoint: &str, hook: impl Fn() + Send + Sync + 'static) {
        self.hooks
            .lock()
            .expect("hooks lock")
            .insert(endpoint.to_string(), Box::new(hook));
    }

    pub(crate) fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("sent lock").clone()
    }
}

impl ports::PushSender for RecordingSender {
    type Fut<'a>
        = Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>>
    where
        Self: 'a;

    fn send<'a>(&'a self, subscription: &'a Subscription, payload: &'a [u8]) -> Self::Fut<'a> {
        let endpoint = subscription.endpoint.clone();
        let failure = self
            .failures
            .lock()
            .expect("failures lock")
            .get(&endpoint)
            .cloned();
        let stall = self.stalls.lock().expect("stalls lock").get(&endpoint).copied();
        if let Some(hook) = self.hooks.lock().expect("hooks lock").get(&endpoint) {
            hook();
        }
        let payload = String::from_utf8_lossy(payload).into_owned();
        Box::pin(async move {
            if let Some(delay) = stall {
                tokio::time::sleep(delay).await;
            }
            if let Some(error) = failure {
                return Err(error);
            }
            self.sent.lock().expect("sent lock").push((endpoint, payload));
            Ok(())
        })
    }
}

/// Serves canned responses by absolute URL; unknown URLs and offline mode
/// fail with a network error.
#[derive(Clone, Default)]
pub(crate) struct ScriptedFetcher {
    responses: Arc<Mutex<HashMap<String, CachedResponse>>>,
    calls: Arc<Mutex<Vec<String>>>,
    offline: Arc<AtomicBool>,
}

impl ScriptedFetcher {
    pub(crate) fn respond(&self, url: &str, response: CachedResponse) {
        self.responses
            .lock()
            .expect("responses lock")
            .insert(url.to_string(), response);
    }

    pub(crate) fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl ports::Fetcher for ScriptedFetcher {
    type Fut<'a>
        = Pin<Box<dyn Future<Output = Result<CachedResponse, NetworkError>> + Send + 'a>>
    where
        Self: 'a;

    fn fetch<'a>(&'a self, request: &'a ResourceRequest) -> Self::Fut<'a> {
        Box::pin(async move {
            let url = request.url.to_string();
            self.calls.lock().expect("calls lock").push(url.clone());
            if self.offline.load(Ordering::SeqCst) {
                return Err(NetworkError("offline".to_string()));
            }
            self.responses
                .lock()
                .expect("responses lock")
                .get(&url)
                .cloned()
                .ok_or_else(|| NetworkError(format!("no route to {url}")))
        })
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingDisplay {
    shown: Arc<Mutex<Vec<DisplayedNotification>>>,
    closed: Arc<Mutex<Vec<String>>>,
}

impl RecordingDisplay {
    pub(crate) fn shown(&self) -> Vec<DisplayedNotification> {
        self.shown.lock().expect("shown lock").clone()
    }

    pub(crate) fn closed(&self) -> Vec<String> {
        self.closed.lock().expect("closed lock").clone()
    }
}

impl ports::NotificationDisplay for RecordingDisplay {
    type Fut<'a>
        = Pin<Box<dyn Future<Output = Result<(), DisplayError>> + Send + 'a>>
    where
        Self: 'a;

    fn show<'a>(&'a self, notification: &'a DisplayedNotification) -> Self::Fut<'a> {
        Box::pin(async move {
            let mut shown = self.shown.lock().expect("shown lock");
            shown.retain(|existing| existing.tag != notification.tag);
            shown.push(notification.clone());
            Ok(())
        })
    }

    fn close<'a>(&'a self, notification: &'a DisplayedNotification) -> Self::Fut<'a> {
        Box::pin(async move {
            self.shown
                .lock()
                .expect("shown lock")
                .retain(|existing| existing.tag != notification.tag);
            self.closed
                .lock()
                .expect("closed lock")
                .push(notification.tag.clone());
            Ok(())
        })
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeWindows {
    open: Arc<Mutex<Vec<WindowClient>>>,
    focused: Arc<Mutex<Vec<String>>>,
    opened: Arc<Mutex<Vec<Url>>>,
}

impl FakeWindows {
    pub(crate) fn with_window(self, id: &str, url: &str) -> Self {
        self.open.lock().expect("open lock").push(WindowClient {
            id: id.to_string(),
            url: Url::parse(url).expect("window url"),
        });
        self
    }

    pub(crate) fn focused(&self) -> Vec<String> {
        self.focused.lock().expect("focused lock").clone()
    }

    pub(crate) fn opened(&self) -> Vec<Url> {
        self.opened.lock().expect("opened lock").clone()
    }
}

impl ports::WindowClients for FakeWindows {
    type ListFut<'a>
        = Pin<Box<dyn Future<Output = Vec<WindowClient>> + Send + 'a>>
    where
        Self: 'a;
    type Fut<'a>
        = Pin<Box<dyn Future<Output = Result<(), WindowError>> + Send + 'a>>
    where
        Self: 'a;

    fn list<'a>(&'a self) -> Self::ListFut<'a> {
        Box::pin(async move { self.open.lock().expect("open lock").clone() })
    }

    fn focus<'a>(&'a self, client: &'a WindowClient) -> Self::Fut<'a> {
        Box::pin(async move {
            self.focused
                .lock()
                .expect("focused lock")
                .push(client.id.clone());
            Ok(())
        })
    }

    fn open<'a>(&'a self, url: &'a Url) -> Self::Fut<'a> {
        Box::pin(async move {
            self.opened.lock().expect("opened lock").push(url.clone());
            Ok(())
        })
    }
}
