//! Client-side worker: caches resources for offline use and turns push
//! messages into notifications.

pub mod cache;
pub mod notifications;
pub mod rules;
pub mod storage;

pub use cache::{CacheError, CacheStrategyEngine, CacheVersion, FetchOutcome, ResponseSource};
pub use notifications::{ClickOutcome, NotificationPresenter, PresenterError};
pub use rules::{CachePolicy, ClassificationRule, Generation, RequestMatcher};
pub use storage::CacheStorage;

use crate::ports::{Fetcher, NotificationDisplay, WindowClients};
use crate::types::worker::{DisplayedNotification, ResourceRequest};

use axum::body::Bytes;
use thiserror::Error;

#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(ResourceRequest),
    Push(Option<Bytes>),
    NotificationClick(DisplayedNotification),
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkerOutcome {
    Installed(usize),
    Activated(Vec<String>),
    Fetched(FetchOutcome),
    Displayed(DisplayedNotification),
    Clicked(ClickOutcome),
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Presenter(#[from] PresenterError),
}

pub struct ServiceWorker<F, D, W> {
    cache: CacheStrategyEngine<F>,
    presenter: NotificationPresenter<D, W>,
}

impl<F, D, W> ServiceWorker<F, D, W>
where
    F: Fetcher,
    D: NotificationDisplay,
    W: WindowClients,
{
    pub fn new(cache: CacheStrategyEngine<F>, presenter: NotificationPresenter<D, W>) -> Self {
        Self { cache, presenter }
    }

    pub fn cache(&self) -> &CacheStrategyEngine<F> {
        &self.cache
    }

    /// Resolves once every cache write, display request and window lookup
    /// the event caused has finished.
    pub async fn handle(&self, event: WorkerEvent) -> Result<WorkerOutcome, WorkerError> {
        let outcome = match event {
            WorkerEvent::Install => WorkerOutcome::Installed(self.cache.install().await?),
            WorkerEvent::Activate => WorkerOutcome::Activated(self.cache.activate()),
            WorkerEvent::Fetch(request) => WorkerOutcome::Fetched(self.cache.handle(&request).await?),
            WorkerEvent::Push(raw) => {
                WorkerOutcome::Displayed(self.presenter.on_push_received(raw.as_deref()).await?)
            }
            WorkerEvent::NotificationClick(notification) => WorkerOutcome::Clicked(
                self.presenter.on_notification_clicked(&notification).await?,
            ),
        };
        Ok(outcome)
    }
}
