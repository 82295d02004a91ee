use url::Url;

use crate::error::{DisplayError, NetworkError, WindowError};
use crate::types::worker::{CachedResponse, DisplayedNotification, ResourceRequest, WindowClient};

pub trait Fetcher: Send + Sync + 'static {
    type Fut<'a>: Future<Output = Result<CachedResponse, NetworkError>> + Send + 'a
    where
        Self: 'a;

    fn fetch<'a>(&'a self, request: &'a ResourceRequest) -> Self::Fut<'a>;
}

pub trait NotificationDisplay: Send + Sync + 'static {
    type Fut<'a>: Future<Output = Result<(), DisplayError>> + Send + 'a
    where
        Self: 'a;

    /// A notification whose tag matches an undismissed one replaces it.
    fn show<'a>(&'a self, notification: &'a DisplayedNotification) -> Self::Fut<'a>;

    fn close<'a>(&'a self, notification: &'a DisplayedNotification) -> Self::Fut<'a>;
}

pub trait WindowClients: Send + Sync + 'static {
    type ListFut<'a>: Future<Output = Vec<WindowClient>> + Send + 'a
    where
        Self: 'a;
    type Fut<'a>: Future<Output = Result<(), WindowError>> + Send + 'a
    where
        Self: 'a;

    fn list<'a>(&'a self) -> Self::ListFut<'a>;

    fn focus<'a>(&'a self, client: &'a WindowClient) -> Self::Fut<'a>;

    fn open<'a>(&'a self, url: &'a Url) -> Self::Fut<'a>;
}
