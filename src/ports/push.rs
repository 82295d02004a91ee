use crate::error::TransportError;
use crate::types::push::Subscription;

/// Opaque push transport. `Ok` means the gateway accepted the message for
/// delivery, nothing more.
pub trait PushSender: Clone + Send + Sync + 'static {
    type Fut<'a>: Future<Output = Result<(), TransportError>> + Send + 'a
    where
        Self: 'a;

    fn send<'a>(&'a self, subscription: &'a Subscription, payload: &'a [u8]) -> Self::Fut<'a>;
}
