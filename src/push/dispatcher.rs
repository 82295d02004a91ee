use crate::error::{DispatchError, TransportError};
use crate::ports;
use crate::push::filter::FlashSaleFilter;
use crate::types::preferences::Preferences;
use crate::types::push::{NotificationPayload, Subscription, SubscriptionId};

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Largest plaintext the web-push transport will encrypt into a single
/// aes128gcm record.
pub const MAX_PUSH_PAYLOAD_BYTES: usize = 3052;

#[derive(Debug, Clone, Copy)]
pub struct DispatchSettings {
    pub send_timeout: Duration,
    pub max_payload_bytes: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            send_timeout: Duration::from_secs(10),
            max_payload_bytes: MAX_PUSH_PAYLOAD_BYTES,
        }
    }
}

/// Outcome of one recipient in a fan-out.
#[derive(Debug)]
pub struct DeliveryReport {
    pub subscription_id: SubscriptionId,
    pub endpoint: String,
    pub result: Result<(), DispatchError>,
}

#[derive(Debug)]
pub struct PushDispatcher<R, S, T> {
    registry: Arc<R>,
    sender: S,
    time: T,
    settings: DispatchSettings,
}

impl<R, S, T> PushDispatcher<R, S, T>
where
    R: ports::SubscriptionStore,
    S: ports::PushSender,
    T: ports::TimeProvider,
{
    pub fn new(registry: Arc<R>, sender: S, time: T, settings: DispatchSettings) -> Self {
        Self {
            registry,
            sender,
            time,
            settings,
        }
    }

    pub async fn send_to(
        &self,
        id: &SubscriptionId,
        payload: &NotificationPayload,
    ) -> Result<(), DispatchError> {
        let subscription = self
            .registry
            .find_by_id(id)
            .ok_or(DispatchError::NotFound)?;
        let encoded = encode_within(payload, self.settings.max_payload_bytes)?;
        self.deliver(&subscription, &encoded).await
    }

    pub async fn send_to_endpoint(
        &self,
        endpoint: &str,
        payload: &NotificationPayload,
    ) -> Result<(), DispatchError> {
        let subscription = self
            .registry
            .find(endpoint)
            .ok_or(DispatchError::NotFound)?;
        let encoded = encode_within(payload, self.settings.max_payload_bytes)?;
        self.deliver(&subscription, &encoded).await
    }

    /// Sends to every subscription whose preferences satisfy `filter`. The
    /// outer error is only for a payload that cannot be encoded at all; every
    /// per-recipient failure lands in its own report.
    pub async fn broadcast<F>(
        &self,
        payload: &NotificationPayload,
        filter: F,
    ) -> Result<Vec<DeliveryReport>, DispatchError>
    where
        F: Fn(&Preferences) -> bool,
    {
        let encoded = encode_within(payload, self.settings.max_payload_bytes)?;
        let recipients: Vec<Subscription> = self
            .registry
            .all()
            .into_iter()
            .filter(|subscription| filter(&subscription.preferences))
            .collect();
        tracing::debug!(recipients = recipients.len(), "broadcasting push payload");

        let deliveries = recipients.iter().map(|subscription| {
            let encoded = &encoded;
            async move {
                let result = self.deliver(subscription, encoded).await;
                DeliveryReport {
                    subscription_id: subscription.id,
                    endpoint: subscription.endpoint.clone(),
                    result,
                }
            }
        });
        Ok(join_all(deliveries).await)
    }

    /// Broadcast filtered by category overlap and the current local time.
    pub async fn broadcast_flash_sale<I, C>(
        &self,
        payload: &NotificationPayload,
        categories: I,
    ) -> Result<Vec<DeliveryReport>, DispatchError>
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        let filter = FlashSaleFilter::new(categories, self.time.now().time());
        self.broadcast(payload, |preferences| filter.matches(preferences))
            .await
    }

    async fn deliver(&self, subscription: &Subscription, encoded: &[u8]) -> Result<(), DispatchError> {
        let timeout = self.settings.send_timeout;
        let result = match tokio::time::timeout(timeout, self.sender.send(subscription, encoded)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::timeout(timeout)),
        };
        match result {
            Ok(()) => {
                tracing::info!(id = %subscription.id, "push accepted for delivery");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    id = %subscription.id,
                    endpoint = %subscription.endpoint,
                    "push delivery error: {err}"
                );
                Err(DispatchError::TransportRejected(err))
            }
        }
    }
}

/// Encodes `payload`, shedding optional fields until it fits under `limit`.
/// Title and body are never touched; if they alone are too big the payload
/// is rejected.
pub(crate) fn encode_within(
    payload: &NotificationPayload,
    limit: usize,
) -> Result<Vec<u8>, DispatchError> {
    let shed: [fn(&mut NotificationPayload); 5] = [
        |p| p.image = None,
        |p| p.actions.clear(),
        |p| p.badge = None,
        |p| p.icon = None,
        |p| {
            if let Some(data) = p.data.as_mut() {
                data.extra.clear();
            }
        },
    ];

    let mut encoded = serde_json::to_vec(payload)?;
    if encoded.len() <= limit {
        return Ok(encoded);
    }

    let mut trimmed = payload.clone();
    for step in shed {
        step(&mut trimmed);
        encoded = serde_json::to_vec(&trimmed)?;
        if encoded.len() <= limit {
            tracing::debug!(
                title = payload.title.as_str(),
                size = encoded.len(),
                "shed optional fields to fit push payload limit"
            );
            return Ok(encoded);
        }
    }

    Err(DispatchError::PayloadTooLarge {
        size: encoded.len(),
        limit,
    })
}
