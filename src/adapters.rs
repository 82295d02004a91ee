use std::pin::Pin;
use std::sync::Arc;

use time::{OffsetDateTime, UtcOffset};

use crate::error::TransportError;
use crate::ports;
use crate::types::push::{Subscription, VapidConfig};

/// Wall clock shifted to the offset quiet hours are evaluated in.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(UtcOffset::UTC)
    }
}

impl ports::TimeProvider for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }
}

#[derive(Clone)]
pub struct WebPushSender {
    vapid: VapidConfig,
    client: Arc<web_push::WebPushClient>,
}

impl WebPushSender {
    pub fn new(vapid: VapidConfig) -> Result<Self, web_push::WebPushError> {
        let client = web_push::WebPushClient::new()?;
        Ok(Self {
            vapid,
            client: Arc::new(client),
        })
    }

    async fn send_raw(
        &self,
        subscription: &Subscription,
        payload: &[u8],
    ) -> Result<(), web_push::WebPushError> {
        let subscription_info = web_push::SubscriptionInfo::new(
            subscription.endpoint.clone(),
            subscription.keys.p256dh.clone(),
            subscription.keys.auth.clone(),
        );
        let mut builder = web_push::WebPushMessageBuilder::new(&subscription_info)?;
        builder.set_payload(web_push::ContentEncoding::Aes128Gcm, payload);
        let mut signature_builder = web_push::VapidSignatureBuilder::from_base64(
            &self.vapid.private_key,
            web_push::URL_SAFE_NO_PAD,
            &subscription_info,
        )?;
        signature_builder.add_claim("sub", self.vapid.subject.as_str());
        builder.set_vapid_signature(signature_builder.build()?);
        self.client.send(builder.build()?).await
    }
}

impl ports::PushSender for WebPushSender {
    type Fut<'a>
        = Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>>
    where
        Self: 'a;

    fn send<'a>(&'a self, subscription: &'a Subscription, payload: &'a [u8]) -> Self::Fut<'a> {
        Box::pin(async move {
            self.send_raw(subscription, payload)
                .await
                .map_err(classify_web_push_error)
        })
    }
}

/// Gone and invalid endpoints are permanent. An oversized payload is
/// rejected outright; everything else may succeed on a later attempt.
fn classify_web_push_error(err: web_push::WebPushError) -> TransportError {
    match err {
        web_push::WebPushError::EndpointNotValid | web_push::WebPushError::EndpointNotFound => {
            TransportError::permanent(err.to_string())
        }
        web_push::WebPushError::PayloadTooLarge => TransportError::rejected(err.to_string()),
        other => TransportError::transient(other.to_string()),
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::ports::TimeProvider;

    #[test]
    fn classify_web_push_error__should_mark_gone_endpoints_permanent() {
        assert!(classify_web_push_error(web_push::WebPushError::EndpointNotFound).is_permanent());
        assert!(classify_web_push_error(web_push::WebPushError::EndpointNotValid).is_permanent());
        assert!(!classify_web_push_error(web_push::WebPushError::Unspecified).is_permanent());
    }

    #[test]
    fn classify_web_push_error__should_not_retry_oversized_payload() {
        // When
        let error = classify_web_push_error(web_push::WebPushError::PayloadTooLarge);

        // Then
        assert!(!error.is_retryable());
        assert!(!error.is_permanent());
        assert!(classify_web_push_error(web_push::WebPushError::Unspecified).is_retryable());
    }

    #[test]
    fn system_clock__should_report_configured_offset() {
        // Given
        let offset = UtcOffset::from_hms(2, 0, 0).expect("offset");

        // When
        let now = SystemClock::new(offset).now();

        // Then
        assert_eq!(now.offset(), offset);
    }
}
