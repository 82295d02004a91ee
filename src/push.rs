use crate::adapters::WebPushSender;
use crate::config;

pub mod dispatcher;
pub mod filter;
pub mod registry;
pub mod vapid;

pub use dispatcher::{DeliveryReport, DispatchSettings, MAX_PUSH_PAYLOAD_BYTES, PushDispatcher};
pub use filter::FlashSaleFilter;
pub use registry::InMemoryRegistry;
pub use vapid::{VapidConfigStatus, VapidCredentials, generate_vapid_credentials, load_vapid_config};

/// Builds the web-push transport, or `None` when push is not configured.
pub fn build_sender(config: &config::AppConfig) -> Option<WebPushSender> {
    let vapid = match load_vapid_config(config) {
        VapidConfigStatus::Ready(vapid) => vapid,
        VapidConfigStatus::Incomplete => {
            tracing::warn!("push notifications disabled: incomplete VAPID configuration");
            return None;
        }
        VapidConfigStatus::Missing => {
            tracing::info!("push notifications disabled: no VAPID configuration");
            return None;
        }
    };

    match WebPushSender::new(vapid) {
        Ok(sender) => Some(sender),
        Err(err) => {
            tracing::error!("push notifications disabled: failed to init web-push ({err})");
            None
        }
    }
}
