pub mod preferences;
pub mod push;
pub mod worker;

pub use preferences::{Preferences, PreferencesPatch, QuietHours, QuietHoursPatch};
pub use push::{
    NotificationAction, NotificationData, NotificationPayload, PushEndpoint, Subscription,
    SubscriptionId, SubscriptionKeys, VapidConfig,
};
