pub mod push;
pub mod registry;
pub mod time;
pub mod worker;

pub use push::PushSender;
pub use registry::SubscriptionStore;
pub use time::TimeProvider;
pub use worker::{Fetcher, NotificationDisplay, WindowClients};
