use crate::adapters::SystemClock;
use crate::config::AppConfig;
use crate::ports::PushSender;
use crate::push::{DispatchSettings, InMemoryRegistry, PushDispatcher};

use std::sync::Arc;

pub type Registry = InMemoryRegistry<SystemClock>;
pub type Dispatcher<S> = PushDispatcher<Registry, S, SystemClock>;

#[derive(Clone)]
pub struct AppState<S> {
    pub config: Arc<AppConfig>,
    pub registry: Arc<Registry>,
    /// `None` when no push transport is configured.
    pub dispatcher: Option<Arc<Dispatcher<S>>>,
}

impl<S: PushSender> AppState<S> {
    pub fn new(config: AppConfig, sender: Option<S>) -> Self {
        let clock = SystemClock::new(config.utc_offset);
        let registry = Arc::new(InMemoryRegistry::new(clock));
        let settings = DispatchSettings {
            send_timeout: config.send_timeout,
            max_payload_bytes: config.max_payload_bytes,
        };
        let dispatcher = sender.map(|sender| {
            Arc::new(PushDispatcher::new(
                Arc::clone(&registry),
                sender,
                clock,
                settings,
            ))
        });

        Self {
            config: Arc::new(config),
            registry,
            dispatcher,
        }
    }
}
