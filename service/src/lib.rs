use config::Config;
use log::info;
use sse::Broker;
use std::sync::Arc;

pub mod config;
pub mod logging;

/// Build the broker described by `config`.
pub fn init_broker(config: &Config) -> Arc<Broker> {
    info!(
        "Broker config: event_queue_capacity={}, queue_full_policy={}, subscription_timeout={:?}",
        config.event_queue_capacity,
        config.queue_full_policy,
        config.subscription_timeout(),
    );

    Arc::new(Broker::new(
        config.event_queue_capacity,
        config.queue_full_policy,
    ))
}

// Service-level state shared by every request handler
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub broker: Arc<Broker>,
    pub config: Config,
}

impl AppState {
    pub fn new(app_config: Config, broker: &Arc<Broker>) -> Self {
        Self {
            broker: Arc::clone(broker),
            config: app_config,
        }
    }

    pub fn broker_ref(&self) -> &Broker {
        self.broker.as_ref()
    }
}
