use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use sse::{QueueFullPolicy, DEFAULT_QUEUE_CAPACITY};
use std::time::Duration;

const DEFAULT_SUBSCRIPTION_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Number of events buffered per subscriber before the queue-full policy applies
    #[arg(
        long,
        env,
        default_value_t = DEFAULT_QUEUE_CAPACITY,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..),
    )]
    pub event_queue_capacity: usize,

    /// What publishing does when a subscriber's queue is full: wait for room, or drop the new event
    #[arg(
        long,
        env,
        default_value_t = QueueFullPolicy::Block,
        value_parser = clap::builder::PossibleValuesParser::new([
            "block", "drop-newest",
            "BLOCK", "DROP-NEWEST"
        ])
            .map(|s| s.parse::<QueueFullPolicy>().unwrap()),
    )]
    pub queue_full_policy: QueueFullPolicy,

    /// Seconds a subscriber stream may stay idle before it is sent a timeout event and closed
    #[arg(long, env, default_value_t = DEFAULT_SUBSCRIPTION_TIMEOUT_SECS)]
    subscription_timeout_secs: u64,

    /// Finer-grained idle timeout set programmatically; takes precedence over the seconds value.
    #[arg(skip)]
    subscription_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn interface(&self) -> &str {
        self.interface.as_deref().unwrap_or("127.0.0.1")
    }

    pub fn set_subscription_timeout(mut self, timeout: Duration) -> Self {
        self.subscription_timeout = Some(timeout);
        self
    }

    pub fn subscription_timeout(&self) -> Duration {
        self.subscription_timeout
            .unwrap_or(Duration::from_secs(self.subscription_timeout_secs))
    }
}
