use std::{net::SocketAddr, time::Duration};

use isuride_core::constants::{DISTANCE_FLUSH_INTERVAL, DISTANCE_QUEUE_CAPACITY};
use isuride_core::distance::DistanceWriterConfig;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// When set, the built-in scheduler runs a matching pass at this cadence.
    pub matching_interval: Option<Duration>,
    pub distance_flush_interval: Duration,
    pub distance_queue_capacity: usize,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("ISURIDE_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .expect("Invalid ISURIDE_LISTEN_ADDR");
        let db_path =
            std::env::var("ISURIDE_DB_PATH").unwrap_or_else(|_| "./db/isuride.db".into());
        let cors_allow = std::env::var("ISURIDE_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms = env_u64("ISURIDE_REQUEST_TIMEOUT_MS").unwrap_or(30000);
        let matching_interval = env_u64("ISURIDE_MATCHING_INTERVAL_MS")
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);
        let distance_flush_interval = env_u64("ISURIDE_DISTANCE_FLUSH_MS")
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(DISTANCE_FLUSH_INTERVAL);
        let distance_queue_capacity = env_u64("ISURIDE_DISTANCE_QUEUE_CAPACITY")
            .and_then(|n| usize::try_from(n).ok())
            .filter(|n| *n > 0)
            .unwrap_or(DISTANCE_QUEUE_CAPACITY);
        Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            matching_interval,
            distance_flush_interval,
            distance_queue_capacity,
        }
    }

    pub fn distance_writer_config(&self) -> DistanceWriterConfig {
        DistanceWriterConfig {
            queue_capacity: self.distance_queue_capacity,
            flush_interval: self.distance_flush_interval,
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
