use std::time::Duration;

/// Pending distance deltas the aggregation writer will buffer before
/// `enqueue` starts reporting a full queue.
pub const DISTANCE_QUEUE_CAPACITY: usize = 1000;

/// Interval between total-distance flushes.
pub const DISTANCE_FLUSH_INTERVAL: Duration = Duration::from_secs(2);

/// Topic prefix for per-ride notification streams.
pub const RIDE_TOPIC_PREFIX: &str = "ride:";

/// Topic prefix for per-chair notification streams.
pub const CHAIR_TOPIC_PREFIX: &str = "chair:";

/// Random bytes in a chair access token (hex encoded, so twice as many chars).
pub const ACCESS_TOKEN_BYTES: usize = 32;
