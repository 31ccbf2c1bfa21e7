//! Defaults used when a config field is not set.
use std::time::Duration;

/// Number of transactions the generator emits before ending on its own.
pub const DEFAULT_EVENT_COUNT: usize = 200;

/// Half-open range `[min, max)` of generated transaction amounts.
pub const DEFAULT_VALUE_MIN: i64 = 0;
pub const DEFAULT_VALUE_MAX: i64 = 1000;

/// Pause after each delivered transaction, emulating real-time arrival.
pub const DEFAULT_EVENT_DELAY: Duration = Duration::from_millis(100);

/// Amounts strictly above this are flagged by the fraud detector.
pub const DEFAULT_THRESHOLD: i64 = 700;

/// How long the driver lets the pipeline run before firing cancellation.
pub const DEFAULT_RUN_DURATION: Duration = Duration::from_secs(10);

/// How long the driver waits for stages to exit after firing.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(1);

/// Stage names, used in logs and reports.
pub mod stage_names {
    pub const SOURCE: &str = "transaction-generator";
    pub const TEE: &str = "tee";
    pub const FRAUD_RELAY: &str = "fraud-relay";
    pub const ANALYTICS_RELAY: &str = "analytics-relay";
    pub const FRAUD_SINK: &str = "fraud-detection";
    pub const ANALYTICS_SINK: &str = "analytics";
}
