// # 📂 `src/config.rs`

//! Pipeline configuration.
//!
//! Every field is independent and has a default (see `constants`). JSON
//! files use milliseconds for durations:
//!
//! ```json
//! { "event_count": 50, "event_delay_ms": 10, "run_duration_ms": 2000 }
//! ```

use std::fs;
use std::ops::Range;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_EVENT_COUNT, DEFAULT_EVENT_DELAY, DEFAULT_GRACE_PERIOD, DEFAULT_RUN_DURATION,
    DEFAULT_THRESHOLD, DEFAULT_VALUE_MAX, DEFAULT_VALUE_MIN,
};
use crate::stream::TieBreak;
use crate::types::{Event, PipelineError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Events the generator emits before ending on its own.
    pub event_count: usize,
    /// Generated amounts fall in `[value_min, value_max)`.
    pub value_min: Event,
    pub value_max: Event,
    #[serde(rename = "event_delay_ms", with = "millis")]
    pub event_delay: Duration,
    /// Amounts strictly above this are flagged.
    pub threshold: Event,
    #[serde(rename = "run_duration_ms", with = "millis")]
    pub run_duration: Duration,
    #[serde(rename = "grace_period_ms", with = "millis")]
    pub grace_period: Duration,
    /// Fixed generator seed; `None` uses OS entropy.
    pub seed: Option<u64>,
    pub tie_break: TieBreak,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            event_count: DEFAULT_EVENT_COUNT,
            value_min: DEFAULT_VALUE_MIN,
            value_max: DEFAULT_VALUE_MAX,
            event_delay: DEFAULT_EVENT_DELAY,
            threshold: DEFAULT_THRESHOLD,
            run_duration: DEFAULT_RUN_DURATION,
            grace_period: DEFAULT_GRACE_PERIOD,
            seed: None,
            tie_break: TieBreak::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.value_min >= self.value_max {
            return Err(PipelineError::Config(format!(
                "value range [{}, {}) is empty",
                self.value_min, self.value_max
            )));
        }
        Ok(())
    }

    pub fn value_range(&self) -> Range<Event> {
        self.value_min..self.value_max
    }

    pub fn from_json_str(s: &str) -> Result<Self, PipelineError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.event_count, 200);
        assert_eq!(config.value_range(), 0..1000);
        assert_eq!(config.event_delay, Duration::from_millis(100));
        assert_eq!(config.threshold, 700);
        assert_eq!(config.run_duration, Duration::from_secs(10));
        assert_eq!(config.grace_period, Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_overrides_only_given_fields() {
        let config = PipelineConfig::from_json_str(
            r#"{ "event_count": 5, "event_delay_ms": 0, "tie_break": "in_order", "seed": 9 }"#,
        )
        .unwrap();
        assert_eq!(config.event_count, 5);
        assert_eq!(config.event_delay, Duration::ZERO);
        assert_eq!(config.tie_break, TieBreak::InOrder);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn empty_range_is_rejected() {
        let err = PipelineConfig::from_json_str(r#"{ "value_min": 10, "value_max": 10 }"#)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn unknown_field_is_a_parse_error() {
        let err = PipelineConfig::from_json_str(r#"{ "events": 5 }"#).unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }
}
