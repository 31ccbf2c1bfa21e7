use serde::Serialize;
use tracing::{debug, info};

use super::Sink;
use crate::types::Event;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    /// Widened so that any number of `i64` amounts sums without overflow.
    pub total: i128,
    pub count: u64,
    /// Integer (truncating) average; `None` when nothing was received.
    pub average: Option<i64>,
}

/// Analytics sink: running sum and count.
#[derive(Debug, Default)]
pub struct AggregationSink {
    total: i128,
    count: u64,
}

impl AggregationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn average(&self) -> Option<i64> {
        if self.count == 0 {
            return None;
        }
        // A mean of i64 values is always within i64 range.
        i64::try_from(self.total / i128::from(self.count)).ok()
    }
}

impl Sink for AggregationSink {
    type Report = AggregateReport;

    fn tag(&self) -> &'static str {
        "ANALYTICS"
    }

    fn accept(&mut self, event: Event) {
        info!("[ANALYTICS] Processing transaction: {}", event);
        self.total += i128::from(event);
        self.count += 1;
        debug!("[ANALYTICS] running total={} count={}", self.total, self.count);
    }

    fn finish(self) -> AggregateReport {
        let average = self.average();
        if let Some(avg) = average {
            info!("[ANALYTICS] Average transaction amount: {}", avg);
        }
        AggregateReport {
            total: self.total,
            count: self.count,
            average,
        }
    }
}
