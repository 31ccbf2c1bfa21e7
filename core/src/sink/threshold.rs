use serde::Serialize;
use tracing::info;

use super::Sink;
use crate::types::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Flagged,
    Normal,
}

/// `Flagged` only when `amount` is strictly above `threshold`.
pub fn classify(amount: Event, threshold: Event) -> Classification {
    if amount > threshold {
        Classification::Flagged
    } else {
        Classification::Normal
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThresholdReport {
    pub threshold: Event,
    /// Every received event with its class, in arrival order.
    pub classified: Vec<(Event, Classification)>,
    pub flagged: u64,
    pub normal: u64,
}

/// Fraud detection sink.
#[derive(Debug)]
pub struct ThresholdSink {
    report: ThresholdReport,
}

impl ThresholdSink {
    pub fn new(threshold: Event) -> Self {
        Self {
            report: ThresholdReport {
                threshold,
                ..ThresholdReport::default()
            },
        }
    }
}

impl Sink for ThresholdSink {
    type Report = ThresholdReport;

    fn tag(&self) -> &'static str {
        "FRAUD"
    }

    fn accept(&mut self, event: Event) {
        let class = classify(event, self.report.threshold);
        match class {
            Classification::Flagged => {
                self.report.flagged += 1;
                info!("[FRAUD] Suspicious transaction detected: {}", event);
            }
            Classification::Normal => {
                self.report.normal += 1;
                info!("[FRAUD] Normal transaction: {}", event);
            }
        }
        self.report.classified.push((event, class));
    }

    fn finish(self) -> ThresholdReport {
        self.report
    }
}
