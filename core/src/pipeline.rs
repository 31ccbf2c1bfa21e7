// # 📂 src/pipeline.rs

// ## Pipeline wiring + driver (no business logic)

//! Topology:
//!
//! ```text
//! transaction-generator ──► tee ──► fraud-relay ─────► fraud-detection
//!                               └─► analytics-relay ─► analytics
//! ```
//!
//! One `CancellationToken` is observed by the generator and both relays.
//! The driver fires it after `run_duration` (or on demand) and then gives
//! every stage at most `grace_period` to exit.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::cancel::CancellationToken;
use crate::config::PipelineConfig;
use crate::constants::stage_names;
use crate::sink::{
    spawn_consumer, AggregateReport, AggregationSink, ConsumerHandles, ThresholdReport,
    ThresholdSink,
};
use crate::stream::{spawn_transaction_generator, tee, RandomAmounts, StageHandle, StageSet};
use crate::telemetry::{PipelineReport, StageReport};
use crate::types::PipelineError;

/// A wired, running pipeline.
pub struct RunningPipeline {
    config: PipelineConfig,
    token: CancellationToken,
    stages: StageSet,
    started: Instant,
    source: StageHandle<StageReport>,
    tee: StageHandle<StageReport>,
    fraud: ConsumerHandles<ThresholdReport>,
    analytics: ConsumerHandles<AggregateReport>,
}

impl RunningPipeline {
    /// Validate `config`, wire every stage, and start them.
    pub fn spawn(config: &PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let token = CancellationToken::new();
        let stages = StageSet::new();

        match wire(config, &token, &stages) {
            Ok(Wired {
                source,
                tee,
                fraud,
                analytics,
            }) => {
                info!(
                    "[PIPELINE] started (events={}, delay={:?}, threshold={})",
                    config.event_count, config.event_delay, config.threshold
                );
                Ok(Self {
                    config: config.clone(),
                    token,
                    stages,
                    started: Instant::now(),
                    source,
                    tee,
                    fraud,
                    analytics,
                })
            }
            Err(e) => {
                // Unwind whatever was already started.
                token.fire();
                Err(e)
            }
        }
    }

    /// Handle observed by every cancellable stage.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Fire cancellation now. Returns `false` if it had already fired.
    pub fn cancel(&self) -> bool {
        self.token.fire()
    }

    /// Wait up to `timeout` for every stage to exit on its own.
    pub fn wait_finished(&self, timeout: Duration) -> bool {
        self.stages.wait_all(Instant::now() + timeout).is_ok()
    }

    /// Names of stages still running.
    pub fn pending(&self) -> Vec<&'static str> {
        self.stages.pending()
    }

    /// Let the pipeline run for `run_duration` (returning early if every
    /// stage finishes first), then fire and shut down within `grace_period`.
    pub fn run_to_completion(self) -> Result<PipelineReport, PipelineError> {
        let deadline = self.started + self.config.run_duration;
        if self.stages.wait_all(deadline).is_ok() {
            info!("[PIPELINE] all stages finished before cancellation");
        }
        let grace = self.config.grace_period;
        self.shutdown(grace)
    }

    /// Fire cancellation (if stages are still running) and wait at most
    /// `grace` for every stage to exit.
    pub fn shutdown(self, grace: Duration) -> Result<PipelineReport, PipelineError> {
        if !self.stages.pending().is_empty() && self.token.fire() {
            info!("[PIPELINE] cancellation fired, grace period {:?}", grace);
        }
        let cancelled = self.token.is_fired();

        if let Err(e) = self.stages.wait_all(Instant::now() + grace) {
            warn!("[PIPELINE] {}", e);
            return Err(e);
        }

        let source = self.source.join()?;
        let tee = self.tee.join()?;
        let fraud_relay = self.fraud.relay.join()?;
        let analytics_relay = self.analytics.relay.join()?;
        let fraud = self.fraud.sink.join()?;
        let analytics = self.analytics.sink.join()?;

        info!("[PIPELINE] Main: All pipelines stopped.");
        Ok(PipelineReport::new(
            vec![
                source,
                tee,
                fraud_relay,
                analytics_relay,
                fraud.stage,
                analytics.stage,
            ],
            fraud.report,
            analytics.report,
            cancelled,
            self.started.elapsed(),
        ))
    }
}

struct Wired {
    source: StageHandle<StageReport>,
    tee: StageHandle<StageReport>,
    fraud: ConsumerHandles<ThresholdReport>,
    analytics: ConsumerHandles<AggregateReport>,
}

fn wire(
    config: &PipelineConfig,
    token: &CancellationToken,
    stages: &StageSet,
) -> Result<Wired, PipelineError> {
    let amounts = RandomAmounts::new(config.event_count, config.value_range(), config.seed)?;
    let (transactions, source) =
        spawn_transaction_generator(stages, token, amounts, config.event_delay)?;
    let (fraud_branch, analytics_branch, splitter) =
        tee(stages, stage_names::TEE, transactions, config.tie_break)?;

    let fraud = spawn_consumer(
        stages,
        stage_names::FRAUD_RELAY,
        stage_names::FRAUD_SINK,
        token,
        fraud_branch,
        ThresholdSink::new(config.threshold),
    )?;
    let analytics = spawn_consumer(
        stages,
        stage_names::ANALYTICS_RELAY,
        stage_names::ANALYTICS_SINK,
        token,
        analytics_branch,
        AggregationSink::new(),
    )?;
    Ok(Wired {
        source,
        tee: splitter,
        fraud,
        analytics,
    })
}

/// Driver entry point: spawn, run for `run_duration`, cancel, drain.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport, PipelineError> {
    RunningPipeline::spawn(config)?.run_to_completion()
}
