// # 📂 `tests/test_pipeline.rs`

// * ✅ natural completion before the run duration
// * ✅ bounded shutdown after the run duration
// * ✅ on-demand cancellation
// * ✅ seeded runs: both consumers see a prefix of the generated stream
// * ✅ amounts near i64::MAX aggregate without overflow
// * ✅ invalid config is rejected before anything starts

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use pipeline_core::config::PipelineConfig;
    use pipeline_core::constants::stage_names;
    use pipeline_core::pipeline::{run_pipeline, RunningPipeline};
    use pipeline_core::sink::Classification;
    use pipeline_core::stream::{RandomAmounts, TieBreak};
    use pipeline_core::types::PipelineError;

    // ------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------
    fn small_config(events: usize, delay: Duration, run: Duration) -> PipelineConfig {
        PipelineConfig {
            event_count: events,
            event_delay: delay,
            run_duration: run,
            grace_period: Duration::from_secs(2),
            seed: Some(7),
            ..PipelineConfig::default()
        }
    }

    // ------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------
    #[test]
    fn finishes_early_when_stream_ends() {
        let config = small_config(20, Duration::ZERO, Duration::from_secs(30));

        let started = Instant::now();
        let report = run_pipeline(&config).unwrap();
        assert!(started.elapsed() < Duration::from_secs(10));

        assert!(!report.cancelled);
        assert_eq!(report.analytics.count, 20);
        assert_eq!(report.fraud.classified.len(), 20);
        assert_eq!(report.dropped_on_shutdown(), 0);
        assert_eq!(report.stages.len(), 6);

        let expected: Vec<i64> = RandomAmounts::new(20, config.value_range(), config.seed)
            .unwrap()
            .collect();
        let seen: Vec<i64> = report.fraud.classified.iter().map(|(v, _)| *v).collect();
        assert_eq!(seen, expected);
        assert_eq!(
            report.analytics.total,
            expected.iter().map(|&v| i128::from(v)).sum::<i128>()
        );

        for (amount, class) in &report.fraud.classified {
            let flagged = *amount > config.threshold;
            assert_eq!(*class == Classification::Flagged, flagged);
        }
    }

    #[test]
    fn shuts_down_within_grace_after_run_duration() {
        let config = small_config(
            1_000,
            Duration::from_millis(10),
            Duration::from_millis(100),
        );

        let started = Instant::now();
        let report = run_pipeline(&config).unwrap();
        let elapsed = started.elapsed();

        assert!(report.cancelled);
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < config.run_duration + config.grace_period);
        assert!(report.analytics.count < 1_000);

        let source = report.stage(stage_names::SOURCE).unwrap();
        assert!(source.cancelled);
    }

    #[test]
    fn consumers_see_prefixes_of_the_source() {
        let config = PipelineConfig {
            tie_break: TieBreak::InOrder,
            ..small_config(500, Duration::from_millis(1), Duration::from_millis(50))
        };
        let report = run_pipeline(&config).unwrap();

        let expected: Vec<i64> = RandomAmounts::new(500, config.value_range(), config.seed)
            .unwrap()
            .collect();
        let fraud: Vec<i64> = report.fraud.classified.iter().map(|(v, _)| *v).collect();
        assert_eq!(fraud[..], expected[..fraud.len()]);

        let analytics_len = report.analytics.count as usize;
        assert_eq!(
            report.analytics.total,
            expected[..analytics_len]
                .iter()
                .map(|&v| i128::from(v))
                .sum::<i128>()
        );
        // Per-item barrier plus one abandoned handoff per relay.
        assert!(fraud.len().abs_diff(analytics_len) <= 2);
    }

    #[test]
    fn cancel_on_demand() {
        let config = small_config(
            1_000,
            Duration::from_millis(5),
            Duration::from_secs(60),
        );
        let pipeline = RunningPipeline::spawn(&config).unwrap();
        assert!(!pipeline.wait_finished(Duration::from_millis(50)));
        assert!(!pipeline.pending().is_empty());

        assert!(pipeline.cancel());
        assert!(!pipeline.cancel());
        assert!(pipeline.token().is_fired());

        let started = Instant::now();
        let report = pipeline.shutdown(Duration::from_secs(2)).unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(report.cancelled);
        assert!(report.stage(stage_names::FRAUD_RELAY).unwrap().cancelled);
        assert!(report.stage(stage_names::ANALYTICS_RELAY).unwrap().cancelled);
    }

    #[test]
    fn empty_stream_reports_no_average() {
        let config = small_config(0, Duration::ZERO, Duration::from_secs(5));
        let report = run_pipeline(&config).unwrap();
        assert_eq!(report.analytics.average, None);
        assert!(report.fraud.classified.is_empty());
    }

    #[test]
    fn extreme_amounts_do_not_break_analytics() {
        let config = PipelineConfig {
            value_min: i64::MAX - 1_000,
            value_max: i64::MAX,
            ..small_config(50, Duration::ZERO, Duration::from_secs(30))
        };
        let report = run_pipeline(&config).unwrap();

        assert_eq!(report.analytics.count, 50);
        let average = report.analytics.average.unwrap();
        assert!(config.value_range().contains(&average));
    }

    #[test]
    fn invalid_range_is_rejected() {
        let config = PipelineConfig {
            value_min: 10,
            value_max: 10,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            RunningPipeline::spawn(&config),
            Err(PipelineError::Config(_))
        ));
    }
}
