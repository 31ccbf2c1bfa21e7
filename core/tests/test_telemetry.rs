// # 📂 `tests/test_telemetry.rs`

// * ✅ counters merge
// * ✅ stage times accumulate per kind
// * ✅ pipeline report lookup, totals, summary, JSON

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pipeline_core::sink::{consume, AggregationSink, ThresholdSink};
    use pipeline_core::telemetry::{
        PipelineReport, Stage, StageCounters, StageReport, StageTimer, StageTimes,
    };

    // ------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------
    fn relay_report(name: &'static str, dropped: u64) -> StageReport {
        let mut counters = StageCounters::default();
        counters.add_received();
        counters.add_received();
        counters.add_emitted(2 - dropped);
        if dropped > 0 {
            counters.add_dropped();
        }
        StageReport::new(name, Stage::Relay, counters, true, StageTimer::start())
    }

    // ------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------
    #[test]
    fn counters_merge_field_by_field() {
        let mut a = StageCounters::default();
        a.add_received();
        a.add_emitted(2);

        let mut b = StageCounters::default();
        b.add_received();
        b.add_dropped();
        b.add_branch_closed();

        a.merge(&b);
        assert_eq!(
            a,
            StageCounters {
                received: 2,
                emitted: 2,
                dropped_on_shutdown: 1,
                branches_closed: 1,
            }
        );
    }

    #[test]
    fn stage_times_accumulate() {
        let mut times = StageTimes::default();
        times.add(Stage::Relay, Duration::from_millis(3));
        times.add(Stage::Relay, Duration::from_millis(4));
        times.add(Stage::Sink, Duration::from_millis(5));

        assert_eq!(times.get(Stage::Relay), Duration::from_millis(7));
        assert_eq!(times.get(Stage::Source), Duration::ZERO);
        assert_eq!(times.total(), Duration::from_millis(12));
        assert_eq!((&times).into_iter().count(), 2);
    }

    #[test]
    fn finished_timer_is_frozen() {
        let mut timer = StageTimer::start();
        timer.finish();
        let first = timer.elapsed();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(timer.elapsed(), first);
    }

    #[test]
    fn pipeline_report_aggregates_stage_reports() {
        let fraud = consume(ThresholdSink::new(700), [100, 800]);
        let analytics = consume(AggregationSink::new(), [100, 800]);
        let report = PipelineReport::new(
            vec![relay_report("fraud-relay", 1), relay_report("analytics-relay", 0)],
            fraud,
            analytics,
            true,
            Duration::from_millis(10),
        );

        assert_eq!(report.dropped_on_shutdown(), 1);
        let totals = report.totals();
        assert_eq!(totals.received, 4);
        assert_eq!(totals.emitted, 3);
        assert_eq!(report.stage("fraud-relay").unwrap().counters.emitted, 1);
        assert!(report.stage("missing").is_none());
        assert_eq!(
            report.stage_times.get(Stage::Relay),
            report.stages.iter().map(|s| s.elapsed).sum::<Duration>()
        );

        let summary = report.summary();
        assert!(summary.contains("handoffs=3 dropped_on_shutdown=1 branches_closed=0"));
        assert!(summary.contains("total stage time"));
        assert!(summary.contains("flagged=1 normal=1 average=450"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["analytics"]["average"], 450);
        assert_eq!(json["fraud"]["classified"][1][1], "flagged");
    }
}
