//! Property-based tests for the telemetry engine.

use std::time::Duration;

use proptest::prelude::*;
use ultiui_engine::signature::{extract, render};
use ultiui_engine::{
    analyze_with_threshold, summarize, FlowSample, HistoryBuffer, InputError, LogIngestor,
    ProbePoint, Recorded, Timestamp, ToleranceThresholdStore,
};

const WINDOW: Duration = Duration::from_secs(60);

/// Digit-free label so every index maps to its own signature.
fn label(mut i: usize) -> String {
    let mut out = String::from("sensor ");
    loop {
        out.push((b'a' + (i % 26) as u8) as char);
        i /= 26;
        if i == 0 {
            return out;
        }
    }
}

fn probe_points(min: usize, max: usize) -> impl Strategy<Value = Vec<ProbePoint>> {
    prop::collection::vec(
        (-150.0f64..150.0, -150.0f64..150.0, -1.0f64..1.0)
            .prop_map(|(x, y, z)| ProbePoint::new(x, y, z)),
        min..max,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Lines that share a template inside the window collapse into one entry
    #[test]
    fn repeated_template_collapses(
        values in prop::collection::vec(0u32..100_000, 1..50),
        offsets in prop::collection::vec(0i64..=60_000, 50),
    ) {
        let ingestor = LogIngestor::default();
        for (value, offset) in values.iter().zip(&offsets) {
            ingestor.ingest(&format!("Nozzle temp {}C", value), Timestamp::from_millis(1_000_000 + offset));
        }

        let recent = ingestor.recent(10).unwrap();
        prop_assert_eq!(recent.len(), 1);
        prop_assert_eq!(recent[0].occurrence_count, values.len() as u64);
        prop_assert_eq!(&recent[0].parameters, &vec![values[values.len() - 1].to_string()]);
    }

    /// The buffer never outgrows its capacity and always evicts the oldest entry
    #[test]
    fn eviction_removes_smallest_last_seen(
        capacity in 1usize..12,
        stamps in prop::collection::vec(0i64..1_000_000, 1..80),
    ) {
        let mut buffer = HistoryBuffer::new(capacity).unwrap();

        for (i, ms) in stamps.iter().enumerate() {
            let oldest = buffer.iter_recent().map(|e| e.last_seen).min();
            let line = label(i);

            match buffer.record(&line, extract(&line), Timestamp::from_millis(*ms), WINDOW) {
                Recorded::Inserted { evicted: Some(evicted) } => {
                    prop_assert_eq!(Some(evicted.last_seen), oldest);
                }
                Recorded::Inserted { evicted: None } => {}
                Recorded::Merged { .. } => prop_assert!(false, "distinct signatures merged"),
            }
            prop_assert!(buffer.len() <= capacity);
        }
    }

    /// recent() is ordered by last_seen, newest first
    #[test]
    fn recent_is_newest_first(stamps in prop::collection::vec(0i64..1_000_000, 1..40)) {
        let mut buffer = HistoryBuffer::new(100).unwrap();
        for (i, ms) in stamps.iter().enumerate() {
            let line = label(i);
            buffer.record(&line, extract(&line), Timestamp::from_millis(*ms), WINDOW);
        }

        let recent = buffer.recent(100).unwrap();
        prop_assert!(recent.windows(2).all(|w| w[0].last_seen >= w[1].last_seen));
    }

    /// Rendering a signature with its parameters restores the trimmed message
    #[test]
    fn render_inverts_extract(message in "[ -~]{0,60}") {
        let e = extract(&message);
        prop_assert_eq!(render(&e.signature, &e.parameters), message.trim());
    }

    /// A lone probe point is level iff its offset fits the threshold
    #[test]
    fn single_point_verdict(z in -1.0f64..1.0, threshold in 0.0f64..=1.0) {
        let report = analyze_with_threshold(&[ProbePoint::new(0.0, 0.0, z)], threshold).unwrap();
        prop_assert_eq!(report.is_level, z.abs() <= threshold);
        prop_assert_eq!(report.std_dev, 0.0);
    }

    /// max_abs_deviation is the largest distance from the mean
    #[test]
    fn max_abs_deviation_matches_definition(points in probe_points(2, 40), threshold in 0.0f64..=1.0) {
        let report = analyze_with_threshold(&points, threshold).unwrap();

        let mean = points.iter().map(|p| p.z_offset).sum::<f64>() / points.len() as f64;
        let expected = points
            .iter()
            .map(|p| (p.z_offset - mean).abs())
            .fold(0.0, f64::max);

        prop_assert!((report.max_abs_deviation - expected).abs() < 1e-12);
        prop_assert_eq!(report.is_level, report.max_abs_deviation <= threshold);
        prop_assert!(report.min <= report.mean + 1e-12 && report.mean <= report.max + 1e-12);
    }

    /// Short series pass through summarize untouched
    #[test]
    fn short_series_unchanged(
        gaps in prop::collection::vec(1i64..5_000, 0..50),
        extra in 0usize..20,
    ) {
        let mut t = 0;
        let series: Vec<FlowSample> = gaps
            .iter()
            .map(|gap| {
                t += gap;
                FlowSample::new(Timestamp::from_millis(t), Some(200.0 + *gap as f64 / 100.0), None)
            })
            .collect();

        let summary = summarize(&series, None, series.len() + extra + 1).unwrap();
        prop_assert_eq!(summary.downsampled_series, series);
    }

    /// Long series are reduced to exactly max_points ordered samples
    #[test]
    fn long_series_downsampled(len in 2usize..500, max_points in 1usize..50) {
        prop_assume!(len > max_points);
        let series: Vec<FlowSample> = (0..len)
            .map(|i| FlowSample::new(Timestamp::from_secs(i as i64), Some(i as f64), Some(1.0)))
            .collect();

        let summary = summarize(&series, None, max_points).unwrap();
        let out = &summary.downsampled_series;
        prop_assert_eq!(out.len(), max_points);
        prop_assert!(out.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        prop_assert_eq!(out[max_points - 1].timestamp, Timestamp::from_secs(len as i64 - 1));
        prop_assert_eq!(summary.sample_count, len);
    }

    /// Invalid tolerance updates are rejected and leave the value alone
    #[test]
    fn negative_tolerance_is_ignored(initial in 0.0f64..=1.0, bad in -100.0f64..-1e-9) {
        let store = ToleranceThresholdStore::new(initial).unwrap();
        let err = store.set(bad).unwrap_err();
        let is_out_of_range = matches!(err, InputError::ToleranceOutOfRange { .. });
        prop_assert!(is_out_of_range);
        prop_assert_eq!(store.get(), initial);
    }
}
