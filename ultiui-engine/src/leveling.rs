//! Bed leveling analysis over a probe grid.
//!
//! Statistics are computed on `z_offset` only. Positions feed the tilt
//! estimate, which is a plain Pearson correlation per axis:
//!
//! ```text
//!            back (+y)
//!         ┌─────────────┐
//!  left   │             │  right (+x)
//!         │             │
//!         └─────────────┘
//!            front
//! ```

use ultiui_types::{Advice, LevelingReport, ProbePoint, Tilt, TiltDirection};

use crate::error::{InputError, Result};
use crate::tolerance::ToleranceThresholdStore;

/// |correlation| above which a tilt direction is reported.
pub const TILT_CORRELATION: f64 = 0.3;

/// Range above which a full re-level is advised, in millimeters.
pub const FULL_RELEVEL_RANGE_MM: f64 = 0.2;

/// Range above which fine-tuning is advised, in millimeters.
pub const FINE_TUNE_RANGE_MM: f64 = 0.1;

/// Standard deviation above which surface cleaning is advised, in millimeters.
pub const CLEAN_SURFACE_STD_DEV_MM: f64 = 0.1;

/// Produces [`LevelingReport`]s against the live tolerance threshold.
#[derive(Debug, Clone, Default)]
pub struct LevelingAnalyzer {
    tolerance: ToleranceThresholdStore,
}

impl LevelingAnalyzer {
    pub fn new(tolerance: ToleranceThresholdStore) -> Self {
        Self { tolerance }
    }

    /// Analyze `points` using the threshold in effect right now.
    ///
    /// The threshold is read once; a concurrent update lands in the next
    /// report, never halfway through this one.
    pub fn analyze(&self, points: &[ProbePoint]) -> Result<LevelingReport> {
        analyze_with_threshold(points, self.tolerance.get())
    }

    pub fn tolerance(&self) -> &ToleranceThresholdStore {
        &self.tolerance
    }
}

/// Analyze `points` against an explicit threshold.
///
/// Fails on an empty grid or on any non-finite coordinate; no partial
/// report is ever produced. A single point has nothing to compare against,
/// so its deviation is measured from bed zero.
pub fn analyze_with_threshold(points: &[ProbePoint], threshold: f64) -> Result<LevelingReport> {
    let first = *points.first().ok_or(InputError::NoProbePoints)?;

    if let Some((index, p)) = points.iter().enumerate().find(|(_, p)| !p.is_finite()) {
        return Err(InputError::NonFiniteProbePoint {
            index,
            x: p.position.x,
            y: p.position.y,
            z_offset: p.z_offset,
        });
    }

    let count = points.len() as f64;
    let mean = points.iter().map(|p| p.z_offset).sum::<f64>() / count;
    let variance = points
        .iter()
        .map(|p| (p.z_offset - mean).powi(2))
        .sum::<f64>()
        / count;
    let std_dev = variance.sqrt();

    let max_abs_deviation = if points.len() == 1 {
        first.z_offset.abs()
    } else {
        points
            .iter()
            .map(|p| (p.z_offset - mean).abs())
            .fold(0.0, f64::max)
    };

    let mut highest = first;
    let mut lowest = first;
    for p in &points[1..] {
        if p.z_offset > highest.z_offset {
            highest = *p;
        }
        if p.z_offset < lowest.z_offset {
            lowest = *p;
        }
    }
    let range = highest.z_offset - lowest.z_offset;

    let tilt = estimate_tilt(points);
    let advice = advise(&tilt, range, std_dev);

    Ok(LevelingReport {
        points: points.to_vec(),
        mean,
        min: lowest.z_offset,
        max: highest.z_offset,
        std_dev,
        max_abs_deviation,
        tolerance_threshold: threshold,
        is_level: max_abs_deviation <= threshold,
        range,
        highest,
        lowest,
        tilt,
        advice,
    })
}

fn estimate_tilt(points: &[ProbePoint]) -> Tilt {
    let zs: Vec<f64> = points.iter().map(|p| p.z_offset).collect();
    let xs: Vec<f64> = points.iter().map(|p| p.position.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.position.y).collect();

    let x_correlation = pearson(&xs, &zs);
    let y_correlation = pearson(&ys, &zs);

    let rx = x_correlation.unwrap_or(0.0);
    let ry = y_correlation.unwrap_or(0.0);
    let direction = if rx.abs().max(ry.abs()) <= TILT_CORRELATION {
        None
    } else if rx.abs() > ry.abs() {
        Some(if rx > 0.0 {
            TiltDirection::Right
        } else {
            TiltDirection::Left
        })
    } else {
        Some(if ry > 0.0 {
            TiltDirection::Back
        } else {
            TiltDirection::Front
        })
    };

    Tilt {
        x_correlation,
        y_correlation,
        direction,
    }
}

/// Sums of squared deviations below this (mm²) count as no variation.
const MIN_VARIATION: f64 = 1e-12;

/// Pearson correlation, or `None` when either series has no variation.
fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() < 2 || a.len() != b.len() {
        return None;
    }
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a < MIN_VARIATION || var_b < MIN_VARIATION {
        return None;
    }
    Some((cov / (var_a * var_b).sqrt()).clamp(-1.0, 1.0))
}

fn advise(tilt: &Tilt, range: f64, std_dev: f64) -> Vec<Advice> {
    let mut advice = Vec::new();
    if let Some(side) = tilt.direction {
        advice.push(Advice::LowerSide { side });
    }
    if range > FULL_RELEVEL_RANGE_MM {
        advice.push(Advice::FullRelevel);
    } else if range > FINE_TUNE_RANGE_MM {
        advice.push(Advice::FineTune);
    }
    if std_dev > CLEAN_SURFACE_STD_DEV_MM {
        advice.push(Advice::CleanSurface);
    }
    advice
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn column(zs: &[f64]) -> Vec<ProbePoint> {
        zs.iter()
            .enumerate()
            .map(|(i, z)| ProbePoint::new(0.0, i as f64 * 10.0, *z))
            .collect()
    }

    #[test]
    fn three_point_example() {
        let points = column(&[0.1, -0.1, 0.05]);

        let report = analyze_with_threshold(&points, 0.15).unwrap();
        assert!((report.mean - 0.05 / 3.0).abs() < EPS);
        assert!((report.max_abs_deviation - (0.1 + 0.05 / 3.0)).abs() < EPS);
        assert!(report.is_level);
        assert_eq!(report.tolerance_threshold, 0.15);

        let report = analyze_with_threshold(&points, 0.1).unwrap();
        assert!(!report.is_level);
    }

    #[test]
    fn population_standard_deviation() {
        let report = analyze_with_threshold(&column(&[1.0, -1.0]), 1.0).unwrap();
        assert!((report.std_dev - 1.0).abs() < EPS);
        assert!((report.range - 2.0).abs() < EPS);
        assert_eq!(report.min, -1.0);
        assert_eq!(report.max, 1.0);
    }

    #[test]
    fn single_point_measures_from_bed_zero() {
        let point = [ProbePoint::new(5.0, 5.0, -0.08)];

        let report = analyze_with_threshold(&point, 0.1).unwrap();
        assert_eq!(report.std_dev, 0.0);
        assert!((report.max_abs_deviation - 0.08).abs() < EPS);
        assert!(report.is_level);

        let report = analyze_with_threshold(&point, 0.05).unwrap();
        assert!(!report.is_level);
    }

    #[test]
    fn empty_grid_is_rejected() {
        assert_eq!(
            analyze_with_threshold(&[], 0.1).unwrap_err(),
            InputError::NoProbePoints
        );
    }

    #[test]
    fn non_finite_point_rejects_whole_call() {
        let mut points = column(&[0.1, 0.2, 0.3]);
        points[1].z_offset = f64::NAN;
        match analyze_with_threshold(&points, 0.1).unwrap_err() {
            InputError::NonFiniteProbePoint { index, .. } => assert_eq!(index, 1),
            other => panic!("unexpected error: {:?}", other),
        }

        let points = [ProbePoint::new(f64::INFINITY, 0.0, 0.0)];
        assert!(analyze_with_threshold(&points, 0.1).is_err());
    }

    #[test]
    fn extremes_are_located() {
        let points = vec![
            ProbePoint::new(0.0, 0.0, 0.02),
            ProbePoint::new(100.0, 0.0, 0.09),
            ProbePoint::new(0.0, 100.0, -0.04),
        ];
        let report = analyze_with_threshold(&points, 0.1).unwrap();
        assert_eq!(report.highest, points[1]);
        assert_eq!(report.lowest, points[2]);
    }

    #[test]
    fn tilt_towards_right() {
        let points: Vec<_> = (0..5)
            .flat_map(|x| (0..5).map(move |y| (x, y)))
            .map(|(x, y)| ProbePoint::new(x as f64 * 50.0, y as f64 * 50.0, x as f64 * 0.03))
            .collect();

        let report = analyze_with_threshold(&points, 0.1).unwrap();
        assert!((report.tilt.x_correlation.unwrap() - 1.0).abs() < EPS);
        assert!(report.tilt.y_correlation.unwrap().abs() < EPS);
        assert_eq!(report.tilt.direction, Some(TiltDirection::Right));
        assert_eq!(
            report.advice,
            vec![
                Advice::LowerSide {
                    side: TiltDirection::Right
                },
                Advice::FineTune
            ]
        );
    }

    #[test]
    fn tilt_towards_front() {
        let points = column(&[0.2, 0.1, 0.0, -0.1]);
        let report = analyze_with_threshold(&points, 0.5).unwrap();
        assert_eq!(report.tilt.x_correlation, None);
        assert_eq!(report.tilt.direction, Some(TiltDirection::Front));
    }

    #[test]
    fn flat_bed_needs_no_advice() {
        let points: Vec<_> = (0..9)
            .map(|i| ProbePoint::new((i % 3) as f64, (i / 3) as f64, 0.01))
            .collect();
        let report = analyze_with_threshold(&points, 0.1).unwrap();
        assert!(report.is_level);
        assert_eq!(report.tilt.direction, None);
        assert!(report.advice.is_empty());
    }

    #[test]
    fn scattered_bed_gets_full_relevel_and_cleaning() {
        let points = vec![
            ProbePoint::new(0.0, 0.0, 0.3),
            ProbePoint::new(10.0, 0.0, -0.3),
            ProbePoint::new(0.0, 10.0, -0.3),
            ProbePoint::new(10.0, 10.0, 0.3),
        ];
        let report = analyze_with_threshold(&points, 0.1).unwrap();
        assert_eq!(report.tilt.direction, None);
        assert_eq!(report.advice, vec![Advice::FullRelevel, Advice::CleanSurface]);
    }

    #[test]
    fn analyzer_reads_live_threshold() {
        let store = ToleranceThresholdStore::new(0.15).unwrap();
        let analyzer = LevelingAnalyzer::new(store.clone());
        let points = column(&[0.1, -0.1, 0.05]);

        assert!(analyzer.analyze(&points).unwrap().is_level);

        store.set(0.1).unwrap();
        let report = analyzer.analyze(&points).unwrap();
        assert!(!report.is_level);
        assert_eq!(report.tolerance_threshold, 0.1);
    }

    #[test]
    fn report_serializes_statistics() {
        let report = analyze_with_threshold(&column(&[0.1, -0.1, 0.05]), 0.15).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        for key in ["mean", "min", "max", "std_dev", "max_abs_deviation", "tolerance_threshold"] {
            assert!(json[key].is_f64(), "{} should be a number", key);
        }
        assert_eq!(json["is_level"], true);
        assert_eq!(json["min"], -0.1);
        assert_eq!(json["max"], 0.1);
        assert_eq!(json["tolerance_threshold"], 0.15);
        assert_eq!(json["points"].as_array().map(Vec::len), Some(3));
        assert_eq!(json["points"][1], serde_json::json!({"x": 0.0, "y": 10.0, "z_offset": -0.1}));
    }
}
