//! Active-leveling probe reports.
//!
//! The printer keeps its reports keyed by recency (`"0"` is the latest) in
//! the internal object layout of its Python firmware:
//!
//! ```json
//! {"0": {"_ProbeReport__probe_points": [
//!     {"_ProbePoint__location": {"_Vector2__x": 10.0, "_Vector2__y": 10.0},
//!      "_ProbePoint__z_offset_from_bed_zero": -0.04}
//! ]}}
//! ```
//!
//! A plain `[{"x", "y", "z_offset"}]` array is accepted as well.

use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use ultiui_types::ProbePoint;

#[derive(Debug, Deserialize)]
struct Vector2 {
    #[serde(rename = "_Vector2__x")]
    x: f64,
    #[serde(rename = "_Vector2__y")]
    y: f64,
}

#[derive(Debug, Deserialize)]
struct FirmwarePoint {
    #[serde(rename = "_ProbePoint__location")]
    location: Vector2,
    #[serde(rename = "_ProbePoint__z_offset_from_bed_zero")]
    z_offset: f64,
}

#[derive(Debug, Deserialize)]
struct FirmwareReport {
    #[serde(rename = "_ProbeReport__probe_points")]
    probe_points: Vec<FirmwarePoint>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReportDocument {
    Plain(Vec<ProbePoint>),
    Firmware(BTreeMap<String, FirmwareReport>),
}

/// Parse the most recent probe report into grid-ordered points.
pub fn parse_probe_report(json: &str) -> Result<Vec<ProbePoint>> {
    let document: ReportDocument =
        serde_json::from_str(json).context("Failed to parse probe report")?;

    match document {
        ReportDocument::Plain(points) => Ok(points),
        ReportDocument::Firmware(reports) => {
            // Keys count up from "0" (latest), so compare them as numbers.
            let latest = reports
                .iter()
                .min_by_key(|(key, _)| {
                    (key.trim().parse::<u64>().unwrap_or(u64::MAX), key.as_str())
                })
                .map(|(_, report)| report)
                .ok_or_else(|| anyhow!("Probe report contains no reports"))?;
            Ok(latest
                .probe_points
                .iter()
                .map(|p| ProbePoint::new(p.location.x, p.location.y, p.z_offset))
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firmware_layout() {
        let json = r#"{
            "1": {"_ProbeReport__probe_points": []},
            "0": {"_ProbeReport__probe_points": [
                {"_ProbePoint__location": {"_Vector2__x": 10.0, "_Vector2__y": 20.0},
                 "_ProbePoint__z_offset_from_bed_zero": -0.04},
                {"_ProbePoint__location": {"_Vector2__x": 200.0, "_Vector2__y": 20.0},
                 "_ProbePoint__z_offset_from_bed_zero": 0.06}
            ]}
        }"#;

        let points = parse_probe_report(json).unwrap();
        assert_eq!(
            points,
            vec![ProbePoint::new(10.0, 20.0, -0.04), ProbePoint::new(200.0, 20.0, 0.06)]
        );
    }

    #[test]
    fn test_latest_report_uses_numeric_order() {
        let json = r#"{
            "10": {"_ProbeReport__probe_points": [
                {"_ProbePoint__location": {"_Vector2__x": 0.0, "_Vector2__y": 0.0},
                 "_ProbePoint__z_offset_from_bed_zero": 0.5}
            ]},
            "2": {"_ProbeReport__probe_points": [
                {"_ProbePoint__location": {"_Vector2__x": 0.0, "_Vector2__y": 0.0},
                 "_ProbePoint__z_offset_from_bed_zero": 0.02}
            ]}
        }"#;

        let points = parse_probe_report(json).unwrap();
        assert_eq!(points, vec![ProbePoint::new(0.0, 0.0, 0.02)]);
    }

    #[test]
    fn test_plain_layout() {
        let json = r#"[{"x": 1.0, "y": 2.0, "z_offset": 0.1}]"#;
        assert_eq!(parse_probe_report(json).unwrap(), vec![ProbePoint::new(1.0, 2.0, 0.1)]);
    }

    #[test]
    fn test_empty_and_invalid() {
        assert!(parse_probe_report("{}").is_err());
        assert!(parse_probe_report("[1, 2]").is_err());
        assert!(parse_probe_report("[]").unwrap().is_empty());
    }
}
