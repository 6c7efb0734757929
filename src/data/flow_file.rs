//! Recorded temperature/flow samples.
//!
//! A JSON array of `{"timestamp": <epoch ms>, "temperature": ?, "flow_rate": ?}`.
//! Missing or `null` metrics mean the sensor was unavailable at that tick.

use anyhow::{Context, Result};
use ultiui_types::FlowSample;

pub fn parse_flow_samples(json: &str) -> Result<Vec<FlowSample>> {
    serde_json::from_str(json).context("Failed to parse flow samples")
}
