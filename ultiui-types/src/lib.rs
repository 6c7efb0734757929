//! # ultiui-types
//!
//! Core data types for printer telemetry. This crate defines the records
//! exchanged between the telemetry engine and whatever sits in front of it
//! (CLI, HTTP layer, dashboards).
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature for JSON and friends
//! - **Plain data**: No behavior beyond small accessors; processing lives in `ultiui-engine`
//!
//! ## Features
//!
//! - `serde`: Serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use ultiui_types::{FlowSample, ProbePoint, Timestamp};
//!
//! let point = ProbePoint::new(10.0, 10.0, -0.04);
//! assert!(point.is_finite());
//!
//! let sample = FlowSample::new(Timestamp::from_secs(1), Some(210.0), None);
//! assert!(sample.flow_rate.is_none());
//! ```

mod alert;
mod flow;
mod leveling;
mod log;
mod timestamp;

pub use alert::*;
pub use flow::*;
pub use leveling::*;
pub use log::*;
pub use timestamp::*;
