//! Process-wide leveling tolerance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{InputError, Result};

/// Largest tolerance accepted, in millimeters.
pub const MAX_TOLERANCE_MM: f64 = 1.0;

/// Tolerance used when nothing is configured, in millimeters.
pub const DEFAULT_TOLERANCE_MM: f64 = 0.1;

/// Shared, atomically updated tolerance threshold.
///
/// The value is stored as the bit pattern of an `f64`, so `get` and `set`
/// are single atomic operations and a reader always sees a value that
/// passed validation. Clones share the same value.
#[derive(Clone)]
pub struct ToleranceThresholdStore {
    bits: Arc<AtomicU64>,
}

impl ToleranceThresholdStore {
    /// Create a store with a validated initial value.
    pub fn new(initial_mm: f64) -> Result<Self> {
        validate(initial_mm)?;
        Ok(Self {
            bits: Arc::new(AtomicU64::new(initial_mm.to_bits())),
        })
    }

    /// Current threshold in millimeters.
    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Replace the threshold. On error the previous value is kept.
    pub fn set(&self, value_mm: f64) -> Result<()> {
        if let Err(err) = validate(value_mm) {
            tracing::warn!(value = value_mm, "rejected tolerance update: {}", err);
            return Err(err);
        }
        let previous = f64::from_bits(self.bits.swap(value_mm.to_bits(), Ordering::AcqRel));
        tracing::debug!(previous, current = value_mm, "tolerance updated");
        Ok(())
    }
}

impl Default for ToleranceThresholdStore {
    fn default() -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(DEFAULT_TOLERANCE_MM.to_bits())),
        }
    }
}

impl std::fmt::Debug for ToleranceThresholdStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToleranceThresholdStore")
            .field("mm", &self.get())
            .finish()
    }
}

fn validate(value_mm: f64) -> Result<()> {
    // NaN is never contained in the range.
    if (0.0..=MAX_TOLERANCE_MM).contains(&value_mm) {
        Ok(())
    } else {
        Err(InputError::ToleranceOutOfRange {
            value: value_mm,
            max: MAX_TOLERANCE_MM,
        })
    }
}
