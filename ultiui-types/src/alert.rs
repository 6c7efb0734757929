//! Printer alerts.

use crate::{LogType, Timestamp};

/// An alert raised from a printer message.
///
/// Alerts are keyed by their type and the normalized message, so a
/// re-raise with different numbers lands on the same alert.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alert {
    /// `"<type>:<signature>"`.
    pub id: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: LogType,
    /// Most recent message text.
    pub message: String,
    pub signature: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub occurrence_count: u64,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub resolved_at: Option<Timestamp>,
}

impl Alert {
    /// Build the id for a type and signature.
    pub fn id_for(kind: LogType, signature: &str) -> String {
        format!("{}:{}", kind, signature)
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}
