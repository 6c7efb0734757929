//! Alert lifecycle: raise, refresh, resolve, expire.
//!
//! ```text
//!  raise ──▶ active ──resolve──▶ history (resolved_at set)
//!              │                    │
//!              │ raise again         └─ re-raise within the suppression
//!              ▼                       window is ignored
//!           refreshed once per refresh interval
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use ultiui_types::{Alert, LogType, Timestamp};

use crate::error::{InputError, Result};
use crate::signature;

/// History entries kept before the oldest is dropped.
pub const DEFAULT_ALERT_HISTORY_CAPACITY: usize = 1000;

/// A resolved alert raised again within this span is ignored.
pub const RESOLVE_SUPPRESSION: Duration = Duration::from_secs(60);

/// Repeats of an active alert bump its count at most this often.
pub const ALERT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Default age after which alerts are cleared.
pub const DEFAULT_ALERT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Outcome of raising an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Raised {
    /// A new active alert was created.
    New,
    /// An active alert was refreshed and its count bumped.
    Refreshed { occurrence_count: u64 },
    /// An active alert was raised again before its refresh interval ran out.
    Repeated,
    /// The alert was resolved too recently to come back.
    Suppressed,
}

#[derive(Debug)]
struct AlertState {
    active: HashMap<String, Alert>,
    history: VecDeque<Alert>,
    history_capacity: usize,
}

impl AlertState {
    fn push_history(&mut self, alert: Alert) {
        if self.history.len() >= self.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(alert);
    }

    fn recently_resolved(&self, id: &str, now: Timestamp) -> bool {
        self.history.iter().rev().any(|a| {
            a.id == id
                && a.resolved_at
                    .is_some_and(|resolved| now < resolved.saturating_add(RESOLVE_SUPPRESSION))
        })
    }
}

/// Shared handle over active alerts and their history.
///
/// # Example
///
/// ```rust
/// use ultiui_engine::{AlertTracker, Raised};
/// use ultiui_types::{LogType, Timestamp};
///
/// let alerts = AlertTracker::default();
/// alerts.raise("Hotend 0 not detected", LogType::Error, Timestamp::from_secs(0));
///
/// let active = alerts.active();
/// assert_eq!(active.len(), 1);
///
/// alerts.resolve(&active[0].id, Timestamp::from_secs(10));
/// assert_eq!(
///     alerts.raise("Hotend 1 not detected", LogType::Error, Timestamp::from_secs(20)),
///     Raised::Suppressed
/// );
/// ```
#[derive(Clone)]
pub struct AlertTracker {
    state: Arc<RwLock<AlertState>>,
}

impl AlertTracker {
    pub fn new(history_capacity: usize) -> Result<Self> {
        if history_capacity == 0 {
            return Err(InputError::ZeroCapacity);
        }
        Ok(Self {
            state: Arc::new(RwLock::new(AlertState {
                active: HashMap::new(),
                history: VecDeque::with_capacity(history_capacity.min(1024)),
                history_capacity,
            })),
        })
    }

    /// Raise an alert for `message` at `now`.
    pub fn raise(&self, message: &str, kind: LogType, now: Timestamp) -> Raised {
        let signature = signature::extract(message).signature;
        let id = Alert::id_for(kind, &signature);
        let mut state = self.state.write();

        if state.recently_resolved(&id, now) {
            tracing::debug!(%id, "alert suppressed after recent resolution");
            return Raised::Suppressed;
        }

        if let Some(alert) = state.active.get_mut(&id) {
            if now < alert.updated_at.saturating_add(ALERT_REFRESH_INTERVAL) {
                return Raised::Repeated;
            }
            alert.updated_at = now;
            alert.occurrence_count += 1;
            alert.message = message.trim().to_string();
            return Raised::Refreshed {
                occurrence_count: alert.occurrence_count,
            };
        }

        let alert = Alert {
            id: id.clone(),
            kind,
            message: message.trim().to_string(),
            signature,
            created_at: now,
            updated_at: now,
            occurrence_count: 1,
            resolved_at: None,
        };
        tracing::debug!(%id, "alert raised");
        state.push_history(alert.clone());
        state.active.insert(id, alert);
        Raised::New
    }

    /// Resolve an active alert, moving it to history.
    ///
    /// Returns the resolved alert, or `None` if no active alert has `id`.
    pub fn resolve(&self, id: &str, now: Timestamp) -> Option<Alert> {
        let mut state = self.state.write();
        let mut alert = state.active.remove(id)?;
        alert.resolved_at = Some(now);
        state.push_history(alert.clone());
        tracing::debug!(%id, "alert resolved");
        Some(alert)
    }

    /// Active alerts, most recently updated first.
    pub fn active(&self) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self.state.read().active.values().cloned().collect();
        alerts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        alerts
    }

    /// Up to `limit` history entries, newest first.
    pub fn history(&self, limit: usize) -> Result<Vec<Alert>> {
        if limit == 0 {
            return Err(InputError::ZeroCount);
        }
        Ok(self.state.read().history.iter().rev().take(limit).cloned().collect())
    }

    /// Drop active alerts not updated, and history entries not created,
    /// within `max_age` of `now`. Returns how many were removed.
    pub fn clear_older_than(&self, max_age: Duration, now: Timestamp) -> usize {
        let cutoff = now.saturating_sub(max_age);
        let mut state = self.state.write();

        let before = state.active.len() + state.history.len();
        state.active.retain(|_, a| a.updated_at > cutoff);
        state.history.retain(|a| a.created_at > cutoff);
        let removed = before - state.active.len() - state.history.len();

        if removed > 0 {
            tracing::debug!(removed, cutoff = cutoff.as_millis(), "cleared old alerts");
        }
        removed
    }

    pub fn active_len(&self) -> usize {
        self.state.read().active.len()
    }
}

impl Default for AlertTracker {
    fn default() -> Self {
        Self {
            state: Arc::new(RwLock::new(AlertState {
                active: HashMap::new(),
                history: VecDeque::new(),
                history_capacity: DEFAULT_ALERT_HISTORY_CAPACITY,
            })),
        }
    }
}

impl std::fmt::Debug for AlertTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("AlertTracker")
            .field("active", &state.active.len())
            .field("history", &state.history.len())
            .field("history_capacity", &state.history_capacity)
            .finish()
    }
}
