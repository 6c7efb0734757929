//! Channel-based line source.
//!
//! Receives log lines pushed through a tokio mpsc channel, for producers
//! that already hold lines in memory (an HTTP poller, a test harness).

use tokio::sync::mpsc;

use super::LineSource;

/// Upper bound on lines returned by a single poll.
const MAX_LINES_PER_POLL: usize = 4096;

/// A line source fed through a channel.
///
/// # Example
///
/// ```
/// use ultiui::{ChannelSource, LineSource};
///
/// let (tx, mut source) = ChannelSource::create("printer events", 64);
/// tx.try_send("Print job started".to_string()).unwrap();
/// assert_eq!(source.poll(), vec!["Print job started"]);
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::Receiver<String>,
    description: String,
    last_error: Option<String>,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of an mpsc channel
    /// * `source_description` - A description of where lines come from
    pub fn new(receiver: mpsc::Receiver<String>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            last_error: None,
        }
    }

    /// Create a channel pair holding up to `capacity` unread lines.
    ///
    /// Returns (sender, source).
    pub fn create(source_description: &str, capacity: usize) -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self::new(rx, source_description))
    }
}

impl LineSource for ChannelSource {
    fn poll(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while lines.len() < MAX_LINES_PER_POLL {
            match self.receiver.try_recv() {
                Ok(line) => lines.push(line),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.last_error = Some("Channel closed".to_string());
                    break;
                }
            }
        }
        lines
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test", 8);

        // Nothing sent yet
        assert!(source.poll().is_empty());
        assert!(source.error().is_none());

        tx.try_send("one".to_string()).unwrap();
        tx.try_send("two".to_string()).unwrap();
        assert_eq!(source.poll(), vec!["one", "two"]);
        assert!(source.poll().is_empty());
    }

    #[test]
    fn test_channel_source_reports_closed() {
        let (tx, mut source) = ChannelSource::create("test", 8);
        tx.try_send("last".to_string()).unwrap();
        drop(tx);

        assert_eq!(source.poll(), vec!["last"]);
        assert_eq!(source.error(), Some("Channel closed"));
        assert_eq!(source.description(), "channel: test");
    }
}
