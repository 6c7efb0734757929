//! Line source abstraction for receiving raw log lines.
//!
//! A source hands out whatever complete lines arrived since the last poll.
//! Sources never parse; the [`Poller`](crate::Poller) decides how a line is
//! interpreted.

mod channel;
mod file;
mod stream;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use stream::StreamSource;

use std::fmt::Debug;

/// Trait for receiving raw log lines from various sources.
///
/// Implementations provide lines from different backends: a tailed log
/// file, an in-process channel, or any async byte stream.
///
/// # Example
///
/// ```
/// use ultiui::{FileSource, LineSource};
///
/// let mut source = FileSource::new("/var/log/syslog");
/// for line in source.poll() {
///     println!("{}", line);
/// }
/// ```
pub trait LineSource: Send + Debug {
    /// Lines that became available since the previous poll.
    ///
    /// Returns an empty vector when nothing new arrived. This method should
    /// be non-blocking.
    fn poll(&mut self) -> Vec<String>;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;

    /// Check if the source has encountered an error.
    ///
    /// Returns the error message if an error occurred during the last poll.
    fn error(&self) -> Option<&str>;
}
