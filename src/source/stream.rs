//! Stream-based line source.
//!
//! Reads newline-delimited log lines from an async byte stream such as
//! stdin or a TCP connection.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

use super::LineSource;

/// A line source backed by a background reader task.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use ultiui::StreamSource;
///
/// # tokio_test::block_on(async {
/// let stream = Cursor::new(b"Bed temp 60C\n".to_vec());
/// let source = StreamSource::spawn(stream, "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<String>,
    description: String,
    last_error: Arc<Mutex<Option<String>>>,
    error_snapshot: Option<String>,
}

impl StreamSource {
    /// Spawn a background task that reads lines from the given async reader.
    ///
    /// Blank lines are skipped. The task ends at EOF, on a read error, or
    /// when the source is dropped.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(1024);
        let last_error = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();

        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim_end_matches('\r');
                        if line.trim().is_empty() {
                            continue;
                        }
                        if tx.send(line.to_string()).await.is_err() {
                            // Receiver dropped
                            break;
                        }
                    }
                    Ok(None) => {
                        *error_handle.lock() = Some("Stream closed".to_string());
                        break;
                    }
                    Err(e) => {
                        *error_handle.lock() = Some(format!("Read error: {}", e));
                        break;
                    }
                }
            }
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
            last_error,
            error_snapshot: None,
        }
    }

    /// Get the last error message reported by the reader task, if any.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }
}

impl LineSource for StreamSource {
    fn poll(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = self.receiver.try_recv() {
            lines.push(line);
        }
        // Only surface the reader's error once everything it sent is drained.
        if lines.is_empty() {
            self.error_snapshot = self.last_error();
        }
        lines
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.error_snapshot.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    #[tokio::test]
    async fn test_stream_source_spawn() {
        let cursor = Cursor::new("Nozzle temp 210C\r\n\nBed temp 60C\n");
        let mut source = StreamSource::spawn(cursor, "test");

        // Give the background task time to process
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(source.poll(), vec!["Nozzle temp 210C", "Bed temp 60C"]);
        assert!(source.poll().is_empty());
        assert_eq!(source.error(), Some("Stream closed"));
    }

    #[tokio::test]
    async fn test_stream_source_description() {
        let cursor = Cursor::new("");
        let source = StreamSource::spawn(cursor, "stdin");
        assert_eq!(source.description(), "stream: stdin");
    }

    #[tokio::test]
    async fn test_stream_source_empty_stream() {
        let cursor = Cursor::new("");
        let mut source = StreamSource::spawn(cursor, "test");

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(source.poll().is_empty());
        assert_eq!(source.last_error().as_deref(), Some("Stream closed"));
    }
}
