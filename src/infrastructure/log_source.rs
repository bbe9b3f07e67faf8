//! Log Stream Source - Drives console log lines into the event channel
//!
//! Two entry points share the same pipeline: each line is trimmed,
//! classified, passed through a `CorrelationTracker`, and recognised events
//! are sent in file order to the ingest channel.
//!
//! - `replay_file` / `replay_files` read closed archive files to the end.
//! - `follow_file` reads the live file from the start and then keeps waiting
//!   for appended lines until its task is aborted.
//!
//! Every file session owns a fresh tracker, so a handshake at the end of one
//! archive is never joined to a character line in the next file.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::events::LogEvent;
use crate::domain::services::{classify, CorrelationTracker};

/// Errors that end a stream session
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to open log file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read log file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to list log directory {}: {source}", .path.display())]
    ListDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Event channel closed")]
    ChannelClosed,
}

/// Longest line the follower buffers while waiting for its newline
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Per-file pipeline state
#[derive(Debug)]
struct LineSession {
    tracker: CorrelationTracker,
    lines: u64,
    events: u64,
    user_events: u64,
}

impl LineSession {
    fn new() -> Self {
        Self {
            tracker: CorrelationTracker::new(),
            lines: 0,
            events: 0,
            user_events: 0,
        }
    }

    fn process(&mut self, raw: &[u8]) -> Option<LogEvent> {
        self.lines += 1;
        let line = String::from_utf8_lossy(raw);
        let event = classify(line.trim())?;
        self.events += 1;
        if event.event_type.is_user_event() {
            self.user_events += 1;
        }
        Some(self.tracker.correlate(event))
    }
}

async fn open(path: &Path) -> Result<BufReader<File>, SourceError> {
    let file = File::open(path).await.map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

async fn dispatch(tx: &mpsc::Sender<LogEvent>, event: LogEvent) -> Result<(), SourceError> {
    tx.send(event).await.map_err(|_| SourceError::ChannelClosed)
}

/// Read one closed log file to the end, returning the number of events sent
pub async fn replay_file(path: &Path, tx: &mpsc::Sender<LogEvent>) -> Result<u64, SourceError> {
    let mut reader = open(path).await?;
    let mut session = LineSession::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|source| SourceError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }
        if let Some(event) = session.process(&buf) {
            dispatch(tx, event).await?;
        }
    }

    if let Some(steam_id) = session.tracker.pending() {
        debug!(steam_id, "Handshake without a character line at end of file");
    }
    info!(
        path = %path.display(),
        lines = session.lines,
        events = session.events,
        user_events = session.user_events,
        "Replayed log file"
    );
    Ok(session.events)
}

/// Replay files in the given order, each with its own correlation session
pub async fn replay_files(
    paths: &[PathBuf],
    tx: &mpsc::Sender<LogEvent>,
) -> Result<u64, SourceError> {
    let mut total = 0;
    for path in paths {
        total += replay_file(path, tx).await?;
    }
    Ok(total)
}

/// Follow a live log file forever.
///
/// Reads from the beginning, then polls every `poll_interval` at end of file.
/// A trailing line without a newline is held back until it is complete. If
/// the file shrinks below the read position it is read again from offset 0
/// with a fresh correlation session.
///
/// A line that grows past [`MAX_LINE_BYTES`] without a newline is dropped,
/// up to and including its eventual newline.
///
/// Only returns on an open/read error or when the event channel is closed.
pub async fn follow_file(
    path: &Path,
    poll_interval: Duration,
    tx: &mpsc::Sender<LogEvent>,
) -> Result<(), SourceError> {
    follow_file_with_limit(path, poll_interval, MAX_LINE_BYTES, tx).await
}

async fn follow_file_with_limit(
    path: &Path,
    poll_interval: Duration,
    max_line: usize,
    tx: &mpsc::Sender<LogEvent>,
) -> Result<(), SourceError> {
    let mut reader = open(path).await?;
    let mut session = LineSession::new();
    let mut pending = Vec::new();
    let mut position: u64 = 0;
    let mut discarding = false;

    let read_error = |source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    };

    info!(path = %path.display(), "Following live log file");

    loop {
        let read = reader
            .read_until(b'\n', &mut pending)
            .await
            .map_err(read_error)?;

        if read == 0 {
            if is_truncated(path, position).await {
                warn!(path = %path.display(), "Log file truncated, reading from the start");
                reader
                    .seek(SeekFrom::Start(0))
                    .await
                    .map_err(read_error)?;
                position = 0;
                pending.clear();
                discarding = false;
                session = LineSession::new();
                continue;
            }
            tokio::time::sleep(poll_interval).await;
            continue;
        }

        position += read as u64;
        let complete = pending.last() == Some(&b'\n');

        if discarding {
            pending.clear();
            discarding = !complete;
            continue;
        }

        if !complete {
            if pending.len() > max_line {
                warn!(
                    path = %path.display(),
                    bytes = pending.len(),
                    "Dropping log line longer than {} bytes", max_line
                );
                pending.clear();
                discarding = true;
            } else {
                debug!("Holding partial line until its newline arrives");
            }
            continue;
        }

        if let Some(event) = session.process(&pending) {
            dispatch(tx, event).await?;
        }
        pending.clear();
    }
}

/// Replay the archives, then follow the live file on the same producer so the
/// total line order is kept across the boundary.
pub async fn replay_then_follow(
    history: &[PathBuf],
    live: &Path,
    poll_interval: Duration,
    tx: mpsc::Sender<LogEvent>,
) -> Result<(), SourceError> {
    let replayed = replay_files(history, &tx).await?;
    info!(files = history.len(), events = replayed, "Replay finished");
    follow_file(live, poll_interval, &tx).await
}

async fn is_truncated(path: &Path, position: u64) -> bool {
    matches!(tokio::fs::metadata(path).await, Ok(meta) if meta.len() < position)
}
