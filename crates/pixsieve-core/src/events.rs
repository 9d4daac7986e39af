//! Progress and error events emitted during a scan.
//!
//! The engine emits exactly one event per candidate file, in enumeration order,
//! with 1-based indices and no gaps. It never knows who consumes them: a
//! terminal progress bar, a log panel, or a test collector all implement
//! [`ProgressSink`].

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::ErrorKind;

/// One step of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScanEvent {
    /// The file was fingerprinted and either kept or moved
    Progress {
        index: usize,
        total: usize,
        file_name: String,
        moved_so_far: usize,
    },

    /// The file could not be processed and was left in place
    Error {
        index: usize,
        total: usize,
        file_name: String,
        kind: ErrorKind,
        message: String,
        moved_so_far: usize,
    },
}

impl ScanEvent {
    pub fn index(&self) -> usize {
        match self {
            Self::Progress { index, .. } | Self::Error { index, .. } => *index,
        }
    }

    pub fn total(&self) -> usize {
        match self {
            Self::Progress { total, .. } | Self::Error { total, .. } => *total,
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            Self::Progress { file_name, .. } | Self::Error { file_name, .. } => file_name,
        }
    }

    pub fn moved_so_far(&self) -> usize {
        match self {
            Self::Progress { moved_so_far, .. } | Self::Error { moved_so_far, .. } => {
                *moved_so_far
            }
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Failure class of an `Error` event.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Error { kind, .. } => Some(*kind),
            Self::Progress { .. } => None,
        }
    }
}

/// Consumer of scan events.
pub trait ProgressSink {
    fn on_event(&mut self, event: ScanEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_event(&mut self, _event: ScanEvent) {}
}

impl<F> ProgressSink for F
where
    F: FnMut(ScanEvent),
{
    fn on_event(&mut self, event: ScanEvent) {
        self(event)
    }
}

/// Forwards events to a channel. A closed receiver only stops delivery, never the scan.
#[derive(Debug, Clone)]
pub struct ChannelSink(mpsc::UnboundedSender<ScanEvent>);

impl ChannelSink {
    /// Create a sink with its receiving half.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ScanEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }
}

impl ProgressSink for ChannelSink {
    fn on_event(&mut self, event: ScanEvent) {
        if self.0.send(event).is_err() {
            tracing::trace!("Event receiver dropped");
        }
    }
}
