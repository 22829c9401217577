//! User-facing notification seam.
//!
//! The transport layer surfaces exactly one notice per failed call so the
//! shell can show a toast/status line; the error itself is still returned
//! to the caller. Rendering is out of scope here - a `NoticeSink`
//! implementation decides what a notice looks like on screen.

use std::sync::{Arc, Mutex};

use tracing::{error, info, warn};

/// What kind of event a notice describes. Mirrors the transport error
/// taxonomy plus success/info for write confirmations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    /// Session ended; the shell should return to the public entry page.
    SessionExpired,
    AccessDenied,
    NotFound,
    Validation,
    ServerFault,
    Error,
}

/// A single user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, message)
    }
}

/// Destination for user-visible notices.
pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Shared handle the transport layer holds.
pub type SharedSink = Arc<dyn NoticeSink>;

/// Default sink: routes notices into the tracing log.
#[derive(Debug, Default)]
pub struct TracingSink;

impl NoticeSink for TracingSink {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Success | NoticeKind::Info => {
                info!(message = %notice.message, "notice")
            }
            NoticeKind::Validation | NoticeKind::NotFound => {
                warn!(message = %notice.message, kind = ?notice.kind, "notice")
            }
            _ => error!(message = %notice.message, kind = ?notice.kind, "notice"),
        }
    }
}

/// Sink that collects notices in memory. Useful for embedders that render
/// notices themselves, and for asserting notification behavior in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    notices: Mutex<Vec<Notice>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return everything collected so far.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap())
    }

    pub fn len(&self) -> usize {
        self.notices.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NoticeSink for MemorySink {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
