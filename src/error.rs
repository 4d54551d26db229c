//! Error types for the snapshot engine.

use std::io;

/// Errors produced while taking one snapshot.
///
/// `Io` and the `Malformed*` variants are distinct kinds: an I/O failure on
/// a per-process file usually means the process exited mid-snapshot, while a
/// malformed record means the kernel handed back something unparseable.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed stat record: {0}")]
    MalformedStat(&'static str),

    #[error("malformed uptime record")]
    MalformedUptime,
}

impl Error {
    /// True when the error is expected snapshot churn: the process exited
    /// between enumeration and inspection.
    pub fn is_vanished(&self) -> bool {
        match self {
            Error::Io(e) => {
                e.kind() == io::ErrorKind::NotFound || e.raw_os_error() == Some(libc::ESRCH)
            }
            _ => false,
        }
    }
}
