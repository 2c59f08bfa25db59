//! Errors crossing the crate boundary.
//!
//! Semantic queries never fail: a name that does not resolve or an
//! expression without a type is `None`. Only session bookkeeping and
//! long-running searches report errors.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tolk_ir::FileId;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no file with id {0:?} in this session")]
    UnknownFile(FileId),
    #[error("no file at path `{0}` in this session")]
    UnknownPath(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("search cancelled")]
    Cancelled,
    #[error("search timed out after {0:?}")]
    TimedOut(Duration),
}

/// Shared flag a client flips to abort a running search.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
