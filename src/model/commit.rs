//! Contract between the timeline and whatever persists dates.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use super::interaction::CommitRequest;
use super::item::ScheduleSnapshot;

/// Outbound request: new dates for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateUpdate {
    pub item_id: Uuid,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateUpdate {
    pub fn start_iso(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_iso(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

impl From<&CommitRequest> for DateUpdate {
    fn from(request: &CommitRequest) -> Self {
        Self {
            item_id: request.item_id,
            start: request.dates.start,
            end: request.dates.end,
        }
    }
}

/// Why a date commit was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CommitRejection {
    pub message: String,
    pub detail: Option<String>,
    pub suggestion: Option<String>,
}

impl CommitRejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
            suggestion: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("failed to load schedule: {0}")]
    Fetch(String),
    #[error("schedule backend is no longer available")]
    Disconnected,
}

/// Result of an outbound call that has not necessarily resolved yet.
///
/// Poll with [`Pending::poll`] once per frame; the value is handed out once.
#[derive(Debug)]
pub struct Pending<T> {
    rx: Receiver<T>,
}

/// Resolves a [`Pending`].
#[derive(Debug)]
pub struct Resolver<T> {
    tx: Sender<T>,
}

impl<T> Resolver<T> {
    /// Deliver the value. Dropped silently if nobody is waiting any more.
    pub fn resolve(self, value: T) {
        let _ = self.tx.send(value);
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Poll<T> {
    Ready(T),
    Waiting,
    /// The resolver was dropped without a value.
    Lost,
}

impl<T> Pending<T> {
    pub fn channel() -> (Resolver<T>, Pending<T>) {
        let (tx, rx) = mpsc::channel();
        (Resolver { tx }, Pending { rx })
    }

    /// An already-resolved value.
    pub fn ready(value: T) -> Self {
        let (resolver, pending) = Self::channel();
        resolver.resolve(value);
        pending
    }

    pub fn poll(&self) -> Poll<T> {
        match self.rx.try_recv() {
            Ok(value) => Poll::Ready(value),
            Err(TryRecvError::Empty) => Poll::Waiting,
            Err(TryRecvError::Disconnected) => Poll::Lost,
        }
    }
}

pub type CommitResult = Result<(), CommitRejection>;
pub type FetchResult = Result<ScheduleSnapshot, BackendError>;

/// The external data service the timeline reads from and commits to.
pub trait ScheduleBackend {
    /// Full re-fetch of projects and tasks.
    fn fetch(&mut self) -> Pending<FetchResult>;

    /// Persist new dates for one item.
    fn update_dates(&mut self, update: &DateUpdate) -> Pending<CommitResult>;
}
