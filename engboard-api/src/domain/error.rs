use thiserror::Error;

use super::models::{ProjectId, TaskId};

/// Failures reported by the remote store or its in-memory stand-in.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("not authorized by the remote store")]
    Unauthorized,
    #[error("record not found: {0}")]
    NotFound(String),
    /// The store rejected the request; the message is surfaced verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error("remote store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    /// Engineer-role sessions must be linked to an engineer record before
    /// they can read anything scoped to one.
    #[error("no engineer record is linked to this user")]
    UnlinkedEngineer,
    #[error("{0} requires an admin or manager profile")]
    Forbidden(&'static str),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("no profile found for this user")]
    ProfileMissing,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    #[error("task {0} already has a move in flight")]
    MoveInFlight(TaskId),
    #[error("invalid task: {0}")]
    InvalidTask(String),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum TimeLogError {
    #[error("an engineer must be selected to log hours")]
    EngineerUnresolved,
    #[error("hours must be a positive number")]
    InvalidHours,
    #[error("start date must not be after end date")]
    InvalidDateRange,
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
