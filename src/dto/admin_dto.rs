use serde::{Deserialize, Serialize};

use crate::dto::request_dto::BloodRequestView;
use crate::dto::user_dto::UserView;
use crate::model::dashboard::DashboardStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A level-tagged message for the admin surface to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Notice { level, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

/// Everything the admin dashboard shows, queried together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub users: Vec<UserView>,
    pub requests: Vec<BloodRequestView>,
    pub stats: DashboardStats,
}

/// Result of an admin mutation plus a fresh snapshot. `snapshot` is absent
/// when the refresh failed; an error notice says so.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminMutationResponse<T> {
    pub result: T,
    pub notices: Vec<Notice>,
    pub snapshot: Option<DashboardSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedUser {
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteConfirmation {
    Confirmed,
    Declined,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    pub confirm: Option<bool>,
}

impl From<DeleteQuery> for DeleteConfirmation {
    fn from(query: DeleteQuery) -> Self {
        match query.confirm {
            Some(true) => DeleteConfirmation::Confirmed,
            _ => DeleteConfirmation::Declined,
        }
    }
}
