use std::fmt;
use std::str::FromStr;

use roadside_core::{Category, GeoPoint, Skill};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Lifecycle of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Waiting for a mechanic.
    Open,
    /// A mechanic has been claimed for the request.
    Assigned,
    /// The mechanic accepted and is travelling.
    OnTheWay,
    Completed,
    Cancelled,
}

impl RequestStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Assigned => "Assigned",
            Self::OnTheWay => "OnTheWay",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Returns `true` once no further action is possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(Self::Open),
            "Assigned" => Ok(Self::Assigned),
            "OnTheWay" => Ok(Self::OnTheWay),
            "Completed" => Ok(Self::Completed),
            "Cancelled" => Ok(Self::Cancelled),
            other => Err(StoreError::UnknownStatus(other.to_string())),
        }
    }
}

/// Actions that move a request through its lifecycle after assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestAction {
    /// Assigned mechanic sets off.
    Accept,
    /// Assigned mechanic declines; the request goes back to the open pool.
    Reject,
    /// Mechanic finished the job.
    Complete,
    /// Customer withdraws the request.
    Cancel,
}

impl RequestAction {
    /// Status reached by applying this action to `from`, or `None` if the
    /// action is not allowed there.
    #[must_use]
    pub fn next(self, from: RequestStatus) -> Option<RequestStatus> {
        use RequestStatus::*;
        if from.is_terminal() {
            return None;
        }
        match (self, from) {
            (Self::Accept, Assigned) => Some(OnTheWay),
            (Self::Reject, Assigned) => Some(Open),
            (Self::Complete, OnTheWay) => Some(Completed),
            (Self::Cancel, Open | Assigned | OnTheWay) => Some(Cancelled),
            _ => None,
        }
    }

    /// Whether the mechanic on the request becomes available again.
    #[must_use]
    pub fn releases_mechanic(self) -> bool {
        !matches!(self, Self::Accept)
    }

    /// Whether the request keeps its mechanic after the action.
    #[must_use]
    pub fn keeps_assignment(self) -> bool {
        !matches!(self, Self::Reject)
    }
}

impl fmt::Display for RequestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accept => write!(f, "accept"),
            Self::Reject => write!(f, "reject"),
            Self::Complete => write!(f, "complete"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

/// Fields needed to register a mechanic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMechanic {
    pub name: String,
    pub phone: String,
    pub skill: Skill,
    /// Defaults to `(0, 0)` until the first location update.
    pub location: GeoPoint,
}

impl NewMechanic {
    #[must_use]
    pub fn new(name: impl Into<String>, skill: Skill) -> Self {
        Self {
            name: name.into(),
            phone: String::new(),
            skill,
            location: GeoPoint::default(),
        }
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = location;
        self
    }
}

/// Fields needed to open a service request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewServiceRequest {
    pub customer: String,
    pub description: String,
    pub category: Category,
    pub confidence: f64,
    pub location: GeoPoint,
    pub emergency: bool,
}

/// A persisted service request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: i64,
    pub customer: String,
    pub mechanic_id: Option<i64>,
    pub description: String,
    pub category: Category,
    pub confidence: f64,
    pub location: GeoPoint,
    pub emergency: bool,
    pub status: RequestStatus,
    /// SQLite `datetime('now')` text, UTC.
    pub created_at: String,
    pub updated_at: String,
}

/// What a customer polling their request sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestStatusView {
    pub status: RequestStatus,
    /// Name of the assigned mechanic, if any.
    pub mechanic: Option<String>,
    pub category: Category,
}
