use serde::{Deserialize, Serialize};

use super::category::{Category, Skill};
use crate::geo::GeoPoint;

/// A point-in-time view of one mechanic, as read from the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanicRecord {
    /// Stable identity. Also the tie-break key when distances are equal.
    pub id: i64,

    pub name: String,

    pub phone: String,

    /// Last reported position.
    pub location: GeoPoint,

    pub skill: Skill,

    pub available: bool,
}

impl MechanicRecord {
    /// Creates an available mechanic record.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>, skill: Skill, location: GeoPoint) -> Self {
        Self {
            id,
            name: name.into(),
            phone: String::new(),
            location,
            skill,
            available: true,
        }
    }

    /// Sets availability.
    #[must_use]
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Sets the contact phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    /// Great-circle distance in kilometres from this mechanic to `point`.
    #[must_use]
    pub fn distance_to(&self, point: &GeoPoint) -> f64 {
        self.location.distance_to(point)
    }
}

/// Result of one classification + matching pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub category: Category,

    pub confidence: f64,

    /// Selected mechanic, or `None` when no candidate survived the filters.
    pub mechanic: Option<MechanicRecord>,

    /// Distance in kilometres from the reporter to the selected mechanic.
    pub distance_km: Option<f64>,
}

impl DispatchOutcome {
    /// Returns `true` if a mechanic was selected.
    #[must_use]
    pub fn is_matched(&self) -> bool {
        self.mechanic.is_some()
    }
}
