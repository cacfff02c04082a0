use std::fmt;

use serde::{Deserialize, Serialize};

use super::category::Category;
use crate::geo::GeoPoint;

/// A stranded driver's description of the problem and where they are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueReport {
    /// Free-text description. May be empty.
    pub description: String,

    /// Reporter location.
    pub location: GeoPoint,

    /// Set when the reporter pressed the emergency button.
    pub emergency: bool,
}

impl IssueReport {
    /// Creates a non-emergency report.
    #[must_use]
    pub fn new(description: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            description: description.into(),
            location,
            emergency: false,
        }
    }

    /// Marks the report as an emergency.
    #[must_use]
    pub fn with_emergency(mut self, emergency: bool) -> Self {
        self.emergency = emergency;
        self
    }
}

/// Category and heuristic confidence produced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,

    /// Heuristic score in `[0.5, 1.0]`. Not a calibrated probability.
    pub confidence: f64,
}

impl ClassificationResult {
    #[must_use]
    pub fn new(category: Category, confidence: f64) -> Self {
        Self {
            category,
            confidence,
        }
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (conf={:.2})", self.category, self.confidence)
    }
}
