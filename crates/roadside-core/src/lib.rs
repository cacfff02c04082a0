//! # Roadside Core
//!
//! The dispatch engine for roadside assistance: a keyword classifier that
//! turns an issue description into a category and confidence, and a matcher
//! that picks the nearest available mechanic with the right skill.
//!
//! Everything here is pure and synchronous. Mechanics come in as a
//! read-only snapshot; persisting the assignment is the caller's job.
//!
//! ## Quick Start
//!
//! ```rust
//! use roadside_core::{classify, find_nearest, Category, GeoPoint, MechanicRecord, Skill};
//!
//! let result = classify("I have a flat tyre near MG Road");
//! assert_eq!(result.category, Category::Tyre);
//!
//! let fleet = vec![MechanicRecord::new(
//!     1,
//!     "test_mech",
//!     Skill::Tyre,
//!     GeoPoint::new(12.9716, 77.5946).unwrap(),
//! )];
//! let mechanic = find_nearest(12.9720, 77.5950, result.category, &fleet).unwrap();
//! assert_eq!(mechanic.id, 1);
//! ```
pub mod classifier;
pub mod error;
pub mod geo;
pub mod matcher;
pub mod types;

// Re-export primary API
pub use classifier::{classify, classify_report, KeywordClassifier, KeywordTable};
pub use error::{DispatchError, Result};
pub use geo::{distance, CoordinatePolicy, GeoPoint, EARTH_RADIUS_KM};
pub use matcher::{find_nearest, find_nearest_with_distance, match_report, CandidateTier};
pub use types::{
    Category, ClassificationResult, DispatchOutcome, IssueReport, MechanicRecord, Skill,
};
