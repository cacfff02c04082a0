//! # Roadside
//!
//! Roadside-assistance dispatch. A stranded driver describes the problem;
//! the dispatcher classifies it, stores the request, and assigns the nearest
//! available mechanic with a matching skill.
//!
//! ## Quick Start
//!
//! ```rust
//! use roadside::{DispatchConfig, Dispatcher, GeoPoint, IssueReport, NewMechanic, Skill, Store};
//!
//! let store = Store::open_in_memory().unwrap();
//! store
//!     .register_mechanic(
//!         &NewMechanic::new("test_mech", Skill::Tyre)
//!             .with_location(GeoPoint::new(12.9716, 77.5946).unwrap()),
//!     )
//!     .unwrap();
//!
//! let dispatcher = Dispatcher::new(store, DispatchConfig::default());
//! let report = IssueReport::new(
//!     "I have a flat tyre near MG Road",
//!     GeoPoint::new(12.9720, 77.5950).unwrap(),
//! );
//! let receipt = dispatcher.submit("test_user", &report).unwrap();
//!
//! assert!(receipt.is_assigned());
//! assert_eq!(receipt.mechanic.unwrap().name, "test_mech");
//! ```
pub mod config;
pub mod dispatcher;

pub use config::DispatchConfig;
pub use dispatcher::{DispatchReceipt, Dispatcher};

// Re-export the layers underneath
pub use roadside_core::{
    classify, classify_report, distance, find_nearest, match_report, Category,
    ClassificationResult, CoordinatePolicy, DispatchError, DispatchOutcome, GeoPoint,
    IssueReport, KeywordClassifier, KeywordTable, MechanicRecord, Skill,
};
pub use roadside_store::{
    NewMechanic, NewServiceRequest, RequestAction, RequestStatus, RequestStatusView,
    ServiceRequest, Store, StoreError,
};
