//! # Roadside Store
//!
//! SQLite repository backing the dispatch service: mechanic profiles with
//! live location and availability, and service requests with their
//! lifecycle. The dispatch core never touches this crate; the orchestrator
//! reads snapshots from it and writes assignments back.
//!
//! ```rust
//! use roadside_core::{GeoPoint, Skill};
//! use roadside_store::{NewMechanic, Store};
//!
//! let store = Store::open_in_memory().unwrap();
//! let mechanic = store
//!     .register_mechanic(
//!         &NewMechanic::new("test_mech", Skill::Tyre)
//!             .with_location(GeoPoint::new(12.9716, 77.5946).unwrap()),
//!     )
//!     .unwrap();
//!
//! let snapshot = store.available_mechanics(None).unwrap();
//! assert_eq!(snapshot[0].id, mechanic.id);
//! ```
pub mod error;
pub mod mechanics;
pub mod requests;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use store::Store;
pub use types::{
    NewMechanic, NewServiceRequest, RequestAction, RequestStatus, RequestStatusView,
    ServiceRequest,
};
