pub mod category;
pub mod mechanic;
pub mod report;

pub use category::{Category, Skill};
pub use mechanic::{DispatchOutcome, MechanicRecord};
pub use report::{ClassificationResult, IssueReport};
