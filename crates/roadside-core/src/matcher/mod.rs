pub mod nearest;
pub mod outcome;

pub use nearest::{
    candidates, closest, find_nearest, find_nearest_with_distance, CandidateTier, Candidates,
};
pub use outcome::{match_report, match_report_with};
