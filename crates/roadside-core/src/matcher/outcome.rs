use tracing::info;

use super::nearest::find_nearest_with_distance;
use crate::classifier::{default_classifier, KeywordClassifier};
use crate::types::{DispatchOutcome, IssueReport, MechanicRecord};

/// Classifies a report and matches it against a snapshot in one pass.
///
/// Uses the built-in keyword table. See [`match_report_with`] to supply
/// a custom classifier.
#[must_use]
pub fn match_report(report: &IssueReport, mechanics: &[MechanicRecord]) -> DispatchOutcome {
    match_report_with(default_classifier(), report, mechanics)
}

/// Classifies a report with `classifier` and matches it against a snapshot.
#[must_use]
pub fn match_report_with(
    classifier: &KeywordClassifier,
    report: &IssueReport,
    mechanics: &[MechanicRecord],
) -> DispatchOutcome {
    let classification = classifier.classify_report(report);
    let found = find_nearest_with_distance(&report.location, classification.category, mechanics);

    match found {
        Some((mechanic, dist)) => {
            info!(
                category = %classification.category,
                mechanic_id = mechanic.id,
                distance_km = dist,
                "matched report"
            );
            DispatchOutcome {
                category: classification.category,
                confidence: classification.confidence,
                mechanic: Some(mechanic.clone()),
                distance_km: Some(dist),
            }
        }
        None => {
            info!(category = %classification.category, "no mechanic available for report");
            DispatchOutcome {
                category: classification.category,
                confidence: classification.confidence,
                mechanic: None,
                distance_km: None,
            }
        }
    }
}
