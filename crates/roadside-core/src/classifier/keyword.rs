use std::sync::LazyLock;

use tracing::debug;

use super::keywords::KeywordTable;
use crate::types::{Category, ClassificationResult, IssueReport};

/// Confidence assigned when the text carries no keyword evidence.
pub const BASELINE_CONFIDENCE: f64 = 0.5;

/// Weight of the winning category's share of all hits.
pub const DOMINANCE_WEIGHT: f64 = 0.4;

/// Confidence added per keyword hit across all categories.
pub const EVIDENCE_WEIGHT: f64 = 0.1;

static DEFAULT_CLASSIFIER: LazyLock<KeywordClassifier> = LazyLock::new(KeywordClassifier::new);

/// Process-wide classifier over the built-in keyword table.
#[must_use]
pub fn default_classifier() -> &'static KeywordClassifier {
    &DEFAULT_CLASSIFIER
}

/// Classifies free text with the built-in keyword table.
#[must_use]
pub fn classify(text: &str) -> ClassificationResult {
    DEFAULT_CLASSIFIER.classify(text)
}

/// Classifies a report with the built-in keyword table, honouring its
/// emergency flag.
#[must_use]
pub fn classify_report(report: &IssueReport) -> ClassificationResult {
    DEFAULT_CLASSIFIER.classify_report(report)
}

/// Keyword-frequency classifier for roadside issue descriptions.
///
/// Matching is plain substring containment on lowercased text: a keyword
/// also matches inside a longer word ("air" in "repair"). Each keyword counts
/// at most once regardless of how often it appears.
#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier {
    table: KeywordTable,
}

impl KeywordClassifier {
    /// Constructs a classifier over the built-in keyword table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a classifier over a custom keyword table.
    #[must_use]
    pub fn with_table(table: KeywordTable) -> Self {
        Self { table }
    }

    #[must_use]
    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    /// Maps free text to a category and confidence. Never fails; empty text
    /// yields `General` at baseline confidence.
    #[must_use]
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let text = text.to_lowercase();

        if let Some(word) = self.table.accident().iter().find(|w| text.contains(w.as_str())) {
            debug!(keyword = %word, "accident keyword matched");
            return ClassificationResult::new(Category::Accident, 1.0);
        }

        let hits: Vec<(Category, u32)> = self
            .table
            .scored()
            .map(|(category, words)| {
                let count = words.iter().filter(|w| text.contains(w.as_str())).count() as u32;
                (category, count)
            })
            .collect();

        let total_hits: u32 = hits.iter().map(|(_, n)| n).sum();
        if total_hits == 0 {
            return ClassificationResult::new(Category::General, BASELINE_CONFIDENCE);
        }

        // Strict `>` keeps the earliest category on ties
        let (category, max_hits) = hits
            .iter()
            .fold((Category::General, 0u32), |best, &(category, n)| {
                if n > best.1 { (category, n) } else { best }
            });

        let confidence = self.compute_confidence(max_hits, total_hits);
        debug!(%category, max_hits, total_hits, confidence, "classified issue");

        ClassificationResult::new(category, confidence)
    }

    /// Classifies the report text, then forces `Accident` when the emergency
    /// flag is set. The text-derived confidence is kept in that case.
    #[must_use]
    pub fn classify_report(&self, report: &IssueReport) -> ClassificationResult {
        let mut result = self.classify(&report.description);
        if report.emergency && !result.category.is_emergency() {
            debug!(from = %result.category, "emergency flag overrides category");
            result.category = Category::Accident;
        }
        result
    }

    /// Rewards both dominance of the winning category and the absolute
    /// number of hits.
    fn compute_confidence(&self, max_hits: u32, total_hits: u32) -> f64 {
        let dominance = max_hits as f64 / total_hits as f64;
        (BASELINE_CONFIDENCE + dominance * DOMINANCE_WEIGHT + total_hits as f64 * EVIDENCE_WEIGHT)
            .min(1.0)
    }
}
