pub mod keyword;
pub mod keywords;

pub use keyword::{classify, classify_report, default_classifier, KeywordClassifier};
pub use keywords::KeywordTable;
