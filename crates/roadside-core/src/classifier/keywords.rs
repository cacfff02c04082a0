use crate::types::Category;

/// Accident keywords. Any hit short-circuits classification.
pub const ACCIDENT_KEYWORDS: &[&str] = &[
    "crash",
    "accident",
    "collision",
    "hit",
    "hurt",
    "injury",
    "blood",
    "ambulance",
];

pub const BATTERY_KEYWORDS: &[&str] = &["battery", "dead", "start", "voltage", "spark"];

pub const TYRE_KEYWORDS: &[&str] = &["tyre", "tire", "flat", "puncture", "air", "blowout"];

pub const ENGINE_KEYWORDS: &[&str] = &[
    "engine",
    "smoke",
    "noise",
    "oil",
    "heat",
    "stall",
    "breakdown",
];

/// Scored categories in tie-break order.
pub const SCORED_KEYWORDS: [(Category, &[&str]); 3] = [
    (Category::Battery, BATTERY_KEYWORDS),
    (Category::Tyre, TYRE_KEYWORDS),
    (Category::Engine, ENGINE_KEYWORDS),
];

/// Immutable mapping from category to its ordered keyword list.
///
/// Keywords are matched by substring containment against lowercased text,
/// so they must themselves be lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    accident: Vec<String>,
    scored: Vec<(Category, Vec<String>)>,
}

impl KeywordTable {
    /// Builds a table from explicit keyword lists.
    ///
    /// `scored` order is the tie-break order. Keywords are lowercased on the
    /// way in; empty keywords are dropped since they would match everything.
    #[must_use]
    pub fn new<A, S, K>(accident: A, scored: S) -> Self
    where
        A: IntoIterator<Item = K>,
        S: IntoIterator<Item = (Category, Vec<K>)>,
        K: AsRef<str>,
    {
        fn normalize<K: AsRef<str>>(words: impl IntoIterator<Item = K>) -> Vec<String> {
            words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        }

        Self {
            accident: normalize(accident),
            scored: scored
                .into_iter()
                .filter(|(category, _)| category.required_skill().is_some())
                .map(|(category, words)| (category, normalize(words)))
                .collect(),
        }
    }

    /// Accident keywords, in match order.
    #[must_use]
    pub fn accident(&self) -> &[String] {
        &self.accident
    }

    /// Scored categories with their keywords, in tie-break order.
    pub fn scored(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.scored.iter().map(|(c, words)| (*c, words.as_slice()))
    }

    /// Keywords registered for `category`. Empty for `General`.
    #[must_use]
    pub fn keywords_for(&self, category: Category) -> &[String] {
        match category {
            Category::Accident => &self.accident,
            other => self
                .scored
                .iter()
                .find(|(c, _)| *c == other)
                .map(|(_, words)| words.as_slice())
                .unwrap_or(&[]),
        }
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::new(
            ACCIDENT_KEYWORDS.iter().copied(),
            SCORED_KEYWORDS
                .iter()
                .map(|(category, words)| (*category, words.to_vec())),
        )
    }
}
