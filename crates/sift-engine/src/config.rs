use serde::{Deserialize, Serialize};

/// How string sort keys are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringOrdering {
    /// Accent- and case-aware ordering: base letters first, then accents,
    /// then case with lowercase before uppercase.
    #[default]
    Locale,
    /// Plain byte-wise comparison.
    Binary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ordering used for string sort keys.
    pub string_ordering: StringOrdering,
    /// Upper bound on the compiled size of each `$regex`, in bytes.
    pub regex_size_limit: usize,
    /// Reuse compiled matchers for the same query instance.
    pub cache_matchers: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            string_ordering: StringOrdering::Locale,
            regex_size_limit: 1 << 20,
            cache_matchers: true,
        }
    }
}
