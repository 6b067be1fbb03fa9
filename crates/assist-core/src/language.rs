//! Result languages.

use serde::{Deserialize, Serialize};

/// Language of the search index queried.
///
/// The label doubles as the location parameter value and as the key into
/// the credential table of [`crate::SearchConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Arabic,
}

impl Language {
    /// All selectable languages, in menu order.
    pub const ALL: [Language; 2] = [Language::English, Language::Arabic];

    /// Label used in locations and configuration.
    pub fn label(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Arabic => "Arabic",
        }
    }

    /// Parse a label. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.label() == label)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
