//! Todo and classification types.

use serde::{Deserialize, Serialize};

/// Lowest importance score.
pub const MIN_IMPORTANCE: u8 = 1;
/// Highest importance score.
pub const MAX_IMPORTANCE: u8 = 10;
/// Score used when the model gives none, or gives garbage.
pub const DEFAULT_IMPORTANCE: u8 = 5;

/// Reasoning attached to items the model did not answer for.
pub const FALLBACK_REASONING: &str = "Could not classify.";

/// A todo item as sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoItem {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    /// Free-form due date; passed to the model as-is.
    #[serde(rename = "dueDate", default)]
    pub due_date: Option<String>,
    /// daily | weekly | monthly | yearly. Not validated.
    #[serde(default)]
    pub repeat: Option<String>,
    pub timestamp: String,
}

/// Todo category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Work,
    Personal,
    Health,
    Finance,
    Learning,
    Home,
    Social,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Work,
        Category::Personal,
        Category::Health,
        Category::Finance,
        Category::Learning,
        Category::Home,
        Category::Social,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Health => "Health",
            Category::Finance => "Finance",
            Category::Learning => "Learning",
            Category::Home => "Home",
            Category::Social => "Social",
            Category::Other => "Other",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a single todo item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassificationResult {
    pub id: i64,
    pub category: Category,
    /// 1-10, 10 = most critical.
    pub importance: u8,
    pub reasoning: String,
}

impl ClassificationResult {
    /// Neutral record for an item the model did not classify.
    pub fn fallback(id: i64) -> Self {
        Self {
            id,
            category: Category::Other,
            importance: DEFAULT_IMPORTANCE,
            reasoning: FALLBACK_REASONING.to_string(),
        }
    }
}

/// Clamp a raw score into the importance scale.
pub fn clamp_importance(raw: i64) -> u8 {
    raw.clamp(MIN_IMPORTANCE as i64, MAX_IMPORTANCE as i64) as u8
}
