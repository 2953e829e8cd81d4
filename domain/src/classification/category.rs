//! Software categories and their fixed validation regimes

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Risk/validation class assigned to a requirement document.
///
/// The enumeration is closed. Each category fixes how many test cases a
/// generated suite must contain and how strict its validation regime is.
///
/// | Category       | Code | Required cases | Strictness |
/// |----------------|------|----------------|------------|
/// | Infrastructure | 1    | 5              | 0          |
/// | NonConfigured  | 3    | 10             | 1          |
/// | Configured     | 4    | 20             | 2          |
/// | Custom         | 5    | 25             | 3          |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Infrastructure software (operating systems, databases, middleware)
    Infrastructure,
    /// Non-configured products used as delivered
    NonConfigured,
    /// Configured products adapted through configuration only
    Configured,
    /// Custom or bespoke software
    Custom,
}

impl Category {
    /// All categories, ordered from least to most stringent
    pub const ALL: [Category; 4] = [
        Category::Infrastructure,
        Category::NonConfigured,
        Category::Configured,
        Category::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Infrastructure => "infrastructure",
            Category::NonConfigured => "non_configured",
            Category::Configured => "configured",
            Category::Custom => "custom",
        }
    }

    /// Numeric category code used in regulatory documentation
    pub fn code(&self) -> u8 {
        match self {
            Category::Infrastructure => 1,
            Category::NonConfigured => 3,
            Category::Configured => 4,
            Category::Custom => 5,
        }
    }

    /// Exact number of test cases a valid suite for this category contains.
    ///
    /// Fixed lookup; not negotiable at runtime.
    pub fn required_test_count(&self) -> usize {
        match self {
            Category::Infrastructure => 5,
            Category::NonConfigured => 10,
            Category::Configured => 20,
            Category::Custom => 25,
        }
    }

    /// Rank of the validation regime; higher is stricter.
    pub fn strictness(&self) -> u8 {
        match self {
            Category::Infrastructure => 0,
            Category::NonConfigured => 1,
            Category::Configured => 2,
            Category::Custom => 3,
        }
    }

    /// The category requiring the strictest validation regime.
    pub fn most_conservative() -> Category {
        Category::ALL
            .into_iter()
            .max_by_key(|c| c.strictness())
            .unwrap_or(Category::Custom)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Infrastructure => "Category 1 (Infrastructure)",
            Category::NonConfigured => "Category 3 (Non-configured)",
            Category::Configured => "Category 4 (Configured)",
            Category::Custom => "Category 5 (Custom)",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts the snake_case name, the numeric code, or `category_<code>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let code = normalized
            .strip_prefix("category_")
            .unwrap_or(normalized.as_str());
        match code {
            "infrastructure" | "1" => Ok(Category::Infrastructure),
            "non_configured" | "nonconfigured" | "3" => Ok(Category::NonConfigured),
            "configured" | "4" => Ok(Category::Configured),
            "custom" | "5" => Ok(Category::Custom),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// Score the classifier assigned to one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    pub score: f64,
}

impl CategoryScore {
    pub fn new(category: Category, score: f64) -> Self {
        Self { category, score }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_counts_are_fixed() {
        assert_eq!(Category::Infrastructure.required_test_count(), 5);
        assert_eq!(Category::NonConfigured.required_test_count(), 10);
        assert_eq!(Category::Configured.required_test_count(), 20);
        assert_eq!(Category::Custom.required_test_count(), 25);
    }

    #[test]
    fn test_most_conservative_is_custom() {
        assert_eq!(Category::most_conservative(), Category::Custom);
        for category in Category::ALL {
            assert!(category.strictness() <= Category::most_conservative().strictness());
        }
    }

    #[test]
    fn test_from_str_variants() {
        assert_eq!("custom".parse::<Category>().unwrap(), Category::Custom);
        assert_eq!("5".parse::<Category>().unwrap(), Category::Custom);
        assert_eq!("Category 4".parse::<Category>().unwrap(), Category::Configured);
        assert_eq!("category_3".parse::<Category>().unwrap(), Category::NonConfigured);
        assert_eq!("non-configured".parse::<Category>().unwrap(), Category::NonConfigured);
        assert_eq!("INFRASTRUCTURE".parse::<Category>().unwrap(), Category::Infrastructure);
        assert!("2".parse::<Category>().is_err());
        assert!("bespoke".parse::<Category>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Category::NonConfigured).unwrap();
        assert_eq!(json, "\"non_configured\"");
        let parsed: Category = serde_json::from_str("\"configured\"").unwrap();
        assert_eq!(parsed, Category::Configured);
    }
}
