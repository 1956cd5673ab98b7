//! Task category value object

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::DomainError;

/// The fixed set of categories a task can be filed under
///
/// Serialized with the capitalized variant name (`"Work"`, `"Shopping"`, ...).
/// Parsing is case-insensitive so model output such as `"work"` or
/// `" SHOPPING "` is accepted, but anything outside the set is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    Work,
    Personal,
    Shopping,
    Health,
    Learning,
    Finance,
    Home,
    Social,
    Travel,
    Creative,
    /// Catch-all used when nothing more specific applies
    #[default]
    General,
}

impl Category {
    /// Every category, in declaration order
    #[must_use]
    pub const fn all() -> [Self; 11] {
        [
            Self::Work,
            Self::Personal,
            Self::Shopping,
            Self::Health,
            Self::Learning,
            Self::Finance,
            Self::Home,
            Self::Social,
            Self::Travel,
            Self::Creative,
            Self::General,
        ]
    }

    /// Human-readable label, identical to the serialized form
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Personal => "Personal",
            Self::Shopping => "Shopping",
            Self::Health => "Health",
            Self::Learning => "Learning",
            Self::Finance => "Finance",
            Self::Home => "Home",
            Self::Social => "Social",
            Self::Travel => "Travel",
            Self::Creative => "Creative",
            Self::General => "General",
        }
    }

    #[must_use]
    pub const fn is_general(&self) -> bool {
        matches!(self, Self::General)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::UnknownCategory(wanted.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_general() {
        assert_eq!(Category::default(), Category::General);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("work".parse::<Category>().unwrap(), Category::Work);
        assert_eq!(" SHOPPING ".parse::<Category>().unwrap(), Category::Shopping);
        assert_eq!("Health".parse::<Category>().unwrap(), Category::Health);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "Gardening".parse::<Category>().unwrap_err();
        assert_eq!(err, DomainError::UnknownCategory("Gardening".to_string()));
        assert!("".parse::<Category>().is_err());
    }

    #[test]
    fn serializes_with_label() {
        let json = serde_json::to_string(&Category::Learning).unwrap();
        assert_eq!(json, "\"Learning\"");
        let back: Category = serde_json::from_str("\"Travel\"").unwrap();
        assert_eq!(back, Category::Travel);
    }

    #[test]
    fn all_lists_general_last() {
        let all = Category::all();
        assert_eq!(all.len(), 11);
        assert_eq!(all[10], Category::General);
        assert!(all[10].is_general());
        assert!(!all[0].is_general());
    }
}
