//! Step roles and configuration paths.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic slot of a configuration step.
///
/// The embedded widget exposes no metadata, so roles are inferred from
/// position and text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepRole {
    Count,
    Strategy,
    Bundle,
    Unknown,
}

impl StepRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Strategy => "strategy",
            Self::Bundle => "bundle",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for StepRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// High-level configuration strategy chosen at the STRATEGY step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Path {
    Custom,
    Predesigned,
}

impl Path {
    /// Derive the path from the STRATEGY step's selected value.
    ///
    /// Any value mentioning "custom" (case-insensitive) is the custom path;
    /// everything else is pre-designed.
    pub fn from_strategy(value: &str) -> Self {
        if value.to_lowercase().contains("custom") {
            Self::Custom
        } else {
            Self::Predesigned
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::Predesigned => "predesigned",
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_from_strategy() {
        assert_eq!(Path::from_strategy("Custom Build"), Path::Custom);
        assert_eq!(Path::from_strategy("CUSTOM-BUILD-STRATEGY"), Path::Custom);
        assert_eq!(Path::from_strategy("Pre-designed"), Path::Predesigned);
        assert_eq!(Path::from_strategy(""), Path::Predesigned);
    }

    #[test]
    fn test_role_serialize() {
        let json = serde_json::to_string(&StepRole::Strategy).unwrap();
        assert_eq!(json, "\"strategy\"");
    }

    #[test]
    fn test_path_serialize() {
        assert_eq!(serde_json::to_string(&Path::Predesigned).unwrap(), "\"predesigned\"");
        let path: Path = serde_json::from_str("\"custom\"").unwrap();
        assert_eq!(path, Path::Custom);
    }
}
