//! Serving units and conversion constants

use std::fmt;

use serde::{Deserialize, Serialize};

/// Grams per milliliter assumed when a food has no known density
pub const DEFAULT_GRAMS_PER_ML: f64 = 1.0;

/// Grams per cup assumed when a food has no known cup weight
pub const DEFAULT_GRAMS_PER_CUP: f64 = 240.0;

/// Unit a serving size is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServingUnit {
    #[serde(rename = "g")]
    Grams,
    #[serde(rename = "ml")]
    Milliliters,
    #[serde(rename = "pz")]
    Pieces,
    #[serde(rename = "cup")]
    Cups,
}

impl ServingUnit {
    pub const ALL: [ServingUnit; 4] = [
        ServingUnit::Grams,
        ServingUnit::Milliliters,
        ServingUnit::Pieces,
        ServingUnit::Cups,
    ];

    /// Canonical tag stored in the database
    pub fn as_tag(&self) -> &'static str {
        match self {
            ServingUnit::Grams => "g",
            ServingUnit::Milliliters => "ml",
            ServingUnit::Pieces => "pz",
            ServingUnit::Cups => "cup",
        }
    }

    /// Parse a unit tag, accepting the usual aliases
    pub fn parse(tag: &str) -> Option<Self> {
        let lower = tag.trim().to_lowercase();

        match lower.as_str() {
            "g" | "gr" | "gram" | "grams" | "grammi" => Some(ServingUnit::Grams),
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
                Some(ServingUnit::Milliliters)
            }
            "pz" | "pc" | "pcs" | "piece" | "pieces" | "pezzo" | "pezzi" | "each" | "count" => {
                Some(ServingUnit::Pieces)
            }
            "cup" | "cups" | "tazza" | "tazze" => Some(ServingUnit::Cups),
            _ => None,
        }
    }
}

impl fmt::Display for ServingUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_tags() {
        for unit in ServingUnit::ALL {
            assert_eq!(ServingUnit::parse(unit.as_tag()), Some(unit));
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(ServingUnit::parse("Grams"), Some(ServingUnit::Grams));
        assert_eq!(ServingUnit::parse(" ML "), Some(ServingUnit::Milliliters));
        assert_eq!(ServingUnit::parse("piece"), Some(ServingUnit::Pieces));
        assert_eq!(ServingUnit::parse("each"), Some(ServingUnit::Pieces));
        assert_eq!(ServingUnit::parse("cups"), Some(ServingUnit::Cups));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(ServingUnit::parse("tbsp"), None);
        assert_eq!(ServingUnit::parse(""), None);
    }

    #[test]
    fn test_serde_uses_tags() {
        let json = serde_json::to_string(&ServingUnit::Pieces).unwrap();
        assert_eq!(json, "\"pz\"");
        let unit: ServingUnit = serde_json::from_str("\"cup\"").unwrap();
        assert_eq!(unit, ServingUnit::Cups);
    }
}
