//! Shared inventory types used by the sweets core and CLI.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Server-assigned record identifier.
pub type SweetId = u64;

/// Sweet category as understood by the inventory server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Chocolate,
    Gummy,
    HardCandy,
    Other,
}

impl Category {
    /// Returns the identifier sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Chocolate => "CHOCOLATE",
            Category::Gummy => "GUMMY",
            Category::HardCandy => "HARD_CANDY",
            Category::Other => "OTHER",
        }
    }

    /// Returns the human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Chocolate => "Chocolate",
            Category::Gummy => "Gummy",
            Category::HardCandy => "Hard Candy",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts wire ids and loose spellings (`hard-candy`, `Hard Candy`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "CHOCOLATE" => Ok(Self::Chocolate),
            "GUMMY" => Ok(Self::Gummy),
            "HARD_CANDY" => Ok(Self::HardCandy),
            "OTHER" => Ok(Self::Other),
            _ => Err(format!(
                "Unknown category: {value} (expected one of CHOCOLATE, GUMMY, HARD_CANDY, OTHER)"
            )),
        }
    }
}

/// One inventory record as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sweet {
    pub id: SweetId,
    pub name: String,
    pub category: Category,
    pub price: Decimal,
    pub quantity: u32,
    /// Present on servers that track stock separately from quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_level: Option<i64>,
    /// Only included for privileged sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
}

/// Writable fields of a record, used for create and update.
///
/// Quantity stays signed so out-of-range values reach the server, which owns
/// validation and reports it per field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweetFields {
    pub name: String,
    pub category: Category,
    pub price: Decimal,
    pub quantity: i64,
}

/// Transient search criteria. Only non-empty fields are transmitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    /// Case-insensitive substring match on the name.
    pub name: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub category: Option<Category>,
}

impl SearchFilter {
    /// Returns true if no field would be transmitted.
    pub fn is_empty(&self) -> bool {
        self.trimmed_name().is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.category.is_none()
    }

    /// Returns the query parameters for the non-empty fields, in wire order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(name) = self.trimmed_name() {
            pairs.push(("name", name.to_string()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("min_price", min.to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("max_price", max.to_string()));
        }
        if let Some(category) = self.category {
            pairs.push(("category", category.as_str().to_string()));
        }
        pairs
    }

    fn trimmed_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}
