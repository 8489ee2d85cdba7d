//! Entitlements API payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::level::LevelName;

/// Body of `GET me/entitlements`.
///
/// `scopes` is required: a payload without it is malformed, never "no entitlements".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitlementsResponse {
    pub scopes: Vec<Scope>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    pub entitlements: Vec<Entitlement>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// A single licensed product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entitlement {
    #[serde(rename = "productCode")]
    pub product_code: String,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl EntitlementsResponse {
    /// All entitlements across all scopes, in payload order.
    pub fn entitlements(&self) -> impl Iterator<Item = &Entitlement> {
        self.scopes.iter().flat_map(|scope| scope.entitlements.iter())
    }
}

impl Entitlement {
    pub fn new(product_code: impl Into<String>) -> Self {
        Self {
            product_code: product_code.into(),
            extra: Map::new(),
        }
    }

    /// Name of the level this entitlement grants.
    pub fn level_name(&self) -> LevelName {
        LevelName::new(&self.product_code)
    }

    /// Full JSON form, for diagnostics.
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}

impl FromIterator<Entitlement> for EntitlementsResponse {
    /// Builds a single-scope response.
    fn from_iter<I: IntoIterator<Item = Entitlement>>(iter: I) -> Self {
        Self {
            scopes: vec![Scope {
                entitlements: iter.into_iter().collect(),
                extra: Map::new(),
            }],
            extra: Map::new(),
        }
    }
}
