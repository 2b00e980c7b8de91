use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classify::normalize_model;

/// Per-million-token dollar rates for one model category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPrice {
    pub input_per_1m: f64,
    pub output_per_1m: f64,
}

/// Immutable pricing data injected at startup. Keyed by the classifier's
/// model category, with a mid-tier default for anything unrecognized, so
/// rate changes are a data update rather than a redeploy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTable {
    pub models: BTreeMap<String, ModelPrice>,
    pub default_price: ModelPrice,
}

impl PricingTable {
    pub fn builtin() -> Self {
        let mut models = BTreeMap::new();
        models.insert(
            "claude-opus".to_string(),
            ModelPrice {
                input_per_1m: 15.0,
                output_per_1m: 75.0,
            },
        );
        models.insert(
            "claude-sonnet".to_string(),
            ModelPrice {
                input_per_1m: 3.0,
                output_per_1m: 15.0,
            },
        );
        models.insert(
            "claude-haiku".to_string(),
            ModelPrice {
                input_per_1m: 0.8,
                output_per_1m: 4.0,
            },
        );
        models.insert(
            "gpt".to_string(),
            ModelPrice {
                input_per_1m: 2.5,
                output_per_1m: 10.0,
            },
        );
        Self {
            models,
            // Unrecognized models bill at the sonnet mid-tier rate.
            default_price: ModelPrice {
                input_per_1m: 3.0,
                output_per_1m: 15.0,
            },
        }
    }

    /// Rates for a raw model string, via the classifier's category.
    pub fn price_for(&self, raw_model: &str) -> ModelPrice {
        let category = normalize_model(raw_model);
        self.models
            .get(category)
            .copied()
            .unwrap_or(self.default_price)
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::builtin()
    }
}
