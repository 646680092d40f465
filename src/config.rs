//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::money::Locale;

/// Tunables for the analytics reducer and display helpers.
///
/// Deserializes with every field optional, so callers can store only the
/// values they override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Maximum number of entries in the low-stock list
    pub low_stock_limit: usize,
    /// Revenue growth (%) above which "Strong Revenue Growth" fires
    pub strong_growth_pct: i64,
    /// Revenue growth (%) below which "Revenue Decline" fires
    pub decline_pct: i64,
    /// Average order value growth (%) above which "Increased Order Value" fires
    pub aov_growth_pct: i64,
    /// Share (%) of top-product revenue held by the best seller before
    /// "Product Concentration Risk" fires
    pub concentration_share_pct: i64,
    /// Growth (%) of the best category before "Category Winner" fires
    pub category_winner_growth_pct: i64,
    pub default_locale: Locale,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            low_stock_limit: 10,
            strong_growth_pct: 20,
            decline_pct: -10,
            aov_growth_pct: 15,
            concentration_share_pct: 40,
            category_winner_growth_pct: 30,
            default_locale: Locale::EnIn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"lowStockLimit": 5, "defaultLocale": "en-US"}"#).unwrap();

        assert_eq!(config.low_stock_limit, 5);
        assert_eq!(config.default_locale, Locale::EnUs);
        assert_eq!(config.strong_growth_pct, 20);
        assert_eq!(config.decline_pct, -10);
    }
}
