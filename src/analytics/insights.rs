//! Rule-based insights derived from the reduced analytics
//!
//! Each rule is an independent predicate that may produce one insight. Rules
//! run in a fixed order, so output order is stable.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::analytics::reducer::{CategoryPerformance, GrowthMetrics, LowStockItem, ProductPerformance};
use crate::config::EngineConfig;
use crate::money::to_display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Success,
    Warning,
    Info,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
}

impl Insight {
    fn new(kind: InsightKind, title: &str, message: String) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message,
        }
    }
}

/// Reduced figures the rules look at
pub struct InsightInputs<'a> {
    pub growth: &'a GrowthMetrics,
    /// Sorted best first
    pub top_products: &'a [ProductPerformance],
    /// Sorted by revenue, best first
    pub category_performance: &'a [CategoryPerformance],
    pub low_stock: &'a [LowStockItem],
}

type Rule = fn(&InsightInputs<'_>, &EngineConfig) -> Option<Insight>;

const RULES: [Rule; 6] = [
    strong_revenue_growth,
    revenue_decline,
    increased_order_value,
    product_concentration,
    stock_alert,
    category_winner,
];

/// Run every rule in order and collect the insights that fire
pub fn derive_insights(inputs: &InsightInputs<'_>, config: &EngineConfig) -> Vec<Insight> {
    RULES.iter().filter_map(|rule| rule(inputs, config)).collect()
}

fn strong_revenue_growth(inputs: &InsightInputs<'_>, config: &EngineConfig) -> Option<Insight> {
    (inputs.growth.revenue > BigDecimal::from(config.strong_growth_pct)).then(|| {
        Insight::new(
            InsightKind::Success,
            "Strong Revenue Growth",
            format!(
                "Revenue is up {}% on the previous period.",
                to_display(&inputs.growth.revenue)
            ),
        )
    })
}

fn revenue_decline(inputs: &InsightInputs<'_>, config: &EngineConfig) -> Option<Insight> {
    (inputs.growth.revenue < BigDecimal::from(config.decline_pct)).then(|| {
        Insight::new(
            InsightKind::Warning,
            "Revenue Decline",
            format!(
                "Revenue is down {}% on the previous period.",
                to_display(&inputs.growth.revenue.abs())
            ),
        )
    })
}

fn increased_order_value(inputs: &InsightInputs<'_>, config: &EngineConfig) -> Option<Insight> {
    (inputs.growth.aov > BigDecimal::from(config.aov_growth_pct)).then(|| {
        Insight::new(
            InsightKind::Success,
            "Increased Order Value",
            format!(
                "Average order value grew {}% on the previous period.",
                to_display(&inputs.growth.aov)
            ),
        )
    })
}

fn product_concentration(inputs: &InsightInputs<'_>, config: &EngineConfig) -> Option<Insight> {
    let top = inputs.top_products.first()?;
    let total: BigDecimal = inputs.top_products.iter().map(|p| &p.revenue).sum();
    if total <= BigDecimal::from(0) {
        return None;
    }

    let share = (&top.revenue * BigDecimal::from(100)) / total;
    (share > BigDecimal::from(config.concentration_share_pct)).then(|| {
        Insight::new(
            InsightKind::Info,
            "Product Concentration Risk",
            format!(
                "{} accounts for {}% of product revenue.",
                top.name,
                to_display(&share)
            ),
        )
    })
}

fn stock_alert(inputs: &InsightInputs<'_>, _config: &EngineConfig) -> Option<Insight> {
    let out_of_stock = inputs.low_stock.iter().filter(|item| item.stock_qty == 0).count();
    (out_of_stock > 0).then(|| {
        Insight::new(
            InsightKind::Alert,
            "Stock Alert",
            format!(
                "{} product{} out of stock, {} running low.",
                out_of_stock,
                if out_of_stock == 1 { "" } else { "s" },
                inputs.low_stock.len()
            ),
        )
    })
}

fn category_winner(inputs: &InsightInputs<'_>, config: &EngineConfig) -> Option<Insight> {
    let best = inputs.category_performance.first()?;
    (best.growth > BigDecimal::from(config.category_winner_growth_pct)).then(|| {
        Insight::new(
            InsightKind::Success,
            "Category Winner",
            format!(
                "{} leads with {}% growth.",
                best.category,
                to_display(&best.growth)
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    fn growth(revenue: &str, aov: &str) -> GrowthMetrics {
        GrowthMetrics {
            revenue: dec(revenue),
            orders: dec("0"),
            items: dec("0"),
            aov: dec(aov),
        }
    }

    fn product(id: &str, revenue: &str) -> ProductPerformance {
        ProductPerformance {
            product_id: id.to_string(),
            name: id.to_uppercase(),
            sku: None,
            category: Category::Women,
            revenue: dec(revenue),
            quantity_sold: 1,
        }
    }

    fn titles(inputs: &InsightInputs<'_>) -> Vec<String> {
        derive_insights(inputs, &EngineConfig::default())
            .into_iter()
            .map(|insight| insight.title)
            .collect()
    }

    #[test]
    fn test_no_insights_for_flat_period() {
        let growth = growth("0", "0");
        let inputs = InsightInputs {
            growth: &growth,
            top_products: &[],
            category_performance: &[],
            low_stock: &[],
        };
        assert!(titles(&inputs).is_empty());
    }

    #[test]
    fn test_growth_rules_at_thresholds() {
        let at_threshold = growth("20", "15");
        let inputs = InsightInputs {
            growth: &at_threshold,
            top_products: &[],
            category_performance: &[],
            low_stock: &[],
        };
        assert!(titles(&inputs).is_empty());

        let above = growth("20.01", "15.5");
        let inputs = InsightInputs {
            growth: &above,
            ..inputs
        };
        assert_eq!(
            titles(&inputs),
            vec!["Strong Revenue Growth", "Increased Order Value"]
        );

        let decline = growth("-10.01", "0");
        let inputs = InsightInputs {
            growth: &decline,
            ..inputs
        };
        assert_eq!(titles(&inputs), vec!["Revenue Decline"]);
    }

    #[test]
    fn test_product_concentration() {
        let growth = growth("0", "0");
        let concentrated = [product("a", "500"), product("b", "300"), product("c", "200")];
        let inputs = InsightInputs {
            growth: &growth,
            top_products: &concentrated,
            category_performance: &[],
            low_stock: &[],
        };
        let insights = derive_insights(&inputs, &EngineConfig::default());
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Info);
        assert!(insights[0].message.contains("50.00%"));

        let spread = [product("a", "400"), product("b", "300"), product("c", "300")];
        let inputs = InsightInputs {
            top_products: &spread,
            ..inputs
        };
        assert!(titles(&inputs).is_empty());
    }

    #[test]
    fn test_category_winner_uses_best_category() {
        let growth = growth("0", "0");
        let categories = [
            CategoryPerformance {
                category: Category::Women,
                revenue: dec("9000"),
                orders: 3,
                avg_value: dec("3000"),
                growth: dec("45"),
            },
            CategoryPerformance {
                category: Category::Men,
                revenue: dec("1000"),
                orders: 1,
                avg_value: dec("1000"),
                growth: dec("5"),
            },
        ];
        let inputs = InsightInputs {
            growth: &growth,
            top_products: &[],
            category_performance: &categories,
            low_stock: &[],
        };
        let insights = derive_insights(&inputs, &EngineConfig::default());
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].title, "Category Winner");
        assert!(insights[0].message.starts_with("women"));
    }
}
