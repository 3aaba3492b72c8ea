use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum Category {
    Currency,
    Equity { market: String },
}

/// One configured symbol to fetch each cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct SymbolRequest {
    pub symbol: String,
    pub display_name: String,
    #[serde(flatten)]
    pub category: Category,
}

impl SymbolRequest {
    pub fn currency(symbol: &str, display_name: &str) -> Self {
        Self {
            symbol: symbol.into(),
            display_name: display_name.into(),
            category: Category::Currency,
        }
    }

    pub fn equity(symbol: &str, display_name: &str, market: &str) -> Self {
        Self {
            symbol: symbol.into(),
            display_name: display_name.into(),
            category: Category::Equity {
                market: market.into(),
            },
        }
    }

    pub fn market(&self) -> Option<&str> {
        match &self.category {
            Category::Currency => None,
            Category::Equity { market } => Some(market),
        }
    }
}
