use chrono::{DateTime, Local};

use crate::quote::{EquityQuote, ForexQuote, RateContext};

/// Everything one refresh cycle produced, in presentation order.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub updated_at: DateTime<Local>,
    pub forex: Vec<ForexQuote>,
    pub equities: Vec<EquityQuote>,
    /// `None` when no official rate was found, equities then stay in source currency.
    pub rate: Option<RateContext>,
}
