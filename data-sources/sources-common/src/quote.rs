use crate::symbol::SymbolRequest;

/// Canonical quote, whatever response shape it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub display_name: String,
    pub price: f64,
    pub previous_close: f64,
    pub volume: i64,
}

impl Quote {
    pub fn change(&self) -> f64 {
        self.price - self.previous_close
    }

    /// Zero when there is no previous close to compare against.
    pub fn change_percent(&self) -> f64 {
        if self.previous_close == 0.0 {
            return 0.0;
        }
        self.change() / self.previous_close * 100.0
    }
}

/// Built from a fetched quote and the request that asked for it.
pub trait FromQuote {
    fn from_quote(request: &SymbolRequest, quote: Quote) -> Self;

    fn symbol(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForexQuote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub previous_close: f64,
    pub change: f64,
    pub change_percent: f64,
}

impl FromQuote for ForexQuote {
    // Currency pairs keep the configured name, the official rate is looked up by it.
    fn from_quote(request: &SymbolRequest, quote: Quote) -> Self {
        Self {
            change: quote.change(),
            change_percent: quote.change_percent(),
            symbol: request.symbol.clone(),
            name: request.display_name.clone(),
            price: quote.price,
            previous_close: quote.previous_close,
        }
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquityQuote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub previous_close: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: i64,
    pub market: String,
    /// Price and change are in local currency.
    pub converted: bool,
}

impl FromQuote for EquityQuote {
    fn from_quote(request: &SymbolRequest, quote: Quote) -> Self {
        Self {
            change: quote.change(),
            change_percent: quote.change_percent(),
            symbol: request.symbol.clone(),
            market: request.market().unwrap_or_default().to_string(),
            name: quote.display_name,
            price: quote.price,
            previous_close: quote.previous_close,
            volume: quote.volume,
            converted: false,
        }
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }
}

/// The exchange rate chosen for one refresh cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct RateContext {
    pub symbol: String,
    pub name: String,
    pub rate: f64,
}

impl From<&ForexQuote> for RateContext {
    fn from(quote: &ForexQuote) -> Self {
        Self {
            symbol: quote.symbol.clone(),
            name: quote.name.clone(),
            rate: quote.price,
        }
    }
}
