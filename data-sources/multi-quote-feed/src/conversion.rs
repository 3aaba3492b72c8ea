use sources_common::{EquityQuote, ForexQuote, RateContext};

/// Pick the official rate among fetched currency quotes by display name.
///
/// An exact name match wins over a partial one; among partial matches the first
/// in `forex` order is taken. A zero price is not a usable rate.
pub fn select_rate(forex: &[ForexQuote], marker: &str) -> Option<RateContext> {
    forex
        .iter()
        .find(|q| q.name == marker)
        .or_else(|| forex.iter().find(|q| q.name.contains(marker)))
        .filter(|q| q.price != 0.0)
        .map(RateContext::from)
}

/// Rewrite price and change of `foreign_market` equities into local currency.
///
/// A zero rate means no rate this cycle and leaves every quote untouched.
/// `change_percent` and `previous_close` keep their unconverted values.
pub fn convert(mut quotes: Vec<EquityQuote>, rate: f64, foreign_market: &str) -> Vec<EquityQuote> {
    if rate == 0.0 {
        return quotes;
    }

    for quote in quotes.iter_mut().filter(|q| q.market == foreign_market) {
        quote.price *= rate;
        quote.change *= rate;
        quote.converted = true;
    }
    quotes
}
