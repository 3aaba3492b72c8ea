pub mod quote;
pub mod snapshot;
pub mod source;
pub mod symbol;

pub use quote::{EquityQuote, ForexQuote, FromQuote, Quote, RateContext};
pub use snapshot::MarketSnapshot;
pub use source::QuoteSource;
pub use symbol::{Category, SymbolRequest};
