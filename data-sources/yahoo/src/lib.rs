pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod transport;

pub use client::QuoteClient;
pub use config::{RetryPolicy, SourceConfig};
pub use error::Error;
pub use protocol::{normalize, ParsedQuote, Variant};
pub use transport::{HttpTransport, RawResponse, Transport};
