use async_trait::async_trait;
use sources_common::{Quote, QuoteSource};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::SourceConfig,
    error::Error,
    protocol::{normalize, Variant},
    transport::{HttpTransport, RawResponse, Transport},
};

const HTTP_OK: u16 = 200;
const HTTP_UNAUTHORIZED: u16 = 401;

/// Fetches one quote per call: the chart endpoint first, the quote summary
/// endpoint when the chart endpoint is unusable.
pub struct QuoteClient<T = HttpTransport> {
    transport: T,
    config: SourceConfig,
}

impl QuoteClient<HttpTransport> {
    pub fn new(config: SourceConfig) -> Result<Self, Error> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: Transport> QuoteClient<T> {
    pub fn with_transport(transport: T, config: SourceConfig) -> Self {
        Self { transport, config }
    }

    pub async fn fetch_quote(&self, symbol: &str) -> Result<Quote, Error> {
        let mut variant = Variant::Chart;
        info!(symbol, "Query quote");

        let response = match self.get_with_retry(variant, symbol, false).await {
            Ok(response) => response,
            Err(e) if e.triggers_fallback() => {
                variant = variant.alternate();
                warn!(symbol, %e, ?variant, "Switch to fallback endpoint");
                self.get_with_retry(variant, symbol, true).await?
            }
            Err(e) => return Err(e),
        };

        if response.status != HTTP_OK {
            return Err(Error::UnexpectedStatus {
                status: response.status,
            });
        }

        let quote = normalize(&response.body, variant, symbol)?;
        debug!(?quote, "Quote fetched");
        Ok(quote)
    }

    /// Up to `max_attempts` requests against one endpoint variant, backing off
    /// after every transport failure, 5xx or 401. On the fallback variant a 401
    /// ends the request at once, there is nothing left to switch to.
    async fn get_with_retry(
        &self,
        variant: Variant,
        symbol: &str,
        fallback: bool,
    ) -> Result<RawResponse, Error> {
        let raw_url = self.config.url_for(variant, symbol);
        let url = Url::parse(&raw_url).map_err(|e| Error::InvalidUrl(raw_url.clone(), e))?;
        let retry = &self.config.retry;

        let mut last_transport_error = None;
        let mut last_status = None;

        for attempt in 0..retry.max_attempts {
            if attempt > 0 {
                info!(attempt = attempt + 1, max = retry.max_attempts, %url, "Retry");
            }

            match self.transport.get(&url).await {
                Ok(response) if response.status == HTTP_UNAUTHORIZED && fallback => {
                    return Err(Error::AuthRejected {
                        url: url.to_string(),
                    });
                }
                Ok(response) if response.status < 500 && response.status != HTTP_UNAUTHORIZED => {
                    return Ok(response);
                }
                Ok(response) => {
                    warn!(status = response.status, %url, "Endpoint rejected request");
                    last_status = Some(response.status);
                }
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    warn!(%e, %url, "Request failed");
                    last_transport_error = Some(e);
                }
            }

            let delay = retry.backoff(attempt);
            debug!(?delay, "Wait before next attempt");
            tokio::time::sleep(delay).await;
        }

        match (last_status, last_transport_error) {
            (Some(HTTP_UNAUTHORIZED), _) => Err(Error::AuthRejected {
                url: url.to_string(),
            }),
            (Some(status), _) => Err(Error::Server {
                status,
                attempts: retry.max_attempts,
            }),
            (None, Some(e)) => Err(e),
            (None, None) => Err(Error::Transport(format!(
                "no attempt was made against {url}"
            ))),
        }
    }
}

#[async_trait]
impl<T: Transport> QuoteSource for QuoteClient<T> {
    type Error = Error;

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, Error> {
        QuoteClient::fetch_quote(self, symbol).await
    }
}
