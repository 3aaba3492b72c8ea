use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, COOKIE},
    Client,
};
use tracing::debug;
use url::Url;

use crate::{config::SourceConfig, error::Error};

#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// A single GET, no retries.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<RawResponse, Error>;
}

/// Connection-pooled client carrying the configured header set and cookie on every request.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &SourceConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .default_headers(default_headers(config)?)
            .timeout(config.timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<RawResponse, Error> {
        debug!(%url, "Run query");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

fn default_headers(config: &SourceConfig) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| Error::InvalidHeader(name.clone()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| Error::InvalidHeader(format!("{name}: {value}")))?;
        headers.insert(name, value);
    }
    if let Some(cookie) = &config.cookie {
        let value = HeaderValue::from_str(cookie)
            .map_err(|_| Error::InvalidHeader(format!("cookie: {cookie}")))?;
        headers.insert(COOKIE, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_from_config() {
        let config = SourceConfig::default();
        let headers = default_headers(&config).unwrap();
        assert_eq!(headers.get("referer").unwrap(), "https://finance.yahoo.com/");
        assert_eq!(headers.get(COOKIE).unwrap(), "B=59jd1o5g2nojr&b=3&s=ls");
    }

    #[test]
    fn bad_header_name() {
        let mut config = SourceConfig::default();
        config.headers.insert("Bad Header".into(), "1".into());
        assert!(matches!(
            default_headers(&config),
            Err(Error::InvalidHeader(name)) if name == "Bad Header"
        ));
    }
}
