//! ETH/USD price feed.
use super::api::Result;
use crate::error::SourceError;
use serde_json::Value;
use tracing::trace;
use url::Url;

/// Where the ETH/USD conversion factor comes from.
#[derive(Debug, Clone)]
pub enum PriceFeed {
    /// CoinGecko simple price API.
    CoinGecko {
        /// HTTP client.
        client: reqwest::Client,
        /// Simple price endpoint, with the query already set.
        url: Url,
    },
    /// A constant price. Should only be used for testing.
    Constant(f64),
}

impl PriceFeed {
    /// Creates a CoinGecko feed from the API base URL.
    ///
    /// A demo API key is read from `GECKO_API`, if set.
    pub fn coingecko(client: reqwest::Client, base_url: &Url) -> Result<Self> {
        let mut url = base_url
            .join("api/v3/simple/price")
            .map_err(|err| SourceError::invalid_field("coingecko url", err))?;
        url.query_pairs_mut()
            .append_pair("ids", "ethereum")
            .append_pair("vs_currencies", "usd")
            .append_pair("x_cg_demo_api_key", &std::env::var("GECKO_API").unwrap_or_default());

        Ok(Self::CoinGecko { client, url })
    }

    /// Returns the price of one ETH in USD.
    pub async fn eth_usd(&self) -> Result<f64> {
        let (client, url) = match self {
            Self::Constant(price) => return Ok(*price),
            Self::CoinGecko { client, url } => (client, url),
        };

        let resp: Value = client.get(url.clone()).send().await?.error_for_status()?.json().await?;
        trace!(response = ?resp, "CoinGecko response.");

        parse_eth_usd(&resp)
    }
}

fn parse_eth_usd(resp: &Value) -> Result<f64> {
    let price = resp
        .get("ethereum")
        .and_then(|v| v.get("usd"))
        .and_then(Value::as_f64)
        .ok_or_else(|| SourceError::invalid_field("eth price", resp))?;

    if price <= 0.0 {
        return Err(SourceError::invalid_field("eth price", price));
    }

    Ok(price)
}
