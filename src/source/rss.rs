//! Client of the RSS pool scoring API.
use super::api::Result;
use crate::{error::SourceError, types::PoolScore};
use url::Url;

/// Fetches pool scores from `{base}/api/rss?poolID={id}`.
#[derive(Debug, Clone)]
pub struct RssClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl RssClient {
    /// Creates a client for the API served at `base_url`.
    pub fn new(client: reqwest::Client, base_url: &Url) -> Result<Self> {
        let endpoint =
            base_url.join("api/rss").map_err(|err| SourceError::invalid_field("rss url", err))?;
        Ok(Self { client, endpoint })
    }

    /// Returns the URL queried for `pool_id`.
    pub fn score_url(&self, pool_id: u64) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("poolID", &pool_id.to_string());
        url
    }

    /// Returns the score of a pool.
    pub async fn score(&self, pool_id: u64) -> Result<PoolScore> {
        let score: PoolScore = self
            .client
            .get(self.score_url(pool_id))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !score.total_score.is_finite() {
            return Err(SourceError::invalid_field("totalScore", score.total_score));
        }

        Ok(score)
    }
}
