//! HTTP client for the bank aggregator REST API.
//!
//! This is the only module in the workspace that talks to the network. It
//! implements `AggregatorClientTrait` from `kitty-core`, so the sync service
//! never sees HTTP details.

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use std::time::Duration;

use kitty_core::errors::{Error, Result};
use kitty_core::sync::{
    AggregatorClientTrait, ProviderAccount, ProviderPendingTransaction, ProviderTransaction,
};

use crate::models::{
    ApiAccountsResponse, ApiErrorResponse, ApiPendingResponse, ApiTransactionsResponse,
};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the aggregator API.
///
/// # Example
///
/// ```ignore
/// let client = AggregatorApiClient::new("https://api.example-aggregator.com", "your-token")?;
/// let accounts = client.list_accounts().await?;
/// ```
#[derive(Debug, Clone)]
pub struct AggregatorApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: HeaderValue,
}

impl AggregatorApiClient {
    /// Create a new aggregator API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the access token format is invalid or the HTTP
    /// client cannot be initialized.
    pub fn new(base_url: &str, access_token: &str) -> Result<Self> {
        let auth_header = HeaderValue::from_str(&format!("Bearer {}", access_token))
            .map_err(|e| Error::Upstream(format!("Invalid access token format: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Upstream(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, self.auth_header.clone());
        headers
    }

    /// Make a GET request and parse the response.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[Aggregator] GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Request failed: {}", e)))?;

        self.parse_response(response).await
    }

    /// Parse an HTTP response, surfacing the provider's error message when
    /// one is present.
    async fn parse_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            if let Ok(err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                let msg = err
                    .message
                    .or(err.error)
                    .unwrap_or_else(|| format!("HTTP {}", status));
                return Err(Error::Upstream(format!("API error: {}", msg)));
            }
            return Err(Error::Upstream(format!(
                "API error {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::Upstream(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl AggregatorClientTrait for AggregatorApiClient {
    async fn list_accounts(&self) -> Result<Vec<ProviderAccount>> {
        let api_response: ApiAccountsResponse = self.get("/api/v1/accounts").await?;

        info!(
            "[Aggregator] Fetched {} linked accounts",
            api_response.accounts.len()
        );
        Ok(api_response
            .accounts
            .into_iter()
            .map(ProviderAccount::from)
            .collect())
    }

    async fn list_transactions(
        &self,
        external_account_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<ProviderTransaction>> {
        let path = format!(
            "/api/v1/accounts/{}/transactions?since={}",
            urlencoding::encode(external_account_id),
            since.format("%Y-%m-%d")
        );
        let api_response: ApiTransactionsResponse = self.get(&path).await?;

        debug!(
            "[Aggregator] Fetched {} settled transactions for {} since {}",
            api_response.transactions.len(),
            external_account_id,
            since
        );
        Ok(api_response
            .transactions
            .into_iter()
            .map(ProviderTransaction::from)
            .collect())
    }

    async fn list_pending_transactions(
        &self,
        external_account_id: &str,
    ) -> Result<Vec<ProviderPendingTransaction>> {
        let path = format!(
            "/api/v1/accounts/{}/pending",
            urlencoding::encode(external_account_id)
        );
        let api_response: ApiPendingResponse = self.get(&path).await?;

        Ok(api_response
            .pending
            .into_iter()
            .map(ProviderPendingTransaction::from)
            .collect())
    }

    async fn trigger_refresh(&self, external_account_id: &str) -> Result<()> {
        let url = format!(
            "{}/api/v1/accounts/{}/refresh",
            self.base_url,
            urlencoding::encode(external_account_id)
        );
        debug!("[Aggregator] POST {}", url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Refresh request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "Refresh failed with {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }
        Ok(())
    }
}
