//! # CashCached Client SDK
//!
//! A typed Rust client for the CashCached wallet and report APIs.
//! Implements the [`WalletApi`] and [`ReportApi`] ports.

use cashcached_types::{
    ApiError, CurrencyCode, CustomerId, ExportedReport, ReportApi, ReportFilters, ReportKind,
    WalletApi, WalletMutationRequest, parse_balance_payload,
};
use cashcached_types::domain::report::filename_from_content_disposition;
use reqwest::{Client, header};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) => ApiError::Transport(e.to_string()),
            ClientError::Api { status, message } => ApiError::Api { status, message },
            ClientError::Json(e) => ApiError::Json(e.to_string()),
        }
    }
}

/// CashCached API client.
#[derive(Clone)]
pub struct CashCachedClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl CashCachedClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            http: Client::new(),
        }
    }

    /// Sets the bearer token sent with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Wallet
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetches the raw balance response body.
    pub async fn wallet_balance_raw(
        &self,
        customer_id: &CustomerId,
    ) -> Result<serde_json::Value, ClientError> {
        let path = format!(
            "/api/financials/wallet/balance/{}",
            urlencoding::encode(customer_id.as_str())
        );
        self.get(&path).await
    }

    /// Fetches and validates the wallet balance.
    pub async fn wallet_balance(&self, customer_id: &CustomerId) -> Result<f64, ApiError> {
        let body = self.wallet_balance_raw(customer_id).await?;
        parse_balance_payload(&body)
    }

    /// Credits the wallet.
    pub async fn add_to_wallet(
        &self,
        customer_id: &CustomerId,
        amount: f64,
        currency: CurrencyCode,
    ) -> Result<(), ClientError> {
        let req = WalletMutationRequest {
            customer_id: customer_id.clone(),
            amount,
            currency,
        };
        self.post_unit("/api/financials/wallet/add", &req).await
    }

    /// Debits the wallet.
    pub async fn withdraw_from_wallet(
        &self,
        customer_id: &CustomerId,
        amount: f64,
        currency: CurrencyCode,
    ) -> Result<(), ClientError> {
        let req = WalletMutationRequest {
            customer_id: customer_id.clone(),
            amount,
            currency,
        };
        self.post_unit("/api/financials/wallet/withdraw", &req).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reports
    // ─────────────────────────────────────────────────────────────────────────

    /// Downloads a CSV report.
    pub async fn export_report(
        &self,
        kind: ReportKind,
        filters: &ReportFilters,
    ) -> Result<ExportedReport, ClientError> {
        let mut url = format!("{}{}", self.base_url, kind.export_path());
        if !filters.is_empty() {
            url.push('?');
            url.push_str(&filters.to_query_string());
        }
        tracing::debug!(%url, "exporting report");

        let resp = self.authorized(self.http.get(&url)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::api_error(status, resp).await);
        }

        let filename = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_content_disposition)
            .unwrap_or_else(|| kind.default_filename(chrono::Utc::now().date_naive()));
        let content = resp.bytes().await?.to_vec();

        Ok(ExportedReport {
            kind,
            filename,
            content,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Plumbing
    // ─────────────────────────────────────────────────────────────────────────

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET");
        let resp = self.authorized(self.http.get(url)).send().await?;
        self.handle_response(resp).await
    }

    async fn post_unit<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<(), ClientError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST");
        let resp = self
            .authorized(self.http.post(url).json(body))
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::api_error(status, resp).await)
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            Err(Self::api_error(status, resp).await)
        }
    }

    /// Builds an API error, preferring the server's `message` then `error` field.
    async fn api_error(status: reqwest::StatusCode, resp: reqwest::Response) -> ClientError {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                ["message", "error"]
                    .iter()
                    .find_map(|field| v.get(*field).and_then(|m| m.as_str()).map(String::from))
            })
            .unwrap_or(body);
        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait::async_trait]
impl WalletApi for CashCachedClient {
    async fn get_balance(&self, customer_id: &CustomerId) -> Result<f64, ApiError> {
        self.wallet_balance(customer_id).await
    }

    async fn add(&self, req: &WalletMutationRequest) -> Result<(), ApiError> {
        self.add_to_wallet(&req.customer_id, req.amount, req.currency.clone())
            .await
            .map_err(Into::into)
    }

    async fn withdraw(&self, req: &WalletMutationRequest) -> Result<(), ApiError> {
        self.withdraw_from_wallet(&req.customer_id, req.amount, req.currency.clone())
            .await
            .map_err(Into::into)
    }
}

#[async_trait::async_trait]
impl ReportApi for CashCachedClient {
    async fn export_csv(
        &self,
        kind: ReportKind,
        filters: &ReportFilters,
    ) -> Result<ExportedReport, ApiError> {
        self.export_report(kind, filters).await.map_err(Into::into)
    }
}
