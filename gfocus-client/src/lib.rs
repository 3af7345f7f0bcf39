//! # GFocus Client
//!
//! A typed Rust client for the GFocus payment backend. Implements the
//! `PaymentBackend` port so it can drive the checkout workflow.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use gfocus_types::{
    BackendError, CheckPaymentStatusRequest, ConfirmTransactionRequest, PaymentBackend,
    PaymentStatusResponse, TransactionCode,
};

/// Per-request timeout applied unless a custom `reqwest::Client` is supplied.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

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

impl From<ClientError> for BackendError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) if e.is_decode() => BackendError::Decode(e.to_string()),
            ClientError::Http(e) => BackendError::Transport(e.to_string()),
            ClientError::Api { status, message } => BackendError::Status { status, message },
            ClientError::Json(e) => BackendError::Decode(e.to_string()),
        }
    }
}

/// Payment backend API client.
#[derive(Debug, Clone)]
pub struct CheckoutClient {
    base_url: String,
    http: Client,
}

impl CheckoutClient {
    /// Creates a new client for the given API base.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Creates a client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http_client(base_url, http))
    }

    /// Creates a client around a preconfigured `reqwest::Client`.
    pub fn with_http_client(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Registers a pending transaction.
    pub async fn confirm_transaction(
        &self,
        req: &ConfirmTransactionRequest,
    ) -> Result<(), ClientError> {
        let resp = self.send("/confirm_transaction", req).await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        Err(Self::api_error(status, resp).await)
    }

    /// Fetches the status of a registered transaction.
    pub async fn check_payment_status(
        &self,
        transaction_note: &str,
    ) -> Result<PaymentStatusResponse, ClientError> {
        let req = CheckPaymentStatusRequest {
            transaction_note: transaction_note.to_string(),
        };
        self.post("/check_payment_status", &req).await
    }

    async fn send<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST");
        Ok(self.http.post(url).json(body).send().await?)
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self.send(path, body).await?;
        self.handle_response(resp).await
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

    async fn api_error(status: reqwest::StatusCode, resp: reqwest::Response) -> ClientError {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or(body);
        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl PaymentBackend for CheckoutClient {
    async fn register_transaction(
        &self,
        req: &ConfirmTransactionRequest,
    ) -> Result<(), BackendError> {
        Ok(self.confirm_transaction(req).await?)
    }

    async fn check_payment_status(
        &self,
        code: &TransactionCode,
    ) -> Result<PaymentStatusResponse, BackendError> {
        Ok(CheckoutClient::check_payment_status(self, code.as_str()).await?)
    }
}
