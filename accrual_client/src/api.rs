use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER},
    Client,
    Response,
    StatusCode,
};

use crate::{AccrualApiError, AccrualConfig, AccrualReply, AccrualResponse};

/// Anything that can tell us the accrual status of an order.
#[allow(async_fn_in_trait)]
pub trait AccrualProvider {
    /// Queries the accrual status for the order with the given number.
    ///
    /// "Order unknown" is not an error: it is reported as [`AccrualReply::NotRegistered`].
    async fn fetch_order_accrual(&self, number: &str) -> Result<AccrualReply, AccrualApiError>;
}

#[derive(Clone)]
pub struct AccrualApi {
    config: AccrualConfig,
    client: Arc<Client>,
}

impl AccrualApi {
    pub fn new(config: AccrualConfig) -> Result<Self, AccrualApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AccrualApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, number: &str) -> String {
        format!("{}/api/orders/{number}", self.config.base_url)
    }

    pub fn config(&self) -> &AccrualConfig {
        &self.config
    }
}

impl AccrualProvider for AccrualApi {
    async fn fetch_order_accrual(&self, number: &str) -> Result<AccrualReply, AccrualApiError> {
        let url = self.url(number);
        trace!("🧮️ Querying accrual service: {url}");
        let response = self.client.get(url).send().await.map_err(|e| AccrualApiError::Transport(e.to_string()))?;
        parse_response(response).await
    }
}

async fn parse_response(response: Response) -> Result<AccrualReply, AccrualApiError> {
    let status = response.status();
    match status {
        StatusCode::OK => {
            let body = response.bytes().await.map_err(|e| AccrualApiError::Transport(e.to_string()))?;
            let result = serde_json::from_slice::<AccrualResponse>(&body)
                .map_err(|e| AccrualApiError::JsonError(format!("{e}. Body: {}", String::from_utf8_lossy(&body))))?;
            trace!("🧮️ Accrual service replied with {result:?}");
            Ok(AccrualReply::Found(result))
        },
        StatusCode::NO_CONTENT => Ok(AccrualReply::NotRegistered),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            Err(AccrualApiError::RateLimited { retry_after })
        },
        s if s.is_server_error() => Err(AccrualApiError::ServerError(s.as_u16())),
        s => {
            let message = response.text().await.unwrap_or_default();
            Err(AccrualApiError::UnexpectedStatus { status: s.as_u16(), message })
        },
    }
}

/// The longest back-off we accept from a `Retry-After` header.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(60 * 60);

/// Only the delta-seconds form of `Retry-After` is supported. HTTP dates are ignored. Values above
/// [`MAX_RETRY_AFTER`] are clamped.
fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(|secs| Duration::from_secs(secs).min(MAX_RETRY_AFTER))
}
