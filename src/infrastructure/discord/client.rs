//! Discord REST client for the calls the client delegates.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, header};
use tracing::{debug, warn};

use super::dto::{ErrorResponse, RedeemGiftRequest};
use crate::domain::entities::{AuthToken, ChannelId};
use crate::domain::errors::ApiError;
use crate::domain::ports::RestPort;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_RETRY_AFTER_MS: u64 = 5000;

/// REST adapter backed by `reqwest`.
pub struct DiscordRestClient {
    client: Client,
    base_url: String,
    token: Option<AuthToken>,
}

impl DiscordRestClient {
    /// Creates a client against `base_url`. Without a token every call fails
    /// with [`ApiError::MissingToken`].
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(base_url: impl Into<String>, token: Option<AuthToken>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::unexpected(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns true if calls will carry an `Authorization` header.
    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn ack_url(&self, channel_id: ChannelId) -> String {
        format!("{}/channels/{channel_id}/messages/ack", self.base_url)
    }

    fn redeem_url(&self, code: &str) -> String {
        format!("{}/entitlements/gift-codes/{code}/redeem", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.token.as_ref().ok_or(ApiError::MissingToken)?;
        Ok(request.header(header::AUTHORIZATION, token.as_str()))
    }

    async fn execute(&self, request: RequestBuilder, resource: &str) -> Result<(), ApiError> {
        let response = self.authorized(request)?.send().await.map_err(|e| {
            warn!(error = %e, resource, "Failed to reach Discord API");
            if e.is_timeout() {
                ApiError::network("request timed out")
            } else if e.is_connect() {
                ApiError::network("failed to connect to Discord")
            } else {
                ApiError::network(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(resource, status = %status, "Request succeeded");
            return Ok(());
        }

        Err(handle_error_response(status, response, resource).await)
    }
}

async fn handle_error_response(
    status: StatusCode,
    response: reqwest::Response,
    resource: &str,
) -> ApiError {
    let body = response.json::<ErrorResponse>().await.ok();
    let retry_after = body.as_ref().and_then(|error| error.retry_after);
    let error_message = body.map_or_else(|| format!("HTTP {status}"), |error| error.message);

    match status {
        StatusCode::UNAUTHORIZED => ApiError::rejected("invalid or expired token"),
        StatusCode::FORBIDDEN => ApiError::rejected(format!("access denied: {error_message}")),
        StatusCode::NOT_FOUND => ApiError::not_found(resource),
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited {
            retry_after_ms: retry_after_ms(retry_after),
        },
        StatusCode::BAD_REQUEST => ApiError::rejected(error_message),
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            ApiError::network("Discord API is temporarily unavailable")
        }
        _ => ApiError::unexpected(format!("unexpected response: {status} - {error_message}")),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn retry_after_ms(seconds: Option<f64>) -> u64 {
    seconds
        .filter(|s| s.is_finite() && *s >= 0.0)
        .map_or(DEFAULT_RETRY_AFTER_MS, |s| (s * 1000.0).ceil() as u64)
}

#[async_trait]
impl RestPort for DiscordRestClient {
    async fn delete_channel_ack(&self, channel_id: ChannelId) -> Result<(), ApiError> {
        debug!(channel_id = %channel_id, "Deleting channel read state");
        let request = self.client.delete(self.ack_url(channel_id));
        self.execute(request, &format!("channel {channel_id}")).await
    }

    async fn redeem_gift(&self, code: &str, channel_id: ChannelId) -> Result<(), ApiError> {
        debug!(code, channel_id = %channel_id, "Redeeming gift code");
        let request = self
            .client
            .post(self.redeem_url(code))
            .json(&RedeemGiftRequest { channel_id });
        self.execute(request, &format!("gift code {code}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DiscordRestClient {
        DiscordRestClient::new("https://example.test/api/v9/", None).unwrap()
    }

    #[test]
    fn test_urls() {
        let client = client();

        assert_eq!(client.base_url(), "https://example.test/api/v9");
        assert_eq!(
            client.ack_url(ChannelId(12)),
            "https://example.test/api/v9/channels/12/messages/ack"
        );
        assert_eq!(
            client.redeem_url("abc123"),
            "https://example.test/api/v9/entitlements/gift-codes/abc123/redeem"
        );
    }

    #[test]
    fn test_redeem_body() {
        let body = serde_json::to_value(RedeemGiftRequest {
            channel_id: ChannelId(7),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "channel_id": "7" }));
    }

    #[test]
    fn test_retry_after() {
        assert_eq!(retry_after_ms(Some(1.25)), 1250);
        assert_eq!(retry_after_ms(None), DEFAULT_RETRY_AFTER_MS);
        assert_eq!(retry_after_ms(Some(-1.0)), DEFAULT_RETRY_AFTER_MS);
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_sending() {
        let client = client();
        assert!(!client.has_token());

        let err = client.redeem_gift("abc", ChannelId(1)).await.unwrap_err();
        assert_eq!(err, ApiError::MissingToken);

        let err = client.delete_channel_ack(ChannelId(1)).await.unwrap_err();
        assert_eq!(err, ApiError::MissingToken);
    }
}
