use std::future::Future;

use reqwest::Client as HttpClient;

use crate::api::models::{ChatMessage, SendMessageResponse};
use crate::error::ApiError;

pub const SEND_MESSAGE_PATH: &str = "message/send-message";

/// Persists a message that was already broadcast over the socket.
pub trait MessageApi: Send + Sync + 'static {
    fn send_message(
        &self,
        payload: &ChatMessage,
        token: Option<&str>,
    ) -> impl Future<Output = Result<SendMessageResponse, ApiError>> + Send;
}

pub struct ApiClient {
    pub http: HttpClient,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_http(HttpClient::new(), base_url)
    }

    pub fn with_http(http: HttpClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn with_auth(mut req: reqwest::RequestBuilder, token: Option<&str>) -> reqwest::RequestBuilder {
        if let Some(t) = token.filter(|t| !t.is_empty()) {
            req = req.header("Authorization", format!("Bearer {}", t));
        }
        req
    }

    /// POST the `{message, senderId, receiverId}` triple to the backend.
    /// Any non-2xx status is an error, even when the body carries a message.
    pub async fn send_message(
        &self,
        payload: &ChatMessage,
        token: Option<&str>,
    ) -> Result<SendMessageResponse, ApiError> {
        let endpoint = self.endpoint(SEND_MESSAGE_PATH);
        let req = Self::with_auth(self.http.post(&endpoint), token).json(payload);
        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status().as_u16()));
        }
        Ok(resp.json::<SendMessageResponse>().await?)
    }
}

impl MessageApi for ApiClient {
    fn send_message(
        &self,
        payload: &ChatMessage,
        token: Option<&str>,
    ) -> impl Future<Output = Result<SendMessageResponse, ApiError>> + Send {
        ApiClient::send_message(self, payload, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = ApiClient::new("http://localhost:5000/api/");
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert_eq!(
            client.endpoint(SEND_MESSAGE_PATH),
            "http://localhost:5000/api/message/send-message"
        );
    }
}
