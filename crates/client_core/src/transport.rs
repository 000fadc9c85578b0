//! reqwest-backed implementation of every backend seam.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::{ChatId, RequestId, UserId},
    protocol::{
        Chat, ChatMessage, ConnectionRequest, CreateProfileRequest, LoginRequest, LoginResponse,
        Profile, SendMessageRequest, UserInfo,
    },
};
use tracing::debug;
use url::Url;

use crate::{
    error::{ClientError, ClientResult},
    session::TokenStore,
    AuthApi, ChatApi, ProfileDirectory, RequestAction, RequestsApi,
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RestClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl RestClient {
    pub fn new(base_url: &Url, tokens: Arc<dyn TokenStore>) -> ClientResult<Self> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT, tokens)
    }

    pub fn with_timeout(
        base_url: &Url,
        timeout: Duration,
        tokens: Arc<dyn TokenStore>,
    ) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ClientError::Network(format!("failed to build http client: {err}")))?;
        Ok(Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.tokens.load() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and returns the JSON body of a 2xx response.
    async fn send_value(&self, builder: RequestBuilder) -> ClientResult<Value> {
        let response = self.authorized(builder).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!(status = status.as_u16(), "backend returned error status");
            return Err(ClientError::from_status(status.as_u16(), &body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body)
            .map_err(|err| ClientError::invalid_shape(format!("response is not json: {err}")))
    }

    async fn send_record<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let body = self.send_value(builder).await?;
        decode_record(body)
    }

    async fn send_listing<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> ClientResult<Vec<T>> {
        let body = self.send_value(builder).await?;
        decode_listing(body)
    }
}

/// Surfaces `{success: false, error}` bodies that arrive with a 2xx status.
fn reject_failed_envelope(body: &Value) -> ClientResult<()> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = shared::error::ErrorEnvelope::from_json(body)
            .and_then(|envelope| envelope.server_message().map(str::to_string))
            .unwrap_or_else(|| "request was not successful".to_string());
        return Err(ClientError::application(message));
    }
    Ok(())
}

/// Decodes either a bare record or one wrapped in `{data: ...}`.
pub(crate) fn decode_record<T: DeserializeOwned>(body: Value) -> ClientResult<T> {
    reject_failed_envelope(&body)?;
    let record = match body {
        Value::Object(mut map) if map.contains_key("data") => map.remove("data").unwrap_or_default(),
        other => other,
    };
    serde_json::from_value(record).map_err(|err| ClientError::invalid_shape(err.to_string()))
}

/// Decodes either a bare array or one wrapped in `{data: [...]}`.
pub(crate) fn decode_listing<T: DeserializeOwned>(body: Value) -> ClientResult<Vec<T>> {
    reject_failed_envelope(&body)?;
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => return Err(ClientError::invalid_shape("expected a data array")),
        },
        _ => return Err(ClientError::invalid_shape("expected an array or object")),
    };
    serde_json::from_value(Value::Array(items))
        .map_err(|err| ClientError::invalid_shape(err.to_string()))
}

#[async_trait]
impl ProfileDirectory for RestClient {
    async fn list_profiles(&self, page: u32, page_size: u32, search: &str) -> ClientResult<Value> {
        let request = self
            .http
            .get(self.endpoint("profiles/public"))
            .query(&[
                ("page", page.to_string()),
                ("limit", page_size.to_string()),
                ("search", search.to_string()),
            ]);
        self.send_value(request).await
    }

    async fn get_profile_by_user_id(&self, user_id: &UserId) -> ClientResult<Profile> {
        let request = self
            .http
            .get(self.endpoint(&format!("profiles/user/{user_id}")));
        self.send_record(request).await
    }

    async fn create_profile(&self, request: &CreateProfileRequest) -> ClientResult<()> {
        let builder = self.http.post(self.endpoint("profiles")).json(request);
        let body = self.send_value(builder).await?;
        reject_failed_envelope(&body)
    }
}

#[async_trait]
impl AuthApi for RestClient {
    async fn login(&self, email: &str, password: &str) -> ClientResult<String> {
        let request = self.http.post(self.endpoint("auth/login")).json(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        });
        let response: LoginResponse = self.send_record(request).await?;
        Ok(response.token)
    }

    async fn fetch_user_info(&self) -> ClientResult<UserInfo> {
        if self.tokens.load().is_none() {
            return Err(ClientError::NotAuthenticated);
        }
        self.send_record(self.http.get(self.endpoint("auth/me")))
            .await
    }

    async fn logout(&self) -> ClientResult<()> {
        self.send_value(self.http.post(self.endpoint("auth/logout")))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl RequestsApi for RestClient {
    async fn list_received_requests(&self) -> ClientResult<Vec<ConnectionRequest>> {
        self.send_listing(self.http.get(self.endpoint("requests/received")))
            .await
    }

    async fn respond_to_request(
        &self,
        request_id: &RequestId,
        action: RequestAction,
    ) -> ClientResult<()> {
        let request = self.http.put(self.endpoint(&format!(
            "requests/{request_id}/{}",
            action.as_str()
        )));
        let body = self.send_value(request).await?;
        reject_failed_envelope(&body)
    }
}

#[async_trait]
impl ChatApi for RestClient {
    async fn list_chats(&self) -> ClientResult<Vec<Chat>> {
        self.send_listing(self.http.get(self.endpoint("chats"))).await
    }

    async fn list_messages(&self, chat_id: &ChatId) -> ClientResult<Vec<ChatMessage>> {
        self.send_listing(
            self.http
                .get(self.endpoint(&format!("chats/{chat_id}/messages"))),
        )
        .await
    }

    async fn send_message(&self, chat_id: &ChatId, content: &str) -> ClientResult<ChatMessage> {
        let request = self
            .http
            .post(self.endpoint(&format!("chats/{chat_id}/messages")))
            .json(&SendMessageRequest {
                content: content.to_string(),
            });
        self.send_record(request).await
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
