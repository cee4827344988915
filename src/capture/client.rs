use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::models::{AuthResponse, Entry, LoginRequest, NewEntryRequest, SignupRequest};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message} ({status})")]
    Api { status: u16, message: String },

    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// JSON client for the tracker backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| "Request failed".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    /// Logs in and keeps the issued token for later calls.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self
            .send(self.http.post(self.url("/api/auth/login")).json(&body))
            .await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    pub async fn signup(&mut self, request: &SignupRequest) -> Result<AuthResponse, ClientError> {
        let auth: AuthResponse = self
            .send(self.http.post(self.url("/api/auth/signup")).json(request))
            .await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    pub async fn topics(&self) -> Result<Vec<String>, ClientError> {
        self.send(self.http.get(self.url("/api/topics"))).await
    }

    pub async fn create_entry(&self, entry: &NewEntryRequest) -> Result<Entry, ClientError> {
        self.send(self.http.post(self.url("/api/entries")).json(entry))
            .await
    }

    pub async fn entries_by_topic(&self, topic: &str) -> Result<Vec<Entry>, ClientError> {
        let mut url = Url::parse(&self.url("/api/entries/topic/"))
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push(topic);
        self.send(self.http.get(url)).await
    }
}
