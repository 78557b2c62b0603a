use async_trait::async_trait;
use log::debug;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::error::ClientError;
use crate::models::{Envelope, IdenticalVoteRequest, IdenticalVoteSummary, VoteRecorded, VoteRequest};

pub const VOTE_PATH: &str = "/vote";
pub const VOTE_IDENTICAL_PATH: &str = "/vote-identical";

const USER_AGENT: &str = concat!("trusty-classify/", env!("CARGO_PKG_VERSION"));

/// The voting service. One call per user action, no retries.
#[async_trait]
pub trait VoteBackend: Send + Sync {
    async fn vote(&self, request: &VoteRequest) -> Result<VoteRecorded, ClientError>;

    async fn vote_identical(
        &self,
        request: &IdenticalVoteRequest,
    ) -> Result<IdenticalVoteSummary, ClientError>;
}

/// `VoteBackend` over HTTP + JSON.
pub struct HttpBackend {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| ClientError::Transport(format!("bad session cookie: {}", e)))?;
            headers.insert(header::COOKIE, value);
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!("POST {}", url);

        let response = self.http_client.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        decode_body(status, &text)
    }
}

#[async_trait]
impl VoteBackend for HttpBackend {
    async fn vote(&self, request: &VoteRequest) -> Result<VoteRecorded, ClientError> {
        self.post(VOTE_PATH, request).await
    }

    async fn vote_identical(
        &self,
        request: &IdenticalVoteRequest,
    ) -> Result<IdenticalVoteSummary, ClientError> {
        self.post(VOTE_IDENTICAL_PATH, request).await
    }
}

/// Interprets a response body whatever its status: any JSON envelope is
/// answered on its `success` flag, anything else is a transport-level fault.
/// A confirmed envelope whose payload does not decode is `Unreadable`.
pub fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ClientError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| ClientError::Decode(format!("HTTP {}: {}", status.as_u16(), e)))?;
    envelope.open()
}
