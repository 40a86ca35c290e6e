use async_trait::async_trait;
use reqwest::{Client, Method};
use shared::{
    domain::ActivitySet,
    error::{ApiErrorBody, ApiRejection},
    protocol::{
        MessageBody, ACTIVITIES_PATH, EMAIL_QUERY_KEY, PARTICIPANTS_SEGMENT, SIGNUP_SEGMENT,
    },
};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

pub mod config;
pub mod controller;
pub mod html;
pub mod view;

pub use config::ClientSettings;
pub use controller::{execute, BoardController, Effect, Event, Phase, StatusMessage, Tone, ViewState};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url '{0}'")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server answered with status {status}")]
    Status { status: u16 },
    #[error("malformed activities payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<url::ParseError> for ClientError {
    fn from(value: url::ParseError) -> Self {
        Self::InvalidUrl(value.to_string())
    }
}

/// Result of a signup or removal that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Accepted { message: Option<String> },
    Rejected(ApiRejection),
}

#[async_trait]
pub trait ActivityApi: Send + Sync {
    async fn load_activities(&self) -> Result<ActivitySet, ClientError>;
    async fn signup(&self, activity: &str, email: &str) -> Result<MutationOutcome, ClientError>;
    async fn remove_participant(
        &self,
        activity: &str,
        email: &str,
    ) -> Result<MutationOutcome, ClientError>;
}

/// `ActivityApi` over HTTP with reqwest.
pub struct HttpActivityApi {
    http: Client,
    base_url: Url,
}

impl HttpActivityApi {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        Self::with_client(server_url, Client::new())
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Self::with_client(&settings.server_url, builder.build()?)
    }

    fn with_client(server_url: &str, http: Client) -> Result<Self, ClientError> {
        let base_url = Url::parse(server_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(server_url.to_string()));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends each segment to the base path, percent-encoding it as a single
    /// path segment (so `/` inside an activity name stays inside the name).
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn send_mutation(
        &self,
        method: Method,
        url: Url,
        email: &str,
    ) -> Result<MutationOutcome, ClientError> {
        debug!(%method, %url, "sending activity mutation");
        let response = self
            .http
            .request(method, url)
            .query(&[(EMAIL_QUERY_KEY, email)])
            .send()
            .await?;
        let status = response.status();
        // Unreadable or non-JSON bodies count as `{}`.
        let body = response.bytes().await.unwrap_or_default();

        if status.is_success() {
            let body: MessageBody = serde_json::from_slice(&body).unwrap_or_default();
            info!(status = status.as_u16(), "activity mutation accepted");
            Ok(MutationOutcome::Accepted {
                message: body.message,
            })
        } else {
            let body: ApiErrorBody = serde_json::from_slice(&body).unwrap_or_default();
            let rejection = ApiRejection::new(status.as_u16(), body.detail);
            warn!(code = ?rejection.code, status = rejection.status, "activity mutation rejected");
            Ok(MutationOutcome::Rejected(rejection))
        }
    }
}

#[async_trait]
impl ActivityApi for HttpActivityApi {
    async fn load_activities(&self) -> Result<ActivitySet, ClientError> {
        let url = self.endpoint(&[ACTIVITIES_PATH])?;
        debug!(%url, "loading activities");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        let activities: ActivitySet = serde_json::from_slice(&body)?;
        info!(count = activities.len(), "loaded activities");
        Ok(activities)
    }

    async fn signup(&self, activity: &str, email: &str) -> Result<MutationOutcome, ClientError> {
        let url = self.endpoint(&[ACTIVITIES_PATH, activity, SIGNUP_SEGMENT])?;
        self.send_mutation(Method::POST, url, email).await
    }

    async fn remove_participant(
        &self,
        activity: &str,
        email: &str,
    ) -> Result<MutationOutcome, ClientError> {
        let url = self.endpoint(&[ACTIVITIES_PATH, activity, PARTICIPANTS_SEGMENT])?;
        self.send_mutation(Method::DELETE, url, email).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
