//! Access to the profile server.
//!
//! [`ProfileGateway`] is the seam the draft store talks to; [`HttpGateway`]
//! is the `reqwest` implementation. Every call is bounded by the configured
//! timeout so a hung request surfaces as [`ClientError::Timeout`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use heartline_core::UserId;
use heartline_core::api::{
    ActionResponse, ProfileTraits, ProfileView, UpdateProfileRequest, UpdateProfileResult,
};

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Server operations used by the draft store.
#[async_trait]
pub trait ProfileGateway: Send + Sync {
    /// Load the committed profile.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<ProfileView, ClientError>;

    /// Save name and social handles.
    async fn update_profile(
        &self,
        user_id: &UserId,
        request: &UpdateProfileRequest,
    ) -> Result<UpdateProfileResult, ClientError>;

    /// Save age, gender and trait lists.
    async fn save_traits(&self, user_id: &UserId, traits: &ProfileTraits)
    -> Result<(), ClientError>;
}

/// HTTP implementation of [`ProfileGateway`].
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl HttpGateway {
    /// Create a gateway for the server configured in `config`.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: config.api_url.clone(),
            timeout: config.request_timeout,
        }
    }

    /// `{base}/api/profile/{user_id}/{extra...}` with each segment escaped.
    fn profile_url(&self, user_id: &UserId, extra: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidState("API URL cannot be a base"))?
            .pop_if_empty()
            .extend(["api", "profile", user_id.as_str()])
            .extend(extra);
        Ok(url)
    }

    async fn send<B, T>(&self, method: Method, url: Url, body: Option<&B>) -> Result<Option<T>, ClientError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        with_timeout(self.timeout, async {
            let response = request.send().await?;
            let status = response.status();
            let text = response.text().await?;

            let envelope: ActionResponse<T> = match serde_json::from_str(&text) {
                Ok(envelope) => envelope,
                Err(e) if status.is_success() => return Err(ClientError::Serialization(e)),
                Err(_) => {
                    warn!(%status, body = %text.chars().take(200).collect::<String>(), "Unexpected error body");
                    return Err(ClientError::Server {
                        status: status.as_u16(),
                        message: format!("HTTP {status}"),
                    });
                }
            };

            envelope.into_result().map_err(|message| ClientError::Server {
                status: status.as_u16(),
                message,
            })
        })
        .await
    }
}

/// Run `fut`, failing with [`ClientError::Timeout`] after `timeout`.
async fn with_timeout<T, F>(timeout: Duration, fut: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Err(ClientError::Http(e))) if e.is_timeout() => Err(ClientError::Timeout),
        Ok(result) => result,
        Err(_) => Err(ClientError::Timeout),
    }
}

#[async_trait]
impl ProfileGateway for HttpGateway {
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn fetch_profile(&self, user_id: &UserId) -> Result<ProfileView, ClientError> {
        let url = self.profile_url(user_id, &[])?;
        let view = self
            .send::<(), ProfileView>(Method::GET, url, None)
            .await?
            .ok_or(ClientError::InvalidState("profile response had no data"))?;

        debug!(handles = view.social_handles.len(), "Fetched profile");
        Ok(view)
    }

    #[instrument(skip(self, request), fields(user_id = %user_id))]
    async fn update_profile(
        &self,
        user_id: &UserId,
        request: &UpdateProfileRequest,
    ) -> Result<UpdateProfileResult, ClientError> {
        let url = self.profile_url(user_id, &[])?;
        Ok(self
            .send::<_, UpdateProfileResult>(Method::PUT, url, Some(request))
            .await?
            .unwrap_or_default())
    }

    #[instrument(skip(self, traits), fields(user_id = %user_id))]
    async fn save_traits(
        &self,
        user_id: &UserId,
        traits: &ProfileTraits,
    ) -> Result<(), ClientError> {
        let url = self.profile_url(user_id, &["traits"])?;
        self.send::<_, serde_json::Value>(Method::PUT, url, Some(traits))
            .await?;
        Ok(())
    }
}
