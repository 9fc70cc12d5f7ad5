//! HTTP client for the personas físicas REST API.
//!
//! Implements [`PersonasBackend`] on top of reqwest.

use crate::api::error::ApiError;
use crate::api::models::{Envelope, NewPersonaFisica, PersonaFisica};
use crate::api::store::PersonasBackend;
use crate::config::Config;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Collection path under the API base URL.
const COLLECTION: &str = "personas-fisicas";

/// REST client for persona física records.
#[derive(Debug, Clone)]
pub struct PersonasClient {
    /// HTTP client for API requests
    client: Client,
    /// API base URL, e.g. `http://localhost:4000/api`
    base_url: Url,
    /// Optional bearer token
    token: Option<String>,
}

impl PersonasClient {
    /// Create a new client from configuration.
    ///
    /// # Arguments
    /// * `config` - Application configuration
    ///
    /// # Returns
    /// * `Result<PersonasClient, ApiError>` - New client or error
    ///
    /// # Details
    /// The base URL must be an absolute http(s) URL. The request timeout
    /// applies to every call.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let base_url = Url::parse(config.api_base_url.trim())
            .map_err(|_| ApiError::InvalidBaseUrl(config.api_base_url.clone()))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(config.api_base_url.clone()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()
            .map_err(|source| ApiError::Transport {
                url: base_url.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            base_url,
            token: config.api_token.clone().filter(|token| !token.is_empty()),
        })
    }

    /// Build the URL of the collection, or of one record when `id` is given.
    pub fn endpoint(&self, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(COLLECTION);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Response, ApiError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response, url: &Url) -> Result<T, ApiError> {
        response
            .json::<Envelope<T>>()
            .await
            .map(Envelope::into_inner)
            .map_err(|source| ApiError::Decode {
                url: url.to_string(),
                source,
            })
    }

    /// Map a 404 on a single-record URL to [`ApiError::NotFound`].
    fn not_found(id: &str, error: ApiError) -> ApiError {
        match error {
            ApiError::Status { status, .. } if status == StatusCode::NOT_FOUND => {
                ApiError::NotFound(id.to_string())
            }
            other => other,
        }
    }
}

impl PersonasBackend for PersonasClient {
    async fn list(&self) -> Result<Vec<PersonaFisica>, ApiError> {
        let url = self.endpoint(None);
        let response = self.send(self.client.get(url.clone()), &url).await?;
        Self::decode(response, &url).await
    }

    async fn get(&self, id: &str) -> Result<PersonaFisica, ApiError> {
        let url = self.endpoint(Some(id));
        let response = self
            .send(self.client.get(url.clone()), &url)
            .await
            .map_err(|e| Self::not_found(id, e))?;
        Self::decode(response, &url).await
    }

    async fn create(&self, persona: &NewPersonaFisica) -> Result<PersonaFisica, ApiError> {
        let url = self.endpoint(None);
        let response = self
            .send(self.client.post(url.clone()).json(persona), &url)
            .await?;
        Self::decode(response, &url).await
    }

    async fn update(
        &self,
        id: &str,
        changes: &NewPersonaFisica,
    ) -> Result<PersonaFisica, ApiError> {
        let url = self.endpoint(Some(id));
        let response = self
            .send(self.client.put(url.clone()).json(changes), &url)
            .await
            .map_err(|e| Self::not_found(id, e))?;
        Self::decode(response, &url).await
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(Some(id));
        self.send(self.client.delete(url.clone()), &url)
            .await
            .map_err(|e| Self::not_found(id, e))?;
        Ok(())
    }
}
