//! HTTP data source - JSON backend over reqwest.
//!
//! Requires the `http` feature.
//!
//! ## Wire contract
//!
//! - `GET <base><list>` returns a JSON array. Any other JSON shape is read as an empty list.
//! - `POST <base><create>` with the draft as JSON returns the created record.
//! - `PATCH <base><transition>` returns the updated record.
//! - Non-2xx bodies may carry `{"detail": "..."}` or `{"error": "..."}`; the text is
//!   used verbatim as the rejection message.

use std::marker::PhantomData;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{DataSource, Endpoints, SourceError, WritableSource};
use crate::config::ClientConfig;
use crate::record::Record;

/// JSON backend client for one resource.
pub struct HttpSource<R, D = R> {
    client: Client,
    base_url: String,
    endpoints: Endpoints,
    _marker: PhantomData<fn() -> (R, D)>,
}

impl<R, D> HttpSource<R, D> {
    /// Build a source from configuration.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Network` if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig, endpoints: Endpoints) -> Result<Self, SourceError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SourceError::Network(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(client, &config.base_url, endpoints))
    }

    /// Build a source around an existing client.
    pub fn with_client(client: Client, base_url: &str, endpoints: Endpoints) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            endpoints,
            _marker: PhantomData,
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl<R, D> DataSource for HttpSource<R, D>
where
    R: Record,
    D: 'static,
{
    type Record = R;

    async fn fetch_all(&self) -> Result<Vec<R>, SourceError> {
        let url = self.url(&self.endpoints.list);
        tracing::debug!(%url, "fetching list");

        let response = self.client.get(&url).send().await.map_err(network)?;
        let response = ensure_success(response, "Failed to fetch records").await?;
        let body: Value = decode(response).await?;

        match body {
            Value::Array(_) => {
                serde_json::from_value(body).map_err(|e| SourceError::Decode(e.to_string()))
            }
            _ => Ok(Vec::new()),
        }
    }
}

impl<R, D> WritableSource for HttpSource<R, D>
where
    R: Record,
    D: Serialize + Send + Sync + 'static,
{
    type Draft = D;

    async fn create(&self, draft: &D) -> Result<R, SourceError> {
        let path = self
            .endpoints
            .create
            .as_deref()
            .ok_or_else(|| SourceError::rejected(format!("{} creation is not supported", R::KIND)))?;
        let url = self.url(path);
        tracing::debug!(%url, "creating record");

        let response = self.client.post(&url).json(draft).send().await.map_err(network)?;
        decode(ensure_success(response, "Failed to create record").await?).await
    }

    async fn transition(&self, id: &R::Id, action: &str) -> Result<R, SourceError> {
        let path = self
            .endpoints
            .transition_path(id, action)
            .ok_or_else(|| SourceError::rejected(format!("unsupported action: {}", action)))?;
        let url = self.url(&path);
        tracing::debug!(%url, action, "transitioning record");

        let response = self.client.patch(&url).send().await.map_err(network)?;
        let fallback = format!("Failed to {} {}", action, R::KIND);
        decode(ensure_success(response, &fallback).await?).await
    }
}

fn network(err: reqwest::Error) -> SourceError {
    SourceError::Network(err.to_string())
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, SourceError> {
    response
        .json()
        .await
        .map_err(|e| SourceError::Decode(e.to_string()))
}

/// Pass 2xx responses through; turn anything else into a rejection.
async fn ensure_success(response: Response, fallback: &str) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(SourceError::Rejected {
        status: Some(status.as_u16()),
        message: rejection_message(&body).unwrap_or_else(|| fallback.to_string()),
    })
}

/// Extract the human-readable message from an error body.
fn rejection_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["detail", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
}
