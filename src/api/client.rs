//! Client for the shape search and address sample API.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use super::error::{ApiError, Result};
use super::endpoint::UrlBuilder;
use crate::config::ApiConfig;
use crate::models::{
    Bounds, BuildingType, HealthResponse, MultiPolygonGeometry, SampleRequest, SampleResponse,
    SampleSizeUnit, SearchResponse, Shape, ShapePointer, ShapeResponse,
};

/// Typed wrapper around the address API.
///
/// Every call is a single round trip: no retries, no caching.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    urls: UrlBuilder,
}

impl ApiClient {
    /// Create a client with default HTTP settings
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_config(&ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(ApiError::Client)?;

        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            urls: UrlBuilder::new(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        self.urls.base()
    }

    /// Check that the API is up. Returns the reported status string.
    pub async fn health(&self) -> Result<String> {
        let url = self.urls.path("/")?;
        let body: HealthResponse = self.send_json(self.client.get(url.clone()), &url).await?;
        Ok(body.status)
    }

    /// Search shapes for the given text.
    ///
    /// Matching happens on the server; results are returned as-is.
    pub async fn search(&self, needle: &str) -> Result<Vec<ShapePointer>> {
        let url = self.urls.url("/search", [("q", needle)])?;
        self.run_search(url).await
    }

    /// Like [`ApiClient::search`], asking for at most `limit` results.
    pub async fn search_with_limit(&self, needle: &str, limit: u32) -> Result<Vec<ShapePointer>> {
        let url = self
            .urls
            .url("/search", [("q", needle.to_string()), ("limit", limit.to_string())])?;
        self.run_search(url).await
    }

    async fn run_search(&self, url: Url) -> Result<Vec<ShapePointer>> {
        let body: SearchResponse = self.send_json(self.client.get(url.clone()), &url).await?;
        info!("Search returned {} shapes", body.results.len());
        Ok(body.results)
    }

    /// Fetch the geometry for a shape.
    ///
    /// The returned feature's properties are the given pointer, not anything
    /// derived from the response.
    pub async fn fetch_shape(&self, pointer: &ShapePointer) -> Result<Shape> {
        let url = self.urls.url(
            "/shape",
            [
                ("kind", pointer.kind.to_string()),
                ("gid", pointer.gid.to_string()),
            ],
        )?;
        let body: ShapeResponse = self.send_json(self.client.get(url.clone()), &url).await?;

        let geometry = match body {
            ShapeResponse::Geometry(geom) => geom,
            ShapeResponse::Wrapped { geom, .. } => serde_json::from_str::<MultiPolygonGeometry>(
                &geom,
            )
            .map_err(|source| ApiError::Decode {
                url: url.to_string(),
                source,
            })?,
        };

        debug!(
            "Fetched {} {} with {} polygons",
            pointer.kind,
            pointer.gid,
            geometry.coordinates.len()
        );
        Ok(Shape::new(pointer.clone(), geometry))
    }

    /// Draw a random address sample within `bounds`.
    pub async fn sample(
        &self,
        bounds: impl Into<Bounds>,
        n: u64,
        unit: SampleSizeUnit,
        types: &[BuildingType],
    ) -> Result<SampleResponse> {
        let request = SampleRequest::new(bounds.into(), n, unit).with_types(types.iter().copied());
        self.sample_request(&request).await
    }

    /// Send a prepared sample request.
    ///
    /// Validation messages in the response are logged but are not errors.
    pub async fn sample_request(&self, request: &SampleRequest) -> Result<SampleResponse> {
        let url = self.urls.path("/sample")?;
        let body: SampleResponse = self
            .send_json(self.client.post(url.clone()).json(request), &url)
            .await?;

        info!(
            "Sample drew {} addresses (requested {})",
            body.addresses.len(),
            body.n
        );
        for message in &body.validation {
            warn!("Sample validation: {}", message);
        }
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, url: &Url) -> Result<T> {
        debug!("Requesting {}", url);

        let response = request.send().await.map_err(|source| ApiError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| ApiError::Request {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
