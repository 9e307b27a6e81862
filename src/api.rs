use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::error::{ClientError, Result};
use crate::models::{
    Ack, HybridSearchRequest, HybridSearchResponse, IndexedSource, ManualDocumentDraft,
    ManualDocumentRequest, SearchRequest, SearchResponse, SearchResult, SourcesResponse, Stats,
    UploadReceipt, WebResult,
};
use crate::upload::UploadCandidate;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
}

/// Thin REST client for the knowledge-base backend.
///
/// Every call is a single request/response pair: no retries, caching or
/// de-duplication. Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    n_results: usize,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn with_config(config: &ApiConfig) -> Self {
        let client = match config.timeout_secs {
            Some(secs) => reqwest::Client::builder()
                .timeout(Duration::from_secs(secs))
                .build()
                .unwrap_or_else(|e| {
                    tracing::warn!("Could not apply request timeout: {}", e);
                    reqwest::Client::new()
                }),
            None => reqwest::Client::new(),
        };

        ApiClient {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            n_results: config.n_results,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn n_results(&self) -> usize {
        self.n_results
    }

    pub async fn search(&self, query: &str, n_results: usize) -> Result<SearchResult> {
        let body = SearchRequest { query, n_results };
        let response: SearchResponse = self.send_json(Method::POST, "/search", Some(&body)).await?;
        Ok(response.into())
    }

    pub async fn hybrid_search(&self, query: &str, use_web: bool) -> Result<SearchResult> {
        let body = HybridSearchRequest { query, use_web };
        let response: HybridSearchResponse =
            self.send_json(Method::POST, "/search/hybrid", Some(&body)).await?;
        Ok(response.into())
    }

    pub async fn save_web_result(&self, result: &WebResult) -> Result<Ack> {
        self.send_json(Method::POST, "/save-web-result", Some(result)).await
    }

    pub async fn add_manual_document(&self, draft: &ManualDocumentDraft) -> Result<Ack> {
        let body = ManualDocumentRequest::from(draft);
        self.send_json(Method::POST, "/index/manual", Some(&body)).await
    }

    pub async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
        let response: SourcesResponse =
            self.send_json::<(), _>(Method::GET, "/sources", None).await?;
        Ok(response.sources)
    }

    pub async fn delete_source(&self, id: i64) -> Result<Ack> {
        let path = format!("/sources/{}", id);
        self.send_json::<(), _>(Method::DELETE, &path, None).await
    }

    pub async fn get_stats(&self) -> Result<Stats> {
        self.send_json::<(), _>(Method::GET, "/stats", None).await
    }

    /// Uploads a file that already passed pre-flight validation.
    pub async fn upload_file(&self, file: &UploadCandidate) -> Result<UploadReceipt> {
        let bytes = tokio::fs::read(file.path()).await.map_err(|e| {
            ClientError::request(None, format!("Could not read {}: {}", file.file_name(), e))
        })?;

        let part = Part::bytes(bytes).file_name(file.file_name().to_string());
        let form = Form::new().part("file", part);

        let request = self.request(Method::POST, "/upload").multipart(form);
        Self::read_json(request.send().await?).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(method = method.as_str(), url = %url, "api request");
        self.client.request(method, url)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        Self::read_json(request.send().await?).await
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }

    async fn error_from(response: Response) -> ClientError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let detail = detail_message(&body);
        let message = detail
            .clone()
            .unwrap_or_else(|| format!("Request failed with status code {}", status));

        tracing::debug!(status, %message, "api error");
        ClientError::Request { status: Some(status), message, detail }
    }
}

/// Extracts a string `detail` from an error body, if there is one.
fn detail_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail),
        _ => None,
    }
}
