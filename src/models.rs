use serde::{Deserialize, Serialize};

/// A citation backing part of an answer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Source {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A web search hit that can be promoted into the knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WebResult {
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// One completed search. Replaced wholesale by the next search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchResult {
    pub answer: String,
    pub doc_sources: Vec<Source>,
    pub web_sources: Vec<Source>,
    pub web_results_full: Vec<WebResult>,
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest<'a> {
    pub query: &'a str,
    pub n_results: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct HybridSearchRequest<'a> {
    pub query: &'a str,
    pub use_web: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    answer: String,
    #[serde(default)]
    sources: Vec<Source>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HybridSearchResponse {
    #[serde(default)]
    answer: String,
    #[serde(default)]
    doc_sources: Vec<Source>,
    #[serde(default)]
    web_sources: Vec<Source>,
    #[serde(default)]
    web_results_full: Vec<WebResult>,
    #[serde(default)]
    model: Option<String>,
}

impl From<SearchResponse> for SearchResult {
    fn from(response: SearchResponse) -> Self {
        SearchResult {
            answer: response.answer,
            doc_sources: response.sources,
            web_sources: Vec::new(),
            web_results_full: Vec::new(),
            model: response.model,
        }
    }
}

impl From<HybridSearchResponse> for SearchResult {
    fn from(response: HybridSearchResponse) -> Self {
        SearchResult {
            answer: response.answer,
            doc_sources: response.doc_sources,
            web_sources: response.web_sources,
            web_results_full: response.web_results_full,
            model: response.model,
        }
    }
}

/// Server-side ingestion unit. Never patched locally; always re-fetched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexedSource {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub doc_count: u64,
}

impl IndexedSource {
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.kind,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SourcesResponse {
    #[serde(default)]
    pub sources: Vec<IndexedSource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub sources: u64,
    #[serde(default)]
    pub documents: u64,
    #[serde(default)]
    pub searches: u64,
    #[serde(default)]
    pub chromadb_count: Option<u64>,
}

/// Acknowledgement returned by mutating endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub source_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "chunks", default)]
    pub chunks_indexed: u64,
}

/// Transient manual-entry form state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManualDocumentDraft {
    pub title: String,
    pub content: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ManualDocumentRequest<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub url: Option<&'a str>,
}

impl<'a> From<&'a ManualDocumentDraft> for ManualDocumentRequest<'a> {
    fn from(draft: &'a ManualDocumentDraft) -> Self {
        let url = draft.url.trim();
        ManualDocumentRequest {
            title: draft.title.trim(),
            content: &draft.content,
            url: if url.is_empty() { None } else { Some(url) },
        }
    }
}
