//! Pinecone index client
//!
//! Talks to a managed Pinecone index over its REST API. Connection setup
//! resolves the data-plane host through the control plane and validates the
//! index dimension against the embedding model, so a misconfigured index
//! fails at startup with a clear diagnostic instead of per query.
//!
//! ref: https://docs.pinecone.io/reference/api

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ScoredRecord, VectorEntry, VectorIndex};
use crate::error::RagError;

const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct DescribeIndexResponse {
    host: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct UpsertRequest {
    vectors: Vec<WireVector>,
}

#[derive(Debug, Serialize)]
struct WireVector {
    id: String,
    values: Vec<f32>,
    metadata: WireMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMetadata {
    text: String,
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct UpsertResponse {
    #[serde(rename = "upsertedCount")]
    upserted_count: usize,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    vector: &'a [f32],
    #[serde(rename = "topK")]
    top_k: usize,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    metadata: Option<WireMetadata>,
}

// ============================================================================
// PineconeIndex
// ============================================================================

/// Client handle for one Pinecone index. Cheap to share; reqwest clients are
/// safe for concurrent use.
#[derive(Debug)]
pub struct PineconeIndex {
    client: reqwest::Client,
    host: String,
    api_key: String,
    index_name: String,
    dimension: usize,
}

impl PineconeIndex {
    /// Resolve the index host and validate its dimension. Fails fast when
    /// the index is missing or its dimension does not match the embedding
    /// model.
    pub async fn connect(
        api_key: &str,
        index_name: &str,
        expected_dimension: usize,
    ) -> Result<Self, RagError> {
        Self::connect_to(CONTROL_PLANE_URL, api_key, index_name, expected_dimension).await
    }

    /// `connect` against an explicit control-plane URL.
    pub async fn connect_to(
        control_plane: &str,
        api_key: &str,
        index_name: &str,
        expected_dimension: usize,
    ) -> Result<Self, RagError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RagError::Index(format!("failed to create HTTP client: {e}")))?;

        let url = format!(
            "{}/indexes/{}",
            control_plane.trim_end_matches('/'),
            index_name
        );
        let response = client
            .get(&url)
            .header("Api-Key", api_key)
            .send()
            .await
            .map_err(|e| RagError::Index(format!("failed to reach Pinecone: {e}")))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(RagError::Config(format!(
                "Pinecone index '{index_name}' not found - create it before ingesting"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::Index(format!(
                "failed to describe index '{index_name}' ({status}): {body}"
            )));
        }

        let described: DescribeIndexResponse = response
            .json()
            .await
            .map_err(|e| RagError::Index(format!("failed to parse describe response: {e}")))?;

        if described.dimension != expected_dimension {
            return Err(RagError::Config(format!(
                "Pinecone index '{index_name}' has dimension {} but the embedding model \
                 produces {expected_dimension} - recreate the index with the matching dimension",
                described.dimension
            )));
        }

        tracing::info!(
            "Connected to Pinecone index '{}' (dimension {})",
            index_name,
            described.dimension
        );

        Ok(Self {
            client,
            host: normalize_host(&described.host),
            api_key: api_key.to_string(),
            index_name: index_name.to_string(),
            dimension: described.dimension,
        })
    }
}

/// The control plane reports the data-plane host without a scheme.
fn normalize_host(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.trim_end_matches('/').to_string()
    } else {
        format!("https://{host}")
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, entries: &[VectorEntry]) -> Result<usize, RagError> {
        if entries.is_empty() {
            return Ok(0);
        }

        let request = UpsertRequest {
            vectors: entries
                .iter()
                .map(|e| WireVector {
                    id: e.id.clone(),
                    values: e.embedding.clone(),
                    metadata: WireMetadata {
                        text: e.chunk_text.clone(),
                        source: e.source.clone(),
                        page: e.page.map(|p| p as f64),
                    },
                })
                .collect(),
        };

        let url = format!("{}/vectors/upsert", self.host);
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Index(format!("upsert request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::Index(format!("upsert failed ({status}): {body}")));
        }

        let parsed: UpsertResponse = response
            .json()
            .await
            .map_err(|e| RagError::Index(format!("failed to parse upsert response: {e}")))?;

        // A short count would be a silent partial write; surface it.
        if parsed.upserted_count != entries.len() {
            return Err(RagError::Index(format!(
                "upsert wrote {} of {} records",
                parsed.upserted_count,
                entries.len()
            )));
        }

        Ok(parsed.upserted_count)
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredRecord>, RagError> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
        };

        let url = format!("{}/query", self.host);
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Index(format!("query request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::Index(format!("query failed ({status}): {body}")));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| RagError::Index(format!("failed to parse query response: {e}")))?;

        let mut records: Vec<ScoredRecord> = parsed
            .matches
            .into_iter()
            .map(|m| {
                let metadata = m.metadata.unwrap_or(WireMetadata {
                    text: String::new(),
                    source: String::new(),
                    page: None,
                });
                ScoredRecord {
                    id: m.id,
                    score: m.score,
                    chunk_text: metadata.text,
                    source: metadata.source,
                    page: metadata.page.map(|p| p as usize),
                }
            })
            .collect();

        // Pinecone returns ranked matches; a stable sort keeps insertion
        // order for ties and guards against out-of-order responses.
        records.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        records.truncate(top_k);

        Ok(records)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.index_name
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DIM: usize = 768;

    async fn mock_index(server: &MockServer) -> PineconeIndex {
        Mock::given(method("GET"))
            .and(path("/indexes/jarvis"))
            .and(header("Api-Key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "jarvis",
                "host": server.uri(),
                "dimension": DIM,
            })))
            .mount(server)
            .await;

        PineconeIndex::connect_to(&server.uri(), "test-key", "jarvis", DIM)
            .await
            .unwrap()
    }

    fn entry(id: &str, text: &str) -> VectorEntry {
        VectorEntry {
            id: id.into(),
            embedding: vec![0.1; DIM],
            chunk_text: text.into(),
            source: "facts.txt".into(),
            page: None,
        }
    }

    #[tokio::test]
    async fn connect_validates_dimension() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/jarvis"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "jarvis",
                "host": server.uri(),
                "dimension": 1536,
            })))
            .mount(&server)
            .await;

        let err = PineconeIndex::connect_to(&server.uri(), "test-key", "jarvis", DIM)
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
        assert!(err.to_string().contains("1536"));
    }

    #[tokio::test]
    async fn connect_missing_index_is_config_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = PineconeIndex::connect_to(&server.uri(), "test-key", "missing", DIM)
            .await
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("missing"));
    }

    #[tokio::test]
    async fn upsert_reports_count() {
        let server = MockServer::start().await;
        let index = mock_index(&server).await;

        Mock::given(method("POST"))
            .and(path("/vectors/upsert"))
            .and(header("Api-Key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "upsertedCount": 2
            })))
            .mount(&server)
            .await;

        let count = index
            .upsert(&[entry("a", "one"), entry("b", "two")])
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn upsert_detects_partial_write() {
        let server = MockServer::start().await;
        let index = mock_index(&server).await;

        Mock::given(method("POST"))
            .and(path("/vectors/upsert"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "upsertedCount": 1
            })))
            .mount(&server)
            .await;

        let err = index
            .upsert(&[entry("a", "one"), entry("b", "two")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("1 of 2"));
    }

    #[tokio::test]
    async fn upsert_empty_batch_makes_no_call() {
        let server = MockServer::start().await;
        let index = mock_index(&server).await;
        assert_eq!(index.upsert(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn query_orders_and_bounds_results() {
        let server = MockServer::start().await;
        let index = mock_index(&server).await;

        Mock::given(method("POST"))
            .and(path("/query"))
            .and(body_partial_json(serde_json::json!({"topK": 2, "includeMetadata": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "matches": [
                    {"id": "low", "score": 0.42,
                     "metadata": {"text": "grass is green", "source": "facts.txt"}},
                    {"id": "high", "score": 0.97,
                     "metadata": {"text": "sky is blue", "source": "facts.txt", "page": 1.0}},
                ]
            })))
            .mount(&server)
            .await;

        let records = index.query(&vec![0.1; DIM], 2).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "high");
        assert_eq!(records[0].chunk_text, "sky is blue");
        assert_eq!(records[0].page, Some(1));
        assert!(records[0].score >= records[1].score);
    }

    #[tokio::test]
    async fn query_empty_index_returns_no_records() {
        let server = MockServer::start().await;
        let index = mock_index(&server).await;

        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "matches": []
            })))
            .mount(&server)
            .await;

        let records = index.query(&vec![0.1; DIM], 2).await.unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn normalize_host_adds_scheme() {
        assert_eq!(
            normalize_host("jarvis-abc.svc.us-east-1.pinecone.io"),
            "https://jarvis-abc.svc.us-east-1.pinecone.io"
        );
        assert_eq!(normalize_host("http://localhost:9000/"), "http://localhost:9000");
    }
}
