use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

/// One retrieved book chunk with its similarity score.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub text: String,
    pub score: f32,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Clone)]
pub struct QdrantStore {
    client: Client,
    base_url: String,
    api_key: String,
    collection: String,
}

impl QdrantStore {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            collection: collection.into(),
        }
    }

    pub async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<SearchHit>> {
        if vector.is_empty() {
            return Ok(vec![]);
        }

        let url = format!(
            "{}/collections/{}/points/search",
            self.base_url, self.collection
        );

        let body = json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
        });

        let response = self
            .client
            .post(url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to contact qdrant during search")?
            .error_for_status()
            .context("qdrant search returned non-success status")?
            .json::<QdrantSearchResponse>()
            .await
            .context("failed to decode qdrant search response")?;

        Ok(hits_from_response(response))
    }
}

fn hits_from_response(response: QdrantSearchResponse) -> Vec<SearchHit> {
    response
        .result
        .into_iter()
        .filter_map(|point| {
            let payload = point.payload?;
            let text = payload.text?;
            if text.trim().is_empty() {
                return None;
            }
            Some(SearchHit {
                text,
                score: point.score,
                metadata: payload.metadata,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct QdrantSearchResponse {
    result: Vec<QdrantResultPoint>,
}

#[derive(Debug, Deserialize)]
struct QdrantResultPoint {
    score: f32,
    payload: Option<QdrantPayload>,
}

#[derive(Debug, Deserialize)]
struct QdrantPayload {
    text: Option<String>,
    metadata: Option<serde_json::Value>,
}
