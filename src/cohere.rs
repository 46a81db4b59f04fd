use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct CohereClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CohereClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Embeds a single search query, returning its vector.
    pub async fn embed_query(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let input = text.trim();
        if input.is_empty() {
            anyhow::bail!("cannot embed an empty question");
        }

        let mut embeddings = self
            .embed(model, &[input.to_string()], "search_query")
            .await?;
        embeddings
            .pop()
            .ok_or_else(|| anyhow::anyhow!("cohere embed returned empty embeddings array"))
    }

    pub async fn embed(
        &self,
        model: &str,
        texts: &[String],
        input_type: &str,
    ) -> Result<Vec<Vec<f32>>> {
        #[derive(Serialize)]
        struct EmbedReq<'a> {
            texts: &'a [String],
            model: &'a str,
            input_type: &'a str,
        }

        #[derive(Deserialize)]
        struct EmbedResp {
            embeddings: Vec<Vec<f32>>,
        }

        let url = format!("{}/v1/embed", self.base_url);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&EmbedReq {
                texts,
                model,
                input_type,
            })
            .send()
            .await
            .context("failed to call cohere embed endpoint")?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "cohere /v1/embed returned {status}: {}",
                normalize_err_body(&body)
            );
        }

        let response = response
            .json::<EmbedResp>()
            .await
            .context("failed to decode cohere embed response")?;

        Ok(response.embeddings)
    }

    pub async fn chat(
        &self,
        model: &str,
        message: &str,
        max_tokens: usize,
        temperature: f32,
    ) -> Result<String> {
        #[derive(Serialize)]
        struct ChatReq<'a> {
            message: &'a str,
            model: &'a str,
            max_tokens: usize,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct ChatResp {
            text: String,
        }

        let url = format!("{}/v1/chat", self.base_url);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&ChatReq {
                message,
                model,
                max_tokens,
                temperature,
            })
            .send()
            .await
            .context("failed to call cohere chat endpoint")?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "cohere /v1/chat returned {status}: {}",
                normalize_err_body(&body)
            );
        }

        let response = response
            .json::<ChatResp>()
            .await
            .context("failed to decode cohere chat response")?;

        Ok(response.text.trim().to_string())
    }
}

fn normalize_err_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(message) = json.get("message").and_then(|v| v.as_str()) {
            return message.to_string();
        }
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_prefers_api_message() {
        let body = r#"{"message": "invalid api token"}"#;
        assert_eq!(normalize_err_body(body), "invalid api token");
    }

    #[test]
    fn error_body_falls_back_to_raw_text() {
        assert_eq!(normalize_err_body("  upstream down  "), "upstream down");
        assert_eq!(normalize_err_body("   "), "<empty body>");
    }
}
