//! OpenAI-compatible HTTP embedding provider.

use super::provider::{EmbeddingProvider, ProviderResult};
use crate::config::EmbeddingConfig;
use crate::error::{MdbedError, ProviderError, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

/// Blocking client for `POST {endpoint}` with `{model, input}` bodies.
pub struct HttpEmbeddingProvider {
    client: Client,
    endpoint: String,
    model: String,
    dimension: usize,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpEmbeddingProvider {
    /// Create a provider from the embedding configuration.
    ///
    /// The API key is read from the environment variable named by
    /// `api_key_env`, if set.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| MdbedError::config("embedding.endpoint is required for the http provider"))?;
        let api_key = match &config.api_key_env {
            Some(var) => Some(std::env::var(var).map_err(|_| {
                MdbedError::config(format!("environment variable {var} is not set"))
            })?),
            None => None,
        };
        let timeout = Duration::from_secs(config.timeout_secs);

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| MdbedError::config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
            dimension: config.dimension,
            api_key,
            timeout,
        })
    }

    fn request_error(&self, err: &reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Failed(err.to_string())
        }
    }
}

impl EmbeddingProvider for HttpEmbeddingProvider {
    fn embed(&self, text: &str) -> ProviderResult<Vec<f32>> {
        let mut batch = self.embed_batch(&[text])?;
        batch.pop().ok_or(ProviderError::CountMismatch {
            expected: 1,
            actual: 0,
        })
    }

    fn embed_batch(&self, texts: &[&str]) -> ProviderResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().map_err(|e| self.request_error(&e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::Failed(format!(
                "endpoint returned status {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            )));
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .map_err(|e| ProviderError::Failed(format!("invalid response body: {e}")))?;
        if parsed.data.len() != texts.len() {
            return Err(ProviderError::CountMismatch {
                expected: texts.len(),
                actual: parsed.data.len(),
            });
        }
        parsed.data.sort_by_key(|d| d.index.unwrap_or(usize::MAX));

        tracing::debug!(count = texts.len(), model = %self.model, "fetched remote embeddings");
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::ProviderKind;

    #[test]
    fn test_endpoint_required() {
        let config = EmbeddingConfig {
            provider: ProviderKind::Http,
            endpoint: None,
            ..Default::default()
        };
        assert!(matches!(
            HttpEmbeddingProvider::from_config(&config),
            Err(MdbedError::Configuration(_))
        ));
    }

    #[test]
    fn test_missing_api_key_env() {
        let config = EmbeddingConfig {
            provider: ProviderKind::Http,
            endpoint: Some("http://127.0.0.1:9/v1/embeddings".into()),
            api_key_env: Some("MDBED_TEST_KEY_THAT_IS_NEVER_SET".into()),
            ..Default::default()
        };
        let err = HttpEmbeddingProvider::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("MDBED_TEST_KEY_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn test_response_parsing_orders_by_index() {
        let json = r#"{"data":[{"index":1,"embedding":[0.0,1.0]},{"index":0,"embedding":[1.0,0.0]}]}"#;
        let mut parsed: EmbeddingResponse = serde_json::from_str(json).unwrap();
        parsed.data.sort_by_key(|d| d.index.unwrap_or(usize::MAX));
        assert_eq!(parsed.data[0].embedding, vec![1.0, 0.0]);
    }
}
