//! Remote embedding endpoint (Hugging Face inference or OpenAI-compatible).
//!
//! Retries on 429 and 5xx with exponential backoff. Concurrent requests are
//! capped by a semaphore sized from `EMBEDDING_MAX_CONCURRENCY`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::embedding::{
    ensure_text, validate_output, ApiProviderKind, EmbeddingError, EmbeddingProvider,
};
use crate::matching::codec::{EmbeddingVector, StoredEmbedding};

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum EmbeddingRequest<'a> {
    HuggingFace { inputs: &'a str },
    OpenAi { input: &'a str, model: &'a str },
}

#[derive(Clone)]
pub struct HttpEmbeddingProvider {
    client: Client,
    url: String,
    api_key: Option<String>,
    kind: ApiProviderKind,
    model: String,
    dimension: usize,
    permits: Arc<Semaphore>,
}

impl HttpEmbeddingProvider {
    pub fn new(
        url: String,
        api_key: Option<String>,
        kind: ApiProviderKind,
        model: String,
        dimension: usize,
        max_concurrency: usize,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url,
            api_key,
            kind,
            model,
            dimension,
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
        })
    }

    fn request_body<'a>(&'a self, text: &'a str) -> EmbeddingRequest<'a> {
        match self.kind {
            ApiProviderKind::HuggingFace => EmbeddingRequest::HuggingFace { inputs: text },
            ApiProviderKind::OpenAi => EmbeddingRequest::OpenAi {
                input: text,
                model: &self.model,
            },
        }
    }

    async fn call(&self, text: &str) -> Result<Value, EmbeddingError> {
        let body = self.request_body(text);
        let mut last_error: Option<EmbeddingError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Embedding call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let mut request = self.client.post(&self.url).json(&body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbeddingError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Embedding API returned {}: {}", status, body);
                last_error = Some(EmbeddingError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(EmbeddingError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            return Ok(response.json::<Value>().await?);
        }

        Err(last_error.unwrap_or(EmbeddingError::Api {
            status: 0,
            message: format!("no response after {MAX_RETRIES} attempts"),
        }))
    }
}

/// Pulls the vector out of a provider response body.
///
/// Hugging Face feature-extraction returns either a flat list or a batch of one;
/// a batch of several is passed through so the codec rejects its shape.
fn parse_response(kind: ApiProviderKind, body: Value) -> Result<StoredEmbedding, EmbeddingError> {
    match kind {
        ApiProviderKind::HuggingFace => match body {
            Value::Array(mut items) => {
                if items.len() == 1 && items[0].is_array() {
                    let inner = items.remove(0);
                    Ok(StoredEmbedding::from_value(inner)
                        .ok_or_else(|| EmbeddingError::Parse("null embedding".to_string()))?)
                } else {
                    Ok(StoredEmbedding::Sequence(items))
                }
            }
            Value::Object(map) if map.contains_key("error") => Err(EmbeddingError::Parse(
                map["error"].to_string(),
            )),
            other => Err(EmbeddingError::Parse(format!(
                "expected a list of floats, got {other}"
            ))),
        },
        ApiProviderKind::OpenAi => {
            let embedding = body
                .get("data")
                .and_then(|d| d.get(0))
                .and_then(|first| first.get("embedding"))
                .cloned()
                .ok_or_else(|| {
                    EmbeddingError::Parse("missing data[0].embedding in response".to_string())
                })?;
            StoredEmbedding::from_value(embedding)
                .ok_or_else(|| EmbeddingError::Parse("null embedding".to_string()))
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        ensure_text(text)?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| EmbeddingError::WorkerPool(e.to_string()))?;

        let body = self.call(text).await?;
        let vector = validate_output(parse_response(self.kind, body)?, self.dimension)?;

        debug!(
            provider = self.name(),
            dimension = vector.dimension(),
            "Generated embedding"
        );
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        match self.kind {
            ApiProviderKind::HuggingFace => "huggingface",
            ApiProviderKind::OpenAi => "openai",
        }
    }
}
