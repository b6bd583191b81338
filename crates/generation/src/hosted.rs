use crate::config::GeneratorConfig;
use crate::error::{GenerationError, ModelInitError, Result};
use crate::TextGenerator;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

/// Text2text model behind a Hugging Face style inference endpoint.
///
/// Request: `POST {endpoint}/models/{model}` with
/// `{"inputs": .., "parameters": {"max_length": .., "num_return_sequences": 1}}`.
/// Response: `[{"generated_text": ..}, ..]`; the first candidate wins.
pub struct HostedGenerator {
    client: Client,
    url: Url,
    model: String,
    api_token: Option<String>,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    max_length: usize,
    num_return_sequences: usize,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Deserialize)]
struct RemoteError {
    error: String,
}

impl HostedGenerator {
    pub fn new(config: &GeneratorConfig) -> std::result::Result<Self, ModelInitError> {
        let model = config.model.trim();
        if model.is_empty() {
            return Err(ModelInitError::EmptyModel);
        }

        let url = model_url(&config.endpoint, model)?;
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            url,
            model: model.to_string(),
            api_token: config.api_token.clone(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

fn model_url(endpoint: &str, model: &str) -> std::result::Result<Url, ModelInitError> {
    let invalid = |reason: String| ModelInitError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let base = Url::parse(endpoint.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", base.scheme())));
    }

    let joined = format!("{}/models/{}", base.as_str().trim_end_matches('/'), model);
    Url::parse(&joined).map_err(|err| invalid(err.to_string()))
}

#[async_trait]
impl TextGenerator for HostedGenerator {
    async fn generate(&self, prompt: &str, max_length: usize) -> Result<String> {
        let body = InferenceRequest {
            inputs: prompt,
            parameters: InferenceParameters {
                max_length,
                num_return_sequences: 1,
            },
        };

        let mut request = self.client.post(self.url.clone()).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        log::debug!("Calling inference endpoint {}", self.url);
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<RemoteError>(&bytes)
                .map(|e| e.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).trim().to_string());
            log::warn!("Inference endpoint returned {status}: {message}");
            return Err(GenerationError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let candidates: Vec<GeneratedText> = serde_json::from_slice(&bytes)?;
        candidates
            .into_iter()
            .next()
            .map(|c| c.generated_text)
            .ok_or(GenerationError::EmptyOutput)
    }

    fn describe(&self) -> String {
        format!("hosted:{}", self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_endpoint_and_model() {
        let url = model_url("https://api-inference.huggingface.co/", "google/flan-t5-base").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api-inference.huggingface.co/models/google/flan-t5-base"
        );
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let err = model_url("ftp://example.com", "m").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
        assert!(model_url("not a url", "m").is_err());
    }

    #[test]
    fn generator_targets_trimmed_model_under_endpoint() {
        let config = GeneratorConfig::default()
            .with_endpoint("http://127.0.0.1:8080")
            .with_model(" org/tiny-t5 ");
        let generator = HostedGenerator::new(&config).unwrap();
        assert_eq!(
            generator.url().as_str(),
            "http://127.0.0.1:8080/models/org/tiny-t5"
        );
        assert_eq!(generator.describe(), "hosted:org/tiny-t5");
    }

    #[test]
    fn empty_model_is_an_init_error() {
        let config = GeneratorConfig::default().with_model("  ");
        assert!(matches!(
            HostedGenerator::new(&config),
            Err(ModelInitError::EmptyModel)
        ));
    }
}
