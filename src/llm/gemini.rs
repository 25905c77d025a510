use async_trait::async_trait;
use log::info;
use serde::{ Deserialize, Serialize };
use std::error::Error as StdError;
use url::form_urlencoded;

use super::{ GenerativeClient, GenerativeConfig };

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

fn first_candidate_text(response: GenerateResponse) -> Option<String> {
    response.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
}

/// One-shot client for the `generateContent` endpoint. The credential is
/// passed as a query parameter, per the service's API contract.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &GenerativeConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let api_key = config.api_key
            .clone()
            .ok_or_else(|| "API key is required for GeminiClient".to_string())?;
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        })
    }

    fn endpoint(&self) -> String {
        let key: String = form_urlencoded::byte_serialize(self.api_key.as_bytes()).collect();
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            key
        )
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, Box<dyn StdError + Send + Sync>> {
        let payload = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt.to_string() }],
            }],
        };

        info!("GeminiClient::generate() → model={}", self.model);
        let response = self.http
            .post(self.endpoint())
            .json(&payload)
            .send().await?
            .error_for_status()?;

        let body: GenerateResponse = response.json().await?;
        first_candidate_text(body).ok_or_else(|| {
            Box::<dyn StdError + Send + Sync>::from("Generative response contained no candidates")
        })
    }
}
