//! Gemini analysis client.
//!
//! One generateContent call per analysis: the image travels inline with the
//! request (Base64 blob plus MIME type), together with a fixed instruction
//! and a strict `responseSchema` so the model answers with exactly one JSON
//! report document. No streaming, no retry, no caching.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::image_input::SelectedImage;
use crate::report::{self, CarbonFootprintReport};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Fixed instruction sent with every analysis request.
const ANALYSIS_PROMPT: &str = "Look at this photo and identify the dish. Then list the \
    probable ingredients, estimate the weight of each in grams, and estimate each \
    ingredient's carbon footprint in kilograms of CO2 equivalent (kg CO2e) based on \
    public reference data. Finally, compute the total carbon footprint and provide a \
    short analysis summary. Return the result as JSON.";

/// The analysis seam the session drives.
///
/// [`GeminiClient`] is the production implementation; tests substitute their
/// own to exercise the session without network access.
#[async_trait]
pub trait ReportAnalyzer: Send + Sync {
    /// Analyzes one meal image and returns its footprint report.
    async fn analyze(&self, image: &SelectedImage) -> Result<CarbonFootprintReport>;
}

#[derive(Debug)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model_name: String,
}

impl GeminiClient {
    /// Creates a client from resolved configuration.
    ///
    /// The credential is taken here, once; there is no ambient lookup at call
    /// time. An empty key is a configuration error.
    pub fn new(config: &Config) -> Result<Self> {
        if config.gemini_api_key.trim().is_empty() {
            return Err(AppError::config("Gemini API key is empty"));
        }

        Ok(Self {
            http: Client::new(),
            api_key: config.gemini_api_key.clone(),
            model_name: config.model_name.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            BASE_URL, self.model_name, self.api_key
        )
    }

    fn build_request(&self, image: &SelectedImage) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::InlineData {
                        inline_data: Blob {
                            mime_type: image.mime_type.clone(),
                            data: image.to_base64(),
                        },
                    },
                    Part::Text {
                        text: ANALYSIS_PROMPT.to_string(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: report::response_schema(),
            },
        }
    }

    /// Pulls the textual payload out of a generate response.
    fn extract_text(response: GenerateResponse) -> Result<String> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::malformed("no candidates in response"))?;

        for part in candidate.content.parts {
            if let Part::Text { text } = part {
                return Ok(text);
            }
        }

        Err(AppError::malformed("no text part in response"))
    }
}

#[async_trait]
impl ReportAnalyzer for GeminiClient {
    async fn analyze(&self, image: &SelectedImage) -> Result<CarbonFootprintReport> {
        let request = self.build_request(image);

        tracing::debug!(model = %self.model_name, mime = %image.mime_type, "sending analysis request");

        let response = self
            .http
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    AppError::request(format!("connection failed: {}", e))
                } else {
                    AppError::request(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::request(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|r| r.error.message)
                .unwrap_or(body);
            return Err(AppError::request(format!("HTTP {}: {}", status, detail)));
        }

        let generate_response: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::malformed(format!("unexpected response envelope: {}", e)))?;

        let text = Self::extract_text(generate_response)?;
        let parsed = report::parse_report(&text);
        if let Err(e) = &parsed {
            tracing::warn!(error = %e, "model response did not match the report schema");
        }
        parsed
    }
}

// Gemini API wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
    Text {
        text: String,
    },
    /// Part kinds this client does not consume (thoughts, function calls).
    Other(Value),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
    #[serde(default)]
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[allow(dead_code)]
    code: Option<i32>,
    #[allow(dead_code)]
    status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient::new(&Config::with_values("test-key", "gemini-2.5-flash")).unwrap()
    }

    #[test]
    fn rejects_empty_api_key() {
        let err = GeminiClient::new(&Config::with_values("  ", "gemini-2.5-flash")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn request_carries_inline_image_and_schema() {
        let image = SelectedImage::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg");
        let request = client().build_request(&image);
        let json = serde_json::to_value(&request).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "/9j/");
        assert!(
            parts[1]["text"]
                .as_str()
                .unwrap()
                .contains("carbon footprint")
        );

        let config = &json["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(
            config["responseSchema"]["required"][0].as_str(),
            Some("dishName")
        );
    }

    #[test]
    fn extracts_text_from_first_candidate() {
        let body = r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "{\"hello\": true}"}]
                },
                "finishReason": "STOP"
            }]
        }"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            GeminiClient::extract_text(response).unwrap(),
            "{\"hello\": true}"
        );
    }

    #[test]
    fn empty_candidates_is_malformed() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        let err = GeminiClient::extract_text(response).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[test]
    fn parses_api_error_envelope() {
        let body = r#"{"error": {"message": "quota exceeded", "code": 429, "status": "RESOURCE_EXHAUSTED"}}"#;
        let parsed: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "quota exceeded");
    }
}
