//! Gemini `generateContent` client: the real implementation of the
//! generation capability, plus a fallback backend for missing credentials.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::{GenerationBackend, GenerationReply, GenerationRequest, ImageData, ReplyPart};
use crate::error::GenerationError;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self, GenerationError> {
        let http = reqwest::blocking::Client::builder()
            .build()
            .map_err(|err| GenerationError::RemoteCall(err.to_string()))?;
        Ok(Self { http, api_key, model })
    }

    /// Build a client from the environment:
    /// - `GEMINI_API_KEY`: required credential
    /// - `GEMINI_MODEL`: optional model override
    pub fn from_env() -> Result<Self, GenerationError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GenerationError::RemoteCall("GEMINI_API_KEY is not set".into()))?;
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Self::new(api_key, model)
    }
}

impl GenerationBackend for GeminiClient {
    fn generate(&self, request: &GenerationRequest) -> Result<GenerationReply, GenerationError> {
        let url = format!("{API_BASE}/{}:generateContent", self.model);
        let body = GenerateContentBody {
            contents: vec![Content {
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: &request.mime_type,
                            data: STANDARD.encode(&request.image_bytes),
                        }),
                        text: None,
                    },
                    Part {
                        inline_data: None,
                        text: Some(&request.instruction),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE"],
            },
        };

        log::debug!("POST {url}");
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|err| GenerationError::RemoteCall(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(GenerationError::RemoteCall(format!(
                "HTTP {status}: {}",
                detail.trim()
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|err| GenerationError::RemoteCall(format!("unreadable response: {err}")))?;

        let mut reply = GenerationReply::default();
        // Like the wire format: only the first candidate is considered.
        if let Some(content) = parsed.candidates.into_iter().next().and_then(|c| c.content) {
            for part in content.parts {
                let image = match part.inline_data {
                    Some(inline) => Some(ImageData {
                        bytes: STANDARD.decode(&inline.data).map_err(|err| {
                            GenerationError::RemoteCall(format!(
                                "response carried invalid base64 image data: {err}"
                            ))
                        })?,
                        mime_type: inline.mime_type,
                    }),
                    None => None,
                };
                reply.parts.push(ReplyPart { text: part.text, image });
            }
        }
        Ok(reply)
    }
}

/// Stands in for the remote capability when credentials are missing, so the
/// app still runs: drawing works, generation reports the misconfiguration.
pub struct UnconfiguredBackend {
    reason: String,
}

impl UnconfiguredBackend {
    pub fn new(reason: String) -> Self {
        Self { reason }
    }
}

impl GenerationBackend for UnconfiguredBackend {
    fn generate(&self, _request: &GenerationRequest) -> Result<GenerationReply, GenerationError> {
        Err(GenerationError::RemoteCall(self.reason.clone()))
    }
}

// Wire types for the generateContent endpoint.

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Part<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    inline_data: Option<ResponseInlineData>,
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseInlineData {
    mime_type: String,
    data: String,
}
