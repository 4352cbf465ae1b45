//! Brand/category name validation through an OpenAI-compatible chat API.
//!
//! The model classifies what the user typed and may suggest a corrected
//! spelling. Validation is advisory: when the API is unreachable, returns an
//! error, or answers with something that is not the expected JSON, the input
//! is accepted as entered.

use std::time::Duration;

use aivis_core::AppConfig;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::backend::parse_base_url;
use crate::error::ClientError;

const SYSTEM_PROMPT: &str = "You check names typed into an AI visibility tracker. \
Decide whether the input is a brand (a company or product name), a category (a kind of \
product or service, such as \"running shoes\"), or a local business (a business tied to \
a place). Fix obvious misspellings of well-known names. Reply with JSON only, no prose: \
{\"valid\": boolean, \"type\": \"brand\" | \"category\" | \"local\" | null, \
\"correctedName\": string, \"suggestions\": string[]}. Set valid to false only for \
gibberish or empty input, and then offer up to three suggestions.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Brand,
    Category,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandValidation {
    pub valid: bool,
    #[serde(rename = "type")]
    pub kind: Option<EntityKind>,
    pub corrected_name: String,
    pub suggestions: Vec<String>,
}

impl BrandValidation {
    /// The input, unchanged and unclassified.
    #[must_use]
    pub fn accept_as_entered(input: &str) -> Self {
        Self {
            valid: true,
            kind: None,
            corrected_name: input.trim().to_owned(),
            suggestions: Vec::new(),
        }
    }
}

/// The model's answer before defaults are filled in. Unknown `type` values
/// are treated as unclassified.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawValidation {
    valid: bool,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    corrected_name: Option<String>,
    #[serde(default)]
    suggestions: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: ResponseFormat,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

pub struct BrandValidator {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    model: String,
}

impl BrandValidator {
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if `OPENAI_BASE_URL` is not an
    /// http(s) URL, or [`ClientError::Http`] if the HTTP client cannot be
    /// built.
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        Self::with_base_url(
            &config.openai_base_url,
            config.openai_api_key.clone(),
            &config.openai_model,
            config.request_timeout_secs,
        )
    }

    /// # Errors
    ///
    /// Same as [`BrandValidator::new`].
    pub fn with_base_url(
        base_url: &str,
        api_key: Option<String>,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.to_owned(),
        })
    }

    /// Classifies `input`. Never fails; see the module docs.
    pub async fn validate(&self, input: &str) -> BrandValidation {
        let input = input.trim();
        if input.is_empty() {
            return BrandValidation {
                valid: false,
                ..BrandValidation::accept_as_entered(input)
            };
        }
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("OPENAI_API_KEY not set, accepting name as entered");
            return BrandValidation::accept_as_entered(input);
        };

        match self.ask(api_key, input).await {
            Ok(content) => parse_validation(input, &content).unwrap_or_else(|| {
                tracing::warn!(input, "unparseable validation reply, accepting name as entered");
                BrandValidation::accept_as_entered(input)
            }),
            Err(err) => {
                tracing::warn!(input, error = %err, "validation request failed, accepting name as entered");
                BrandValidation::accept_as_entered(input)
            }
        }
    }

    async fn ask(&self, api_key: &str, input: &str) -> Result<String, ClientError> {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["chat", "completions"]);
        }

        let request = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            response_format: ResponseFormat {
                kind: "json_object",
            },
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: input,
                },
            ],
        };

        let response = self
            .client
            .post(url.clone())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
                context: "chat completion".to_owned(),
                source: e,
            })?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

/// Parses the model's JSON reply, tolerating a surrounding Markdown code
/// fence. Returns `None` when the reply is not the expected object.
#[must_use]
pub fn parse_validation(input: &str, reply: &str) -> Option<BrandValidation> {
    let raw: RawValidation = serde_json::from_str(strip_code_fence(reply)).ok()?;
    let kind = raw.kind.as_deref().and_then(|k| match k.to_ascii_lowercase().as_str() {
        "brand" => Some(EntityKind::Brand),
        "category" => Some(EntityKind::Category),
        "local" => Some(EntityKind::Local),
        _ => None,
    });
    let corrected_name = raw
        .corrected_name
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| input.trim().to_owned());

    Some(BrandValidation {
        valid: raw.valid,
        kind,
        corrected_name,
        suggestions: raw
            .suggestions
            .into_iter()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect(),
    })
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence.
    let rest = rest.split_once('\n').map_or(rest, |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let v = parse_validation(
            "nikee",
            r#"{"valid": true, "type": "brand", "correctedName": "Nike", "suggestions": []}"#,
        )
        .unwrap();
        assert!(v.valid);
        assert_eq!(v.kind, Some(EntityKind::Brand));
        assert_eq!(v.corrected_name, "Nike");
    }

    #[test]
    fn tolerates_code_fences() {
        let reply = "```json\n{\"valid\": true, \"type\": \"category\", \"correctedName\": \"running shoes\", \"suggestions\": []}\n```";
        let v = parse_validation("running shoes", reply).unwrap();
        assert_eq!(v.kind, Some(EntityKind::Category));

        let bare_fence = "```\n{\"valid\": false, \"type\": null, \"suggestions\": [\"Nike\"]}\n```";
        let v = parse_validation("xqzv", bare_fence).unwrap();
        assert!(!v.valid);
        assert_eq!(v.kind, None);
        assert_eq!(v.corrected_name, "xqzv");
        assert_eq!(v.suggestions, vec!["Nike"]);
    }

    #[test]
    fn unknown_type_is_unclassified() {
        let v = parse_validation("x", r#"{"valid": true, "type": "person"}"#).unwrap();
        assert_eq!(v.kind, None);
    }

    #[test]
    fn prose_is_rejected() {
        assert!(parse_validation("Nike", "Sure! Nike is a brand.").is_none());
    }

    #[test]
    fn serializes_with_wire_names() {
        let json = serde_json::to_value(BrandValidation::accept_as_entered(" Nike ")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "valid": true,
                "type": null,
                "correctedName": "Nike",
                "suggestions": []
            })
        );
    }
}
