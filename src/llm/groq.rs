//! Groq (OpenAI-compatible) chat-completions client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ChatMessage, CompletionRequest, LlmClient, LlmError};
use crate::credential::Credential;

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct GroqClient {
    client: reqwest::Client,
    base_url: String,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "no_stop_sequences")]
    stop: &'a [&'a str],
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn no_stop_sequences(stop: &&[&str]) -> bool {
    stop.is_empty()
}

impl GroqClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            temperature,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmClient for GroqClient {
    async fn complete(
        &self,
        api_key: &Credential,
        request: CompletionRequest<'_>,
    ) -> Result<String, LlmError> {
        let body = ChatCompletionBody {
            model: request.model,
            messages: request.messages,
            temperature: self.temperature,
            stop: request.stop,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // Prefer the provider's error message when it sends one
            let message = serde_json::from_str::<ApiErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            tracing::warn!("Model API error {}: {}", status, message);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn key() -> Credential {
        Credential::from_input("gsk_test").unwrap()
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer gsk_test")
            .match_body(Matcher::PartialJson(json!({
                "model": "llama3-8b-8192",
                "messages": [{"role": "user", "content": "Question?"}],
                "stop": ["\nObservation:"],
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [{"message": {"role": "assistant", "content": "Final Answer: Paris"}}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = GroqClient::new(reqwest::Client::new(), server.url(), 0.7);
        let messages = vec![ChatMessage::user("Question?")];
        let text = client
            .complete(
                &key(),
                CompletionRequest {
                    model: "llama3-8b-8192",
                    messages: &messages,
                    stop: &["\nObservation:"],
                },
            )
            .await
            .unwrap();

        assert_eq!(text, "Final Answer: Paris");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_message_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(json!({"error": {"message": "Invalid API Key"}}).to_string())
            .create_async()
            .await;

        let client = GroqClient::new(reqwest::Client::new(), format!("{}/", server.url()), 0.7);
        let err = client
            .complete(
                &key(),
                CompletionRequest {
                    model: "m",
                    messages: &[],
                    stop: &[],
                },
            )
            .await
            .unwrap_err();

        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API Key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_content_is_an_empty_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(json!({"choices": []}).to_string())
            .create_async()
            .await;

        let client = GroqClient::new(reqwest::Client::new(), server.url(), 0.7);
        let err = client
            .complete(
                &key(),
                CompletionRequest {
                    model: "m",
                    messages: &[],
                    stop: &[],
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::EmptyResponse));
    }
}
