use super::{AnalysisError, AnalysisResult, ContentAnalyzer};
use crate::config::AnalysisConfig;
use crate::extract::truncate_chars;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str =
    "You are an expert content categorization AI. Always respond with valid JSON only.";

/// OpenAI-compatible chat completions analyzer
#[derive(Clone)]
pub struct OpenAiAnalyzer {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_content_chars: usize,
}

#[derive(Debug, Deserialize)]
struct ChatResponseRaw {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiAnalyzer {
    /// Creates an analyzer with an explicit API key
    pub fn new(api_key: impl Into<String>, config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_content_chars: config.max_content_chars,
        })
    }

    /// Creates an analyzer reading the API key from `config.api_key_env`
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AnalysisError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(api_key, config)
    }

    fn build_prompt(&self, url: &str, body_text: &str, title: Option<&str>) -> String {
        let content = if body_text.is_empty() {
            "No content available".to_string()
        } else {
            truncate_chars(body_text, self.max_content_chars)
        };

        format!(
            r#"Classify the web page below into a single topic category and assess its quality.

Respond with a JSON object with exactly these fields:
{{
    "category": "one lowercase word, e.g. technology, business, finance, health, science, education, news, ecommerce, entertainment, sports, travel, general",
    "confidence": 0.0 to 1.0,
    "quality_score": 0.0 to 1.0,
    "key_topics": ["5 to 10 keywords"],
    "sentiment": "positive | neutral | negative",
    "summary": "one or two sentences"
}}

URL: {url}
Title: {title}
Content:
{content}"#,
            url = url,
            title = title.unwrap_or("No title available"),
            content = content,
        )
    }
}

/// Strips a ```json fence if the model wrapped its answer in one
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[async_trait]
impl ContentAnalyzer for OpenAiAnalyzer {
    async fn analyze(
        &self,
        url: &str,
        body_text: &str,
        title: Option<&str>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let start = std::time::Instant::now();

        let request = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": self.build_prompt(url, body_text, title) },
            ],
            "temperature": 0.2,
            "response_format": { "type": "json_object" },
        });

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Analyzer request failed");
                AnalysisError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let raw: ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| AnalysisError::Parse(e.to_string()))?;

        let content = raw
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AnalysisError::Parse("empty response".to_string()))?;

        let result: AnalysisResult = serde_json::from_str(strip_code_fence(&content))
            .map_err(|e| AnalysisError::Parse(e.to_string()))?;

        debug!(
            url = %url,
            model = %self.model,
            duration_ms = start.elapsed().as_millis() as u64,
            "Analyzer call completed"
        );

        Ok(result.normalized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config(endpoint: &str) -> AnalysisConfig {
        AnalysisConfig {
            enabled: true,
            endpoint: endpoint.to_string(),
            timeout_secs: 5,
            ..AnalysisConfig::default()
        }
    }

    fn chat_body(content: &str) -> serde_json::Value {
        json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
    }

    #[tokio::test]
    async fn test_analyze_parses_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(
                r#"{"category": "Science", "confidence": 0.92, "quality_score": 0.75,
                    "key_topics": ["physics"], "sentiment": "positive", "summary": "A study."}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let analyzer = OpenAiAnalyzer::new("test-key", &create_test_config(&server.uri())).unwrap();
        let result = analyzer
            .analyze("https://example.com/a", "Some physics text", Some("Physics"))
            .await
            .unwrap();

        assert_eq!(result.category, "science");
        assert_eq!(result.confidence, 0.92);
        assert_eq!(result.quality_score, 0.75);
        assert_eq!(result.key_topics, vec!["physics"]);
        assert_eq!(result.sentiment, "positive");
    }

    #[tokio::test]
    async fn test_analyze_accepts_fenced_json() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(
                "```json\n{\"category\": \"news\", \"confidence\": 0.6}\n```",
            )))
            .mount(&server)
            .await;

        let analyzer = OpenAiAnalyzer::new("k", &create_test_config(&server.uri())).unwrap();
        let result = analyzer.analyze("https://example.com", "", None).await.unwrap();
        assert_eq!(result.category, "news");
    }

    #[tokio::test]
    async fn test_analyze_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let analyzer = OpenAiAnalyzer::new("k", &create_test_config(&server.uri())).unwrap();
        let err = analyzer.analyze("https://example.com", "x", None).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Api { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_analyze_invalid_json() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("not json at all")))
            .mount(&server)
            .await;

        let analyzer = OpenAiAnalyzer::new("k", &create_test_config(&server.uri())).unwrap();
        let err = analyzer.analyze("https://example.com", "x", None).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Parse(_)));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = AnalysisConfig {
            api_key_env: "SUMI_SIEVE_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            OpenAiAnalyzer::from_config(&config),
            Err(AnalysisError::MissingApiKey(_))
        ));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {} "), "{}");
    }
}
