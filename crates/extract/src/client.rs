use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::backend::{ExtractError, ExtractionBackend};
use crate::types::{ExtractedTransaction, RawExtractionPayload};

/// Instruction sent alongside the CSV text. The schema-constrained tool call
/// is the only allowed response path.
const EXTRACTION_INSTRUCTION: &str = "You are a bookkeeping assistant. Parse the \
bank-transaction CSV provided by the user and record every data row by calling the \
record_transactions function. Use ISO dates (YYYY-MM-DD). Amounts are signed: \
negative for money leaving the account, positive for money coming in. Do not \
invent rows and do not reply with free text.";

const TOOL_NAME: &str = "record_transactions";

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Full URL of an OpenAI-compatible chat-completions endpoint.
    pub api_url: String,
    /// Bearer credential. Checked at call time so a misconfigured deployment
    /// fails each request the same way instead of crashing at startup.
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
        }
    }
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    tools: Vec<Value>,
    tool_choice: Value,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Deserialize)]
struct FunctionCall {
    name: String,
    /// JSON-encoded arguments object, parsed as `RawExtractionPayload`.
    arguments: String,
}

fn transaction_tool_schema() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": TOOL_NAME,
            "description": "Record the transactions found in the CSV.",
            "parameters": {
                "type": "object",
                "properties": {
                    "transactions": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "date": { "type": "string", "description": "ISO date, YYYY-MM-DD" },
                                "description": { "type": "string" },
                                "amount": { "type": "number", "description": "Signed; negative = outflow" },
                                "category": { "type": "string" },
                                "vendor": { "type": "string" }
                            },
                            "required": ["date", "description"]
                        }
                    }
                },
                "required": ["transactions"]
            }
        }
    })
}

// ── HTTP backend ──────────────────────────────────────────────────────────────

/// Calls an OpenAI-compatible chat-completions API with a forced tool call.
/// One request per ingestion; retries are a caller concern.
pub struct HttpExtractor {
    config: ExtractorConfig,
    client: Client,
}

impl HttpExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(90))
            .build()
            .map_err(|e| ExtractError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ExtractionBackend for HttpExtractor {
    async fn extract(&self, csv_text: &str) -> Result<Vec<ExtractedTransaction>, ExtractError> {
        let Some(api_key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) else {
            return Err(ExtractError::Config("EXTRACTION_API_KEY is not set".to_string()));
        };

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: EXTRACTION_INSTRUCTION },
                ChatMessage { role: "user", content: csv_text },
            ],
            tools: vec![transaction_tool_schema()],
            tool_choice: json!({ "type": "function", "function": { "name": TOOL_NAME } }),
            temperature: 0.0,
        };

        tracing::debug!(
            model = %self.config.model,
            csv_len = csv_text.len(),
            "calling extraction service"
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("extraction request failed: {e}");
                ExtractError::Service { status: e.status().map(|s| s.as_u16()) }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                body = %body,
                "extraction service returned an error"
            );
            return Err(ExtractError::Service { status: Some(status.as_u16()) });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            ExtractError::Contract(format!("response body is not the expected JSON: {e}"))
        })?;

        let call = parsed
            .choices
            .first()
            .and_then(|c| c.message.tool_calls.first())
            .ok_or_else(|| ExtractError::Contract("response carries no tool call".to_string()))?;

        if call.function.name != TOOL_NAME {
            return Err(ExtractError::Contract(format!(
                "unexpected tool call '{}'",
                call.function.name
            )));
        }

        let payload: RawExtractionPayload = serde_json::from_str(&call.function.arguments)
            .map_err(|e| ExtractError::Contract(format!("tool-call arguments are malformed: {e}")))?;

        payload.validate()
    }
}
