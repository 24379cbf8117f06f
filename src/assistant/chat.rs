//! Agent backed by an OpenAI-compatible chat completions endpoint.
//!
//! The model receives the parking tool declarations; tool calls it makes are
//! executed locally and fed back until it returns plain content or the round
//! budget runs out.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::assistant::{ParkingAgent, ParkingTools};
use crate::config::AgentConfig;
use crate::core::AgentError;

const SYSTEM_PROMPT: &str = "You are a parking system analyst. You MUST use the provided tools \
to get real data and NEVER make up numbers. Answer briefly using only the tool results.";

/// One tool call requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestedCall {
    /// Call identifier echoed back with the result.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Raw arguments (usually a JSON-encoded string).
    pub arguments: Value,
}

/// What the model answered in one round.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Final answer.
    Content(String),
    /// Tools to run before asking again; `message` is the assistant turn to
    /// append to the conversation.
    ToolCalls {
        /// Assistant message as returned.
        message: Value,
        /// Requested calls.
        calls: Vec<RequestedCall>,
    },
}

/// Extract the first choice of a chat completions response.
pub fn parse_reply(body: &Value) -> Result<Reply, AgentError> {
    let message = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| AgentError::Malformed("response has no choices".into()))?;

    if let Some(calls) = message.get("tool_calls").and_then(Value::as_array) {
        if !calls.is_empty() {
            let calls = calls
                .iter()
                .map(|call| {
                    let function = call
                        .get("function")
                        .ok_or_else(|| AgentError::Malformed("tool call without function".into()))?;
                    Ok(RequestedCall {
                        id: call.get("id").and_then(Value::as_str).unwrap_or_default().to_string(),
                        name: function
                            .get("name")
                            .and_then(Value::as_str)
                            .ok_or_else(|| AgentError::Malformed("tool call without name".into()))?
                            .to_string(),
                        arguments: function.get("arguments").cloned().unwrap_or(Value::Null),
                    })
                })
                .collect::<Result<Vec<_>, AgentError>>()?;
            return Ok(Reply::ToolCalls {
                message: message.clone(),
                calls,
            });
        }
    }

    match message.get("content").and_then(Value::as_str).map(str::trim) {
        Some(text) if !text.is_empty() => Ok(Reply::Content(text.to_string())),
        _ => Err(AgentError::Malformed("empty completion".into())),
    }
}

/// Tool-calling agent over HTTP.
pub struct ChatCompletionsAgent {
    client: Client,
    config: AgentConfig,
}

impl ChatCompletionsAgent {
    /// Agent talking to the endpoint described by `config`.
    pub fn new(config: AgentConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'))
    }

    async fn complete(&self, messages: &[Value]) -> Result<Value, AgentError> {
        let body = json!({
            "model": self.config.model,
            "messages": messages,
            "tools": ParkingTools::definitions(),
            "temperature": 0.1,
        });
        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .await
            .map_err(|e| AgentError::Provider(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AgentError::Provider(format!("{status}: {detail}")));
        }
        response
            .json()
            .await
            .map_err(|e| AgentError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl ParkingAgent for ChatCompletionsAgent {
    fn name(&self) -> &'static str {
        "chat_completions"
    }

    async fn ask(&self, question: &str, tools: &ParkingTools) -> Result<String, AgentError> {
        let mut messages = vec![
            json!({ "role": "system", "content": SYSTEM_PROMPT }),
            json!({ "role": "user", "content": question }),
        ];
        for round in 0..=self.config.max_tool_rounds {
            let body = self.complete(&messages).await?;
            match parse_reply(&body)? {
                Reply::Content(text) => return Ok(text),
                Reply::ToolCalls { message, calls } => {
                    if round == self.config.max_tool_rounds {
                        break;
                    }
                    messages.push(message);
                    for call in calls {
                        tracing::debug!(tool = %call.name, round, "model requested tool");
                        let result = tools.invoke_named(&call.name, &call.arguments);
                        messages.push(json!({
                            "role": "tool",
                            "tool_call_id": call.id,
                            "content": result.to_string(),
                        }));
                    }
                }
            }
        }
        Err(AgentError::Malformed(format!(
            "no answer after {} tool rounds",
            self.config.max_tool_rounds
        )))
    }
}
