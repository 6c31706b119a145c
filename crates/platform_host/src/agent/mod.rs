//! Conversational agent contracts.
//!
//! The agent answers free text. A reply that is a JSON object of the form
//! `{"tool_call": {"name": ..., "arguments": {...}}}` asks the caller to run a stored tool and
//! post the result back with [`AgentService::send_tool_result`].

mod mock;

use std::{future::Future, pin::Pin};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use mock::MockAgent;

/// Author of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSender {
    /// Typed by the user.
    User,
    /// Produced by the agent.
    Ai,
    /// Status emitted by the host application.
    System,
    /// Output of a tool run.
    ToolResult,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message id.
    pub id: String,
    /// Message body.
    pub text: String,
    /// Author.
    pub sender: MessageSender,
    /// Creation time in unix milliseconds.
    pub timestamp_ms: u64,
    /// Tool the message is about, for tool status and results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

/// Tool summary offered to the agent with each request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolManifestItem {
    /// Tool name the agent must use in a tool call.
    pub tool_name: String,
    /// What the tool does.
    pub description: String,
}

/// Tool invocation requested by the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Name of the stored tool.
    pub name: String,
    /// Named arguments.
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

/// Wire shape of a tool-call reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallEnvelope {
    /// Requested call.
    pub tool_call: ToolCallRequest,
}

/// Parsed agent reply.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentReply {
    /// Plain answer to show the user.
    Text(String),
    /// Request to run a tool.
    ToolCall(ToolCallRequest),
}

/// Classifies raw reply text. Anything that is not a tool-call object with a non-empty name is
/// plain text.
pub fn parse_agent_reply(raw: &str) -> AgentReply {
    match serde_json::from_str::<ToolCallEnvelope>(raw) {
        Ok(envelope) if !envelope.tool_call.name.is_empty() => {
            AgentReply::ToolCall(envelope.tool_call)
        }
        _ => AgentReply::Text(raw.to_string()),
    }
}

/// Agent request failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    /// No backend is configured on this host.
    #[error("agent backend is unavailable")]
    Unavailable,
    /// The backend was reached but the request failed.
    #[error("agent request failed: {0}")]
    Request(String),
}

/// Object-safe boxed future used by [`AgentService`].
pub type AgentFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service for the conversational backend.
pub trait AgentService {
    /// Sends user text with the conversation so far and the available tools.
    ///
    /// Returns the raw reply text; see [`parse_agent_reply`].
    fn send_message<'a>(
        &'a self,
        text: &'a str,
        history: &'a [ChatMessage],
        manifest: &'a [ToolManifestItem],
    ) -> AgentFuture<'a, Result<String, AgentError>>;

    /// Posts a tool result for the user message that triggered the call and returns the final
    /// answer text.
    fn send_tool_result<'a>(
        &'a self,
        original_message: &'a str,
        tool_name: &'a str,
        result: &'a Value,
    ) -> AgentFuture<'a, Result<String, AgentError>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Agent for hosts without a backend; every request fails with [`AgentError::Unavailable`].
pub struct NoopAgentService;

impl AgentService for NoopAgentService {
    fn send_message<'a>(
        &'a self,
        _text: &'a str,
        _history: &'a [ChatMessage],
        _manifest: &'a [ToolManifestItem],
    ) -> AgentFuture<'a, Result<String, AgentError>> {
        Box::pin(async { Err(AgentError::Unavailable) })
    }

    fn send_tool_result<'a>(
        &'a self,
        _original_message: &'a str,
        _tool_name: &'a str,
        _result: &'a Value,
    ) -> AgentFuture<'a, Result<String, AgentError>> {
        Box::pin(async { Err(AgentError::Unavailable) })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn tool_call_objects_parse_as_tool_calls() {
        let reply = parse_agent_reply(
            r#"{"tool_call":{"name":"calculator","arguments":{"expression":"2+2"}}}"#,
        );
        let AgentReply::ToolCall(call) = reply else {
            panic!("expected tool call");
        };
        assert_eq!(call.name, "calculator");
        assert_eq!(call.arguments.get("expression"), Some(&json!("2+2")));
    }

    #[test]
    fn other_replies_stay_text() {
        for raw in [
            "Hello there",
            "{\"answer\": 42}",
            "{\"tool_call\": {\"name\": \"\"}}",
            "[1, 2]",
        ] {
            assert_eq!(parse_agent_reply(raw), AgentReply::Text(raw.to_string()));
        }
    }

    #[test]
    fn transcript_senders_use_snake_case() {
        let message = ChatMessage {
            id: "m1".to_string(),
            text: "42".to_string(),
            sender: MessageSender::ToolResult,
            timestamp_ms: 1,
            tool_name: Some("calculator".to_string()),
        };
        let value = serde_json::to_value(&message).expect("serialize");
        assert_eq!(value["sender"], "tool_result");
    }
}
