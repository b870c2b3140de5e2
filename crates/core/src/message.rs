//! The message & content model (spec §3).
//!
//! A `Message` is a tagged record: `kind`, `timestamp`, and a `content`
//! payload whose shape depends on `kind`. Messages are created once by the
//! heartbeat loop and never mutated afterwards — only evicted from the FIFO
//! tier. `to_intermediate_repr`/`from_intermediate_repr` mirror the wire
//! shape the original agent used for DB storage and for the assistant's
//! view of its own history; `to_std_message_format` renders a message into
//! the `{role, content}` shape an LLM chat API expects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    User,
    System,
    Assistant,
    #[serde(rename = "function_res")]
    FunctionResult,
}

impl MessageKind {
    fn as_str(&self) -> &'static str {
        match self {
            MessageKind::User => "user",
            MessageKind::System => "system",
            MessageKind::Assistant => "assistant",
            MessageKind::FunctionResult => "function_res",
        }
    }

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "user" => Ok(MessageKind::User),
            "system" => Ok(MessageKind::System),
            "assistant" => Ok(MessageKind::Assistant),
            "function_res" => Ok(MessageKind::FunctionResult),
            other => Err(Error::validation(format!("invalid message_type '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Value,
    pub do_heartbeat: bool,
}

/// One (emotion label, intensity) pair. Intensity is documented as 1..=10
/// but is not re-validated here — the LLM-facing schema in `hearth-llm`
/// owns that check, matching the original's `conint(ge=1, le=10)`.
pub type Emotion = (String, u8);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantContent {
    pub emotions: Vec<Emotion>,
    pub thoughts: Vec<String>,
    pub function_call: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResultContent {
    pub success: bool,
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(TextContent),
    Assistant(AssistantContent),
    FunctionResult(FunctionResultContent),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
    pub content: MessageContent,
}

impl Message {
    pub fn user(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind: MessageKind::User,
            timestamp,
            content: MessageContent::Text(TextContent { message: text.into() }),
        }
    }

    pub fn system(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind: MessageKind::System,
            timestamp,
            content: MessageContent::Text(TextContent { message: text.into() }),
        }
    }

    pub fn assistant(content: AssistantContent, timestamp: DateTime<Utc>) -> Self {
        Self { kind: MessageKind::Assistant, timestamp, content: MessageContent::Assistant(content) }
    }

    pub fn function_result(content: FunctionResultContent, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind: MessageKind::FunctionResult,
            timestamp,
            content: MessageContent::FunctionResult(content),
        }
    }

    /// Whether this message is user- or assistant- authored (the kinds
    /// Recall Storage and the Chat Log's `function_result` exclusion care
    /// about).
    pub fn is_user_or_assistant(&self) -> bool {
        matches!(self.kind, MessageKind::User | MessageKind::Assistant)
    }

    /// The tagged JSON shape used for DB storage and for search results
    /// shown back to the model.
    pub fn to_intermediate_repr(&self) -> Value {
        let content = match &self.content {
            MessageContent::Text(t) => json!({ "message": t.message }),
            MessageContent::Assistant(a) => json!({
                "emotions": a.emotions,
                "thoughts": a.thoughts,
                "function_call": {
                    "name": a.function_call.name,
                    "arguments": a.function_call.arguments,
                    "do_heartbeat": a.function_call.do_heartbeat,
                },
            }),
            MessageContent::FunctionResult(f) => json!({
                "success": f.success,
                "result": f.result,
            }),
        };

        json!({
            "message_type": self.kind.as_str(),
            "timestamp": self.timestamp.to_rfc3339(),
            "content": content,
        })
    }

    pub fn from_intermediate_repr(value: &Value) -> crate::Result<Self> {
        let kind = MessageKind::from_str(
            value
                .get("message_type")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::validation("missing message_type"))?,
        )?;

        let timestamp = value
            .get("timestamp")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::validation("missing timestamp"))?;
        let timestamp = DateTime::parse_from_rfc3339(timestamp)
            .map_err(|e| Error::validation(format!("invalid timestamp: {e}")))?
            .with_timezone(&Utc);

        let content_value = value
            .get("content")
            .ok_or_else(|| Error::validation("missing content"))?;

        let content = match kind {
            MessageKind::User | MessageKind::System => {
                MessageContent::Text(serde_json::from_value(content_value.clone())?)
            }
            MessageKind::Assistant => {
                MessageContent::Assistant(serde_json::from_value(content_value.clone())?)
            }
            MessageKind::FunctionResult => {
                MessageContent::FunctionResult(serde_json::from_value(content_value.clone())?)
            }
        };

        Ok(Self { kind, timestamp, content })
    }

    /// Renders this message the way it appears to the LLM: `role` is
    /// `"assistant"` for assistant-kind messages and `"user"` otherwise
    /// (system/function-result turns are presented as user-side context,
    /// to be merged by the context assembler's role translation).
    pub fn to_std_message_format(&self) -> crate::Result<(String, String)> {
        let role = if self.kind == MessageKind::Assistant { "assistant" } else { "user" };
        let dumped = serde_yaml::to_string(&self.to_intermediate_repr())?;
        Ok((role.to_string(), dumped.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn round_trips_user_message() {
        let msg = Message::user("hi", ts());
        let repr = msg.to_intermediate_repr();
        let back = Message::from_intermediate_repr(&repr).unwrap();
        assert_eq!(msg, back);
    }

    #[test]
    fn round_trips_system_message() {
        let msg = Message::system("careful", ts());
        let back = Message::from_intermediate_repr(&msg.to_intermediate_repr()).unwrap();
        assert_eq!(msg, back);
    }

    #[test]
    fn round_trips_assistant_message() {
        let content = AssistantContent {
            emotions: vec![("curious".into(), 7)],
            thoughts: vec!["let's see".into()],
            function_call: FunctionCall {
                name: "send_message".into(),
                arguments: json!({"message": "hello"}),
                do_heartbeat: false,
            },
        };
        let msg = Message::assistant(content, ts());
        let back = Message::from_intermediate_repr(&msg.to_intermediate_repr()).unwrap();
        assert_eq!(msg, back);
    }

    #[test]
    fn round_trips_function_result_message() {
        let content = FunctionResultContent { success: true, result: json!("ok") };
        let msg = Message::function_result(content, ts());
        let back = Message::from_intermediate_repr(&msg.to_intermediate_repr()).unwrap();
        assert_eq!(msg, back);
    }

    #[test]
    fn assistant_role_is_assistant_others_are_user() {
        let (role, _) = Message::user("hi", ts()).to_std_message_format().unwrap();
        assert_eq!(role, "user");
        let content = AssistantContent {
            emotions: vec![],
            thoughts: vec![],
            function_call: FunctionCall { name: "x".into(), arguments: json!({}), do_heartbeat: true },
        };
        let (role, _) = Message::assistant(content, ts()).to_std_message_format().unwrap();
        assert_eq!(role, "assistant");
    }
}
