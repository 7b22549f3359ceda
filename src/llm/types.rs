// src/llm/types.rs
// Chat-completion request/response types (OpenAI wire format)

use axum::body::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// A single chat message; unknown fields (name, tool_calls, ...) ride along untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: MessageContent) -> Self {
        Self {
            role: role.into(),
            content: Some(content),
            extra: Map::new(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new("system", MessageContent::Text(text.into()))
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new("user", MessageContent::Text(text.into()))
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new("assistant", MessageContent::Text(text.into()))
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self::new("user", MessageContent::Parts(parts))
    }

    pub fn is_system(&self) -> bool {
        self.role == "system"
    }

    /// Concatenated text of the message, ignoring non-text parts
    pub fn text(&self) -> String {
        match &self.content {
            Some(MessageContent::Text(t)) => t.clone(),
            Some(MessageContent::Parts(parts)) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One element of a multi-part message. Part types we do not model (audio,
/// files, malformed parts) are kept as raw JSON and forwarded unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
    Other(Value),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum KnownPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum KnownPartRef<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: &'a ImageUrl },
}

impl<'de> Deserialize<'de> for ContentPart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(match KnownPart::deserialize(&raw) {
            Ok(KnownPart::Text { text }) => Self::Text { text },
            Ok(KnownPart::ImageUrl { image_url }) => Self::ImageUrl { image_url },
            Err(_) => Self::Other(raw),
        })
    }
}

impl Serialize for ContentPart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text { text } => KnownPartRef::Text { text }.serialize(serializer),
            Self::ImageUrl { image_url } => KnownPartRef::ImageUrl { image_url }.serialize(serializer),
            Self::Other(raw) => raw.serialize(serializer),
        }
    }
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl {
                url: url.into(),
                detail: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Incoming completion call. Fields we do not model are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionRequest {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<ChatMessage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stream: bool,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            model: None,
            messages,
            stream: false,
            temperature: None,
            max_tokens: None,
        }
    }
}

/// What a dispatcher hands back: a whole JSON body or a stream of SSE bytes
pub enum Completion {
    Json(Value),
    Stream(BoxStream<'static, crate::Result<Bytes>>),
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(v) => f.debug_tuple("Json").field(v).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_string_and_parts_content() {
        let msgs: Vec<ChatMessage> = serde_json::from_value(json!([
            {"role": "system", "content": "be brief"},
            {"role": "user", "content": [
                {"type": "text", "text": "what is this"},
                {"type": "image_url", "image_url": {"url": "http://x/a.png"}}
            ]}
        ]))
        .unwrap();

        assert!(msgs[0].is_system());
        assert_eq!(msgs[0].text(), "be brief");
        assert_eq!(msgs[1].text(), "what is this");
        match &msgs[1].content {
            Some(MessageContent::Parts(parts)) => {
                assert_eq!(parts[1], ContentPart::image_url("http://x/a.png"));
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_extra_fields_survive() {
        let msg: ChatMessage = serde_json::from_value(json!({
            "role": "tool", "content": "42", "tool_call_id": "call_1"
        }))
        .unwrap();
        let back = serde_json::to_value(&msg).unwrap();
        assert_eq!(back["tool_call_id"], "call_1");
    }

    #[test]
    fn test_completion_request_defaults() {
        let req: CompletionRequest = serde_json::from_value(json!({
            "messages": [{"role": "user", "content": "hi"}],
            "conversation_id": "ignored-here"
        }))
        .unwrap();
        assert!(!req.stream);
        assert!(req.model.is_none());
        assert_eq!(req.messages.len(), 1);
    }

    #[test]
    fn test_unknown_parts_forwarded_unchanged() {
        let raw = json!({
            "role": "user",
            "content": [
                {"type": "text"},
                {"type": "input_audio", "input_audio": {"data": "UklGRg==", "format": "wav"}},
                {"type": "text", "text": "and this"}
            ]
        });
        let msg: ChatMessage = serde_json::from_value(raw.clone()).unwrap();
        match &msg.content {
            Some(MessageContent::Parts(parts)) => {
                assert!(matches!(parts[0], ContentPart::Other(_)));
                assert!(matches!(parts[1], ContentPart::Other(_)));
                assert_eq!(parts[2], ContentPart::text("and this"));
            }
            other => panic!("unexpected content: {:?}", other),
        }
        assert_eq!(msg.text(), "and this");
        assert_eq!(serde_json::to_value(&msg).unwrap(), raw);
    }

    #[test]
    fn test_null_stream_and_messages() {
        let req: CompletionRequest = serde_json::from_value(json!({
            "messages": [{"role": "user", "content": "hi"}],
            "stream": null
        }))
        .unwrap();
        assert!(!req.stream);

        let req: CompletionRequest =
            serde_json::from_value(json!({"messages": null, "stream": true})).unwrap();
        assert!(req.messages.is_empty());
        assert!(req.stream);
    }

    #[test]
    fn test_image_part_serialization() {
        let part = ContentPart::image_url("data:image/png;base64,AAAA");
        assert_eq!(
            serde_json::to_value(&part).unwrap(),
            json!({"type": "image_url", "image_url": {"url": "data:image/png;base64,AAAA"}})
        );
    }
}
