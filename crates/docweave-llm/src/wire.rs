//! OpenAI chat-completions wire format.

use docweave_core::models::{ChatMessage, ChatRequest, ChatResponse, Role, ToolCall};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct WireRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<WireTool<'a>>,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireMessage<'a> {
    pub role: Role,
    pub content: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireTool<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: WireFunctionDef<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireFunctionDef<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub parameters: &'a serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireToolCall {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: WireFunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireFunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireResponse {
    #[serde(default)]
    pub choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireChoice {
    pub message: WireResponseMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<WireToolCall>,
}

pub(crate) fn to_wire<'a>(model: &'a str, request: &'a ChatRequest) -> WireRequest<'a> {
    WireRequest {
        model,
        messages: request.messages.iter().map(message).collect(),
        tools: request
            .tools
            .iter()
            .map(|t| WireTool {
                kind: "function",
                function: WireFunctionDef {
                    name: &t.name,
                    description: &t.description,
                    parameters: &t.parameters,
                },
            })
            .collect(),
        temperature: request.temperature,
    }
}

fn message(m: &ChatMessage) -> WireMessage<'_> {
    WireMessage {
        role: m.role,
        content: m.content.as_deref(),
        tool_calls: m
            .tool_calls
            .iter()
            .map(|c| WireToolCall {
                id: c.id.clone(),
                kind: function_kind(),
                function: WireFunctionCall {
                    name: c.name.clone(),
                    arguments: c.arguments.clone(),
                },
            })
            .collect(),
        tool_call_id: m.tool_call_id.as_deref(),
    }
}

/// The first choice as a `ChatResponse`; `None` when there are no choices.
pub(crate) fn from_wire(response: WireResponse) -> Option<ChatResponse> {
    let choice = response.choices.into_iter().next()?;
    let tool_calls = choice
        .message
        .tool_calls
        .into_iter()
        .enumerate()
        .map(|(i, c)| ToolCall {
            id: if c.id.is_empty() {
                format!("call_{i}")
            } else {
                c.id
            },
            name: c.function.name,
            arguments: c.function.arguments,
        })
        .collect();
    Some(ChatResponse {
        content: choice.message.content.filter(|c| !c.is_empty()),
        tool_calls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use docweave_core::models::ToolDefinition;

    #[test]
    fn request_carries_tools_and_tool_turns() {
        let request = ChatRequest::new(vec![
            ChatMessage::system("explore"),
            ChatMessage::assistant_tool_calls(
                None,
                vec![ToolCall {
                    id: "call_1".into(),
                    name: "read_file".into(),
                    arguments: r#"{"path":"a.py"}"#.into(),
                }],
            ),
            ChatMessage::tool_result("call_1", "contents"),
        ])
        .with_tools(vec![ToolDefinition {
            name: "read_file".into(),
            description: "Read a file".into(),
            parameters: serde_json::json!({"type": "object"}),
        }]);

        let json = serde_json::to_value(to_wire("gpt-test", &request)).unwrap();
        assert_eq!(json["model"], "gpt-test");
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["tools"][0]["type"], "function");
        assert_eq!(json["tools"][0]["function"]["name"], "read_file");
        assert_eq!(json["messages"][1]["tool_calls"][0]["function"]["name"], "read_file");
        assert_eq!(json["messages"][2]["role"], "tool");
        assert_eq!(json["messages"][2]["tool_call_id"], "call_1");
    }

    #[test]
    fn response_tool_calls_get_ids() {
        let body: WireResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"","tool_calls":[
                {"function":{"name":"finish_exploration","arguments":"{}"}}]}}]}"#,
        )
        .unwrap();
        let response = from_wire(body).unwrap();
        assert!(response.content.is_none());
        assert_eq!(response.tool_calls[0].id, "call_0");
        assert_eq!(response.tool_calls[0].name, "finish_exploration");
    }

    #[test]
    fn empty_choices_is_none() {
        let body: WireResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(from_wire(body).is_none());
    }
}
