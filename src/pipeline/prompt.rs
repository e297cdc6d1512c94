//! Prompt extraction from request bodies.
//!
//! Field priority: `prompt`, then `messages`, then `inputs`. A field only
//! counts when it has the expected shape; otherwise the next one is tried.

use serde_json::Value;

/// Text evaluated by the content filter. Empty when no field is usable.
pub fn extract_prompt(body: &Value) -> String {
    if let Some(prompt) = body.get("prompt").and_then(Value::as_str) {
        return prompt.to_string();
    }
    if let Some(text) = body
        .get("messages")
        .and_then(Value::as_array)
        .and_then(|messages| join_messages(messages))
    {
        return text;
    }
    if let Some(inputs) = body.get("inputs").and_then(Value::as_str) {
        return inputs.to_string();
    }
    String::new()
}

fn join_messages(messages: &[Value]) -> Option<String> {
    let parts: Vec<String> = messages
        .iter()
        .filter_map(|m| m.get("content"))
        .filter_map(content_text)
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// String content, or the text parts of multi-part content.
fn content_text(content: &Value) -> Option<String> {
    match content {
        Value::String(s) => Some(s.clone()),
        Value::Array(parts) => {
            let texts: Vec<&str> = parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect();
            if texts.is_empty() {
                None
            } else {
                Some(texts.join(" "))
            }
        }
        _ => None,
    }
}

/// First `max_chars` characters of `text`, for info-level log previews.
pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Collapse line breaks so one audit event stays on one log line.
pub fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prompt_field_wins() {
        let body = json!({ "prompt": "p", "messages": [{ "role": "user", "content": "m" }], "inputs": "i" });
        assert_eq!(extract_prompt(&body), "p");
    }

    #[test]
    fn messages_joined_with_single_space() {
        let body = json!({ "messages": [
            { "role": "system", "content": "Be brief." },
            { "role": "user", "content": "Hello, how are you?" }
        ]});
        assert_eq!(extract_prompt(&body), "Be brief. Hello, how are you?");
    }

    #[test]
    fn multipart_content_uses_text_parts() {
        let body = json!({ "messages": [{ "role": "user", "content": [
            { "type": "text", "text": "describe" },
            { "type": "image_url", "image_url": { "url": "http://x" } },
            { "type": "text", "text": "this" }
        ]}]});
        assert_eq!(extract_prompt(&body), "describe this");
    }

    #[test]
    fn unusable_fields_fall_through() {
        assert_eq!(extract_prompt(&json!({ "prompt": 42, "inputs": "i" })), "i");
        assert_eq!(extract_prompt(&json!({ "messages": "nope", "inputs": "i" })), "i");
        assert_eq!(extract_prompt(&json!({ "messages": [{ "role": "user" }], "inputs": "i" })), "i");
    }

    #[test]
    fn missing_fields_give_empty_prompt() {
        assert_eq!(extract_prompt(&json!({ "model": "x" })), "");
        assert_eq!(extract_prompt(&json!({ "inputs": ["a"] })), "");
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        assert_eq!(preview("héllo wörld", 5), "héllo");
        assert_eq!(preview("short", 50), "short");
    }

    #[test]
    fn single_line_removes_breaks() {
        assert_eq!(single_line("a\nb\r\nc"), "a b  c");
    }
}
