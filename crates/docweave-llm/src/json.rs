//! Pulling JSON payloads out of free-form model text.

/// The JSON value a model reply carries: the body of the first fenced
/// block if there is one, else the outermost `open`..`close` span.
pub fn extract_json(text: &str, open: char, close: char) -> Option<&str> {
    let body = fenced_body(text).unwrap_or(text);
    let start = body.find(open)?;
    let end = body.rfind(close)?;
    (end > start).then(|| &body[start..=end])
}

/// `extract_json` for arrays.
pub fn extract_json_array(text: &str) -> Option<&str> {
    extract_json(text, '[', ']')
}

fn fenced_body(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after = &text[open + 3..];
    // Skip the info string (`json`, `JSON`, ...).
    let body_start = after.find('\n')? + 1;
    let body = &after[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_array() {
        assert_eq!(extract_json_array(r#"[{"a":1}]"#), Some(r#"[{"a":1}]"#));
    }

    #[test]
    fn fenced_block_with_prose() {
        let text = "Here is the outline:\n```json\n[{\"title\": \"A\"}]\n```\nThanks.";
        assert_eq!(extract_json_array(text), Some("[{\"title\": \"A\"}]"));
    }

    #[test]
    fn missing_payload() {
        assert_eq!(extract_json_array("no json here"), None);
        assert_eq!(extract_json_array("] backwards ["), None);
    }
}
