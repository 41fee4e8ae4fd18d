use serde::de::DeserializeOwned;

use crate::errors::Error;

/// Returns the first balanced `{...}` block in `text`.
///
/// Braces inside JSON string literals do not count. A `{` that never closes
/// is skipped and the scan resumes at the next `{`.
pub fn first_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut start = 0;

    while let Some(offset) = text[start..].find('{') {
        let open = start + offset;
        if let Some(close) = matching_brace(&bytes[open..]) {
            return Some(&text[open..=open + close]);
        }
        start = open + 1;
    }

    None
}

fn matching_brace(bytes: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

/// Removes markdown code fences the model sometimes wraps JSON in.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// First `max` characters of a model response, for error messages.
pub fn preview(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Pulls the first JSON object out of free-form model output and decodes it.
pub fn parse_embedded<T: DeserializeOwned>(text: &str) -> Result<T, Error> {
    let block = first_json_object(text).ok_or_else(|| {
        Error::unparseable(format!(
            "AI failed to return a JSON object. Response: \"{}...\"",
            preview(text, 100)
        ))
    })?;

    serde_json::from_str(block)
        .map_err(|e| Error::unparseable(format!("AI returned malformed JSON: {}", e)))
}

/// Decodes model output that should be JSON apart from code fences.
pub fn parse_fenced<T: DeserializeOwned>(text: &str) -> Result<T, Error> {
    serde_json::from_str(&strip_code_fences(text))
        .map_err(|e| Error::unparseable(format!("AI returned malformed JSON: {}", e)))
}
