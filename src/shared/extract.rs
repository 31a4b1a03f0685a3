//! Locate structured data inside free-form model output
//!
//! Providers wrap JSON in prose or Markdown fences more often than not, so
//! callers search the returned text for the first balanced `{...}` block that
//! parses as a JSON object.

use serde_json::Value;

/// Return the first substring of `text` that is a complete JSON object
///
/// Brace matching is string-aware: braces inside JSON string literals (and
/// escaped quotes inside those literals) do not affect nesting. A candidate
/// that balances but fails to parse is skipped and scanning resumes at the
/// next `{`.
pub fn first_json_object(text: &str) -> Option<Value> {
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = matching_brace(&text[start..]) {
            let candidate = &text[start..start + end + 1];
            if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(candidate) {
                return Some(value);
            }
        }
        search_from = start + 1;
    }

    None
}

/// Byte index of the `}` closing the `{` at index 0, if any
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}
