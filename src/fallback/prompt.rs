//! Prompt decoration for schema hints

/// Append a JSON schema hint to `prompt`
///
/// The hint is opaque: it is pretty-printed verbatim under an instruction line
/// and never validated. A JSON string hint is inserted as plain text.
pub fn with_schema_hint(prompt: &str, hint: &serde_json::Value) -> String {
    let rendered = match hint {
        serde_json::Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    };

    format!(
        "{}\n\nRespond with a single JSON object matching this schema:\n{}",
        prompt.trim_end(),
        rendered
    )
}
