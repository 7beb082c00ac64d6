// Cross-cutting prompt fragments. Each feature keeps its own prompts next to
// its service; only what several of them share lives here.

use serde::Serialize;

/// Closing instruction for prompts whose answer is parsed as a JSON object.
pub const JSON_OBJECT_ONLY: &str = "Return ONLY the JSON, no extra text.";

/// Closing instruction for prompts whose answer is parsed as a JSON array.
pub const JSON_ARRAY_ONLY: &str = "No explanations, no markdown, just the JSON array.";

/// Closing instruction for prompts whose answer is shown to the user verbatim.
pub const PLAIN_TEXT_ONLY: &str = "Return ONLY the text itself, no explanations or commentary.";

/// Pretty JSON for embedding data in a prompt. Falls back to `null`.
pub fn embed_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

/// Substitutes `{name}` placeholders in one pass. Substituted text is never
/// scanned again, so user input that looks like a placeholder stays literal.
/// Braces that are not a listed placeholder (JSON examples) are kept as is.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = values.iter().find_map(|(name, value)| {
            after
                .strip_prefix(name)
                .and_then(|tail| tail.strip_prefix('}'))
                .map(|tail| (*value, tail))
        });
        match value {
            Some((value, tail)) => {
                out.push_str(value);
                rest = tail;
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Truncates to at most `max_chars` characters, never splitting a character.
pub fn clip(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
