//! Response Sanitizer: strips code-fence wrapping the model adds despite instructions.

const FENCE: &str = "```";
const JSON_TAG: &str = "json";

/// Strips a leading ```` ```json ```` / ```` ``` ```` marker and a trailing ```` ``` ````,
/// then trims. The `json` tag matches in any case. Text without fences is only trimmed.
pub fn sanitize_response(text: &str) -> &str {
    let text = strip_opening_fence(text.trim()).trim_start();
    text.strip_suffix(FENCE).unwrap_or(text).trim()
}

fn strip_opening_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix(FENCE) else {
        return text;
    };
    match rest.get(..JSON_TAG.len()) {
        Some(tag) if tag.eq_ignore_ascii_case(JSON_TAG) => &rest[JSON_TAG.len()..],
        _ => rest,
    }
}
