//! Cleaning and parsing of raw model output.

use cimentra_core::ExtractedFields;

/// Remove Markdown code-fence markers the model sometimes wraps its JSON in,
/// despite being told not to. Removes every ```` ```json ```` and ```` ``` ````
/// occurrence, then trims.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse cleaned model output into [`ExtractedFields`]. Fenced JSON parses
/// identically to the same JSON without fences.
pub fn parse_fields(raw: &str) -> Result<ExtractedFields, serde_json::Error> {
    serde_json::from_str(&strip_code_fences(raw))
}
