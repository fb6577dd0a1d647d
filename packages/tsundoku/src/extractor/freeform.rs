//! Best-effort decoding of free-form model output.
//!
//! All attempts use the same response: remove code-fence markers and decode
//! the rest, else decode each balanced `{...}` span in order until one fits. Anything else is `Undecodable`; there is no partial salvage.

use serde::Deserialize;
use std::ops::Range;

/// The four fields as the model produced them, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawSummary {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub point: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FreeformParse {
    Decoded(RawSummary),
    Undecodable,
}

pub fn parse_freeform(raw: &str) -> FreeformParse {
    let unfenced = raw.replace("```json", "").replace("```JSON", "").replace("```", "");

    if let Ok(decoded) = serde_json::from_str::<RawSummary>(unfenced.trim()) {
        return FreeformParse::Decoded(decoded);
    }

    object_spans(raw)
        .find_map(|span| serde_json::from_str::<RawSummary>(span).ok())
        .map_or(FreeformParse::Undecodable, FreeformParse::Decoded)
}

/// Successive top-level `{...}` spans, left to right.
fn object_spans(text: &str) -> impl Iterator<Item = &str> {
    let mut cursor = 0;
    std::iter::from_fn(move || {
        let span = balanced_object_span(&text[cursor..])?;
        let found = &text[cursor + span.start..cursor + span.end];
        cursor += span.end;
        Some(found)
    })
}

/// Byte range of the first top-level `{...}` span, skipping braces inside
/// JSON strings.
fn balanced_object_span(text: &str) -> Option<Range<usize>> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start..start + offset + 1);
                }
            }
            _ => {}
        }
    }

    None
}
