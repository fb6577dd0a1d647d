//! Prompt text for article summarization.

/// Persona shared by both strategies.
pub const SYSTEM_PROMPT: &str = "\
You are a capable and kind reading assistant. A busy person saved this article \
to read later; read it for them and make it easy to act on. Write in the same \
language as the article.";

/// Schema-constrained calls: the shape is enforced out of band, so the
/// instruction only describes the task.
pub fn schema_prompt(article: &str) -> String {
    format!(
        "Summarize the article below for me.\n\n---Article---\n{}",
        article
    )
}

/// Free-form calls embed the expected object literally and ask for nothing else.
pub fn freeform_prompt(article: &str) -> String {
    format!(
        r#"Summarize the article below for me.
Reply with ONLY a JSON object in exactly this shape, with no extra text:

{{
    "title": "A catchy title for the article",
    "summary": "A gentle summary in about three sentences",
    "point": "The single most important point",
    "action": "One thing I should do starting tomorrow"
}}

---Article---
{}"#,
        article
    )
}
