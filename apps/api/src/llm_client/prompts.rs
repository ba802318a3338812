// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Output goes straight into a plain-text editor, so markdown must never appear.
pub const PLAIN_TEXT_INSTRUCTION: &str = "\
**Formatting Rules (Strict - CRITICAL):**
- ABSOLUTELY NO MARKDOWN: do not use asterisks, underscores or hashes.
- PLAIN TEXT ONLY: the output must be ready to paste into a plain text editor.
- Use \u{25c9} for bullets.
- Do not bold or italicize words.";

/// Keeps the model writing in the first person as the freelancer.
pub const IDENTITY_INSTRUCTION: &str = "\
**Non-negotiable identity rule:**
Never reference being an AI, a model or a tool. Always write as the freelancer.";
