// Shared system-prompt fragments.
// Analysis-specific prompt text lives in analysis/prompts.rs.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System prompt fragment for plain prose replies split by blank lines.
pub const PLAIN_PROSE_SYSTEM: &str = "You are a clear, concise assistant. \
    Respond in plain text. \
    Separate each requested section with exactly one blank line. \
    Do NOT use blank lines inside a section.";
