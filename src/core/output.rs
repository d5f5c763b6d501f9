//! Compact rendering helpers for log lines and ranked replies.

/// Collapse newlines/extra whitespace and bound length for log display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Render a header followed by at most `limit` lines of `"{rank}. {name}: {score}"`.
pub fn ranked_list(header: &str, entries: &[(String, i64)], limit: usize) -> String {
    let mut out = header.to_string();
    if entries.is_empty() {
        out.push_str("\nNobody has received karma yet.");
        return out;
    }
    for (idx, (name, score)) in entries.iter().take(limit).enumerate() {
        out.push_str(&format!("\n{}. {}: {}", idx + 1, name, score));
    }
    out
}
