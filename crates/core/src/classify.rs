//! Model and project classification as prioritized rule lists.
//!
//! Each list is evaluated top to bottom, first match wins, and a sentinel
//! is returned when nothing matches. The ordering is the tie-break policy:
//! entries earlier in the list are more specific signals.

pub const MODEL_FALLBACK: &str = "other";
pub const PROJECT_FALLBACK: &str = "other";

const MODEL_RULES: &[(&str, &str)] = &[
    ("opus", "claude-opus"),
    ("sonnet", "claude-sonnet"),
    ("haiku", "claude-haiku"),
    ("gpt", "gpt"),
];

const PROJECT_RULES: &[(&[&str], &str)] = &[
    (&["boost", "engage"], "boost"),
    (&["jarvis", "dashboard"], "jarvis-dashboard"),
    (&["dbmcp", "db-mcp"], "db-mcp"),
    (&["openclaw"], "openclaw"),
    (&["cron:"], "cron-jobs"),
    (&["discord"], "discord"),
    (&["telegram", "main:main"], "main-chat"),
];

/// Maps a raw model identifier to its pricing category. Total: unknown or
/// empty input resolves to [`MODEL_FALLBACK`].
pub fn normalize_model(raw: &str) -> &'static str {
    let lower = raw.to_ascii_lowercase();
    for (needle, category) in MODEL_RULES {
        if lower.contains(needle) {
            return category;
        }
    }
    MODEL_FALLBACK
}

fn scan_keywords(text: &str) -> Option<&'static str> {
    for (needles, project) in PROJECT_RULES {
        if needles.iter().any(|needle| text.contains(needle)) {
            return Some(project);
        }
    }
    None
}

/// Infers the project bucket for a session. An explicit hint after a
/// `subagent:` marker in the session key is checked before the whole-string
/// keyword scan, so a task that merely mentions a project keyword inside an
/// unrelated session is not misclassified.
pub fn infer_project(session_key: &str, label: Option<&str>) -> &'static str {
    let key = session_key.to_ascii_lowercase();
    if let Some((_, rest)) = key.split_once("subagent:") {
        let hint = rest.split(':').next().unwrap_or(rest);
        if let Some(project) = scan_keywords(hint) {
            return project;
        }
    }
    let text = match label {
        Some(label) if !label.is_empty() => label.to_ascii_lowercase(),
        _ => key,
    };
    scan_keywords(&text).unwrap_or(PROJECT_FALLBACK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_model_known_categories() {
        assert_eq!(normalize_model("claude-opus-4-6"), "claude-opus");
        assert_eq!(normalize_model("claude-sonnet-4-5-20250929"), "claude-sonnet");
        assert_eq!(normalize_model("claude-haiku-4-5-20251001"), "claude-haiku");
        assert_eq!(normalize_model("gpt-5.2-2025-12-11"), "gpt");
    }

    #[test]
    fn normalize_model_is_total() {
        assert_eq!(normalize_model(""), MODEL_FALLBACK);
        assert_eq!(normalize_model("llama-3-405b"), MODEL_FALLBACK);
        assert_eq!(normalize_model("\u{0}weird\u{7f}input"), MODEL_FALLBACK);
    }

    #[test]
    fn normalize_model_priority_order() {
        // "opus" outranks the later rules even when both appear.
        assert_eq!(normalize_model("opus-vs-gpt-eval"), "claude-opus");
    }

    #[test]
    fn infer_project_from_label_keywords() {
        assert_eq!(infer_project("agent:main:x", Some("engage api fix")), "boost");
        assert_eq!(infer_project("agent:main:x", Some("jarvis widgets")), "jarvis-dashboard");
        assert_eq!(infer_project("agent:main:cron:nightly", None), "cron-jobs");
        assert_eq!(infer_project("agent:main:telegram:group:ops", None), "main-chat");
    }

    #[test]
    fn infer_project_subagent_hint_wins_over_keyword_scan() {
        // The label mentions "boost" but the subagent hint says db-mcp.
        assert_eq!(
            infer_project("agent:main:subagent:db-mcp:f00d", Some("boost the db-mcp tests")),
            "db-mcp"
        );
    }

    #[test]
    fn infer_project_falls_back() {
        assert_eq!(infer_project("", None), PROJECT_FALLBACK);
        assert_eq!(infer_project("agent:main:something", Some("misc chore")), PROJECT_FALLBACK);
    }
}
