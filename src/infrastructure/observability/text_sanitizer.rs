use std::sync::LazyLock;

use regex::Regex;

const MAX_VISIBLE_LENGTH: usize = 100;
/// Digit runs at least this long are treated as account or card numbers.
const MIN_MASKED_DIGITS: usize = 8;

static CREDENTIAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?P<key>Bearer |api_key=|password=|secret=|token=)[^\s&"']*"#).unwrap()
});

/// Makes user command text safe to log: trimmed, truncated, credentials redacted,
/// long digit runs masked down to their last four digits.
pub fn sanitize_command_text(text: &str) -> String {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    let char_count = trimmed.chars().count();
    let visible = if char_count > MAX_VISIBLE_LENGTH {
        let head: String = trimmed.chars().take(MAX_VISIBLE_LENGTH).collect();
        format!("{}... ({} chars total)", head, char_count)
    } else {
        trimmed.to_string()
    };

    mask_digit_runs(&redact_sensitive_patterns(&visible))
}

fn redact_sensitive_patterns(text: &str) -> String {
    CREDENTIAL.replace_all(text, "${key}[REDACTED]").into_owned()
}

fn mask_digit_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = String::new();

    let flush = |run: &mut String, out: &mut String| {
        if run.len() >= MIN_MASKED_DIGITS {
            out.push_str(&"*".repeat(run.len() - 4));
            out.push_str(&run[run.len() - 4..]);
        } else {
            out.push_str(run);
        }
        run.clear();
    };

    for c in text.chars() {
        if c.is_ascii_digit() {
            run.push(c);
        } else {
            flush(&mut run, &mut out);
            out.push(c);
        }
    }
    flush(&mut run, &mut out);

    out
}
