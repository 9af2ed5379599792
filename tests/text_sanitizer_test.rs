use accounting_agent::infrastructure::observability::sanitize_command_text;

#[test]
fn given_blank_text_when_sanitizing_then_marked_empty() {
    assert_eq!(sanitize_command_text("   \n"), "[EMPTY]");
}

#[test]
fn given_short_command_when_sanitizing_then_unchanged() {
    assert_eq!(
        sanitize_command_text("  Record a $20 lunch  "),
        "Record a $20 lunch"
    );
}

#[test]
fn given_long_command_when_sanitizing_then_truncated_with_total() {
    let text = "a".repeat(150);

    let sanitized = sanitize_command_text(&text);

    assert!(sanitized.starts_with(&"a".repeat(100)));
    assert!(sanitized.ends_with("... (150 chars total)"));
}

#[test]
fn given_credentials_in_command_when_sanitizing_then_redacted() {
    let sanitized = sanitize_command_text("use token=abc123 and password=hunter2 please");

    assert_eq!(
        sanitized,
        "use token=[REDACTED] and password=[REDACTED] please"
    );
}

#[test]
fn given_account_number_when_sanitizing_then_masked_to_last_four() {
    let sanitized = sanitize_command_text("balance of 1234567890 and 2024");

    assert_eq!(sanitized, "balance of ******7890 and 2024");
}

#[test]
fn given_repeated_credentials_when_sanitizing_then_every_occurrence_redacted() {
    let sanitized = sanitize_command_text(
        "token=first then token=secondsecret with Bearer abc and Bearer def",
    );

    assert_eq!(
        sanitized,
        "token=[REDACTED] then token=[REDACTED] with Bearer [REDACTED] and Bearer [REDACTED]"
    );
}
