// tests for the reply post-filter

use sopbot::Safety;
use sopbot::core::{DISCLAIMER, TRIGGERS};

const REMINDER: &str =
    "\n\n⚠️ REMINDER: This is EXPLANATION ONLY. Consult your supervisor for approval.";

#[test]
fn test_plain_explanation_untouched() {
    let text = "Lockout-tagout isolates energy sources before maintenance.";
    let safety = Safety::check(text);
    assert!(!safety.flagged);
    assert!(safety.trigger.is_none());
    assert_eq!(Safety::filter(text), text);
}

#[test]
fn test_disclaimer_text_is_exact() {
    assert_eq!(DISCLAIMER, REMINDER);
}

#[test]
fn test_you_can_appends_disclaimer() {
    let text = "You can restart the press once the guard is closed.";
    assert_eq!(Safety::filter(text), format!("{text}{REMINDER}"));
}

#[test]
fn test_every_trigger_matches() {
    for trigger in TRIGGERS {
        let text = format!("some words, {trigger}, more words");
        let safety = Safety::check(&text);
        assert!(safety.flagged, "{trigger} should flag");
        assert_eq!(Safety::filter(&text), format!("{text}{REMINDER}"));
    }
}

#[test]
fn test_case_insensitive() {
    assert!(Safety::check("PERMISSION GRANTED to proceed").flagged);
    assert!(Safety::check("Your supervisor must Approve this").flagged);
    assert!(Safety::check("yOu CaN do that").flagged);
}

#[test]
fn test_substring_match_inside_words() {
    // substring, not word, matching
    assert!(Safety::check("It was preapproved last week").flagged);
}

#[test]
fn test_first_trigger_in_order_is_reported() {
    let safety = Safety::check("This was approved.");
    assert_eq!(safety.trigger, Some("approve"));

    let safety = Safety::check("permission granted, you can go");
    assert_eq!(safety.trigger, Some("permission granted"));
}

#[test]
fn test_near_misses_do_not_flag() {
    // "approval" and "can you" are not triggers
    assert!(!Safety::check("For specific approvals, consult your supervisor.").flagged);
    assert!(!Safety::check("Can you explain LOTO?").flagged);
    assert!(!Safety::check("permission is granted by supervisors").flagged);
}

#[test]
fn test_disclaimer_itself_is_clean() {
    assert!(!Safety::check(DISCLAIMER).flagged);
}

#[test]
fn test_not_idempotent() {
    let text = "You can check the manual.";
    let once = Safety::filter(text);
    let twice = Safety::filter(&once);
    assert_eq!(twice, format!("{text}{REMINDER}{REMINDER}"));
}

#[test]
fn test_empty_text() {
    assert_eq!(Safety::filter(""), "");
}
