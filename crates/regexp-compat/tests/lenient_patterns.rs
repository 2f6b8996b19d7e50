//! Annex B pattern leniencies compile and match the way browsers do.

use regexp_compat::{RegExpContext, StringMatch};
use tracing_subscriber::filter::EnvFilter;

/// `RUST_LOG=regexp_compat=debug` shows each translated pattern.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn matches(source: &str, flags: &str, subject: &str) -> Option<String> {
    init_tracing();
    let mut ctx = RegExpContext::new();
    let mut re = ctx.compile(source, flags).unwrap();
    re.exec(&mut ctx, subject).map(|m| m.matched().to_string())
}

#[test]
fn test_stray_brackets_and_braces_are_literal() {
    assert_eq!(matches("[ab[]", "", "x[").as_deref(), Some("["));
    assert_eq!(matches("a]", "", "a]").as_deref(), Some("a]"));
    assert_eq!(matches("x{a}", "", "x{a}").as_deref(), Some("x{a}"));
    assert_eq!(matches("ab{", "", "ab{").as_deref(), Some("ab{"));
    assert_eq!(matches("a{2}", "", "aaa").as_deref(), Some("aa"));
}

#[test]
fn test_empty_classes() {
    assert_eq!(matches("a[]", "", "a"), None);
    assert_eq!(matches("a[^]b", "", "a\nb").as_deref(), Some("a\nb"));
}

#[test]
fn test_digit_escapes() {
    assert_eq!(matches("\\9", "", "9").as_deref(), Some("9"));
    assert_eq!(matches("\\101", "", "A").as_deref(), Some("A"));
    assert_eq!(matches("(a)\\1", "", "aa").as_deref(), Some("aa"));
    assert_eq!(matches("(a)(b)[^\\2c]", "", "abc"), None);
    assert_eq!(matches("(a)(b)[^\\2c]", "", "abd").as_deref(), Some("abd"));
}

#[test]
fn test_optional_group_back_reference_matches_empty() {
    let mut ctx = RegExpContext::new();
    let mut re = ctx.compile("(x)?y\\1", "").unwrap();
    let m = re.exec(&mut ctx, "y").unwrap();
    assert_eq!(m.matched(), "y");
}

#[test]
fn test_unterminated_group_is_literal() {
    let mut ctx = RegExpContext::new();
    let mut re = ctx.compile("((a)\\2", "").unwrap();
    let m = re.exec(&mut ctx, "(aa").unwrap();
    assert_eq!(m.matched(), "(aa");
    assert_eq!(m.group_count(), 2);
    assert_eq!(m.group(1), None);
    assert_eq!(m.group(2), Some("a"));
}

#[test]
fn test_dot_and_line_terminators() {
    assert_eq!(matches("a.b", "", "a\nb"), None);
    assert_eq!(matches("a.b", "", "a\u{2028}b"), None);
    assert_eq!(matches("a.b", "", "a-b").as_deref(), Some("a-b"));
    assert_eq!(matches("a.b", "s", "a\nb").as_deref(), Some("a\nb"));
}

#[test]
fn test_flags_reach_the_host() {
    assert_eq!(matches("abc", "i", "xABC").as_deref(), Some("ABC"));
    assert_eq!(matches("^b", "", "a\nb"), None);
    assert_eq!(matches("^b", "m", "a\nb").as_deref(), Some("b"));
}

#[test]
fn test_shorthand_classes_are_ascii() {
    assert_eq!(matches("\\d", "", "٣"), None);
    assert_eq!(matches("\\w+", "", "é_1").as_deref(), Some("_1"));
}

#[test]
fn test_unicode_escapes() {
    assert_eq!(matches("\\u263A", "", "☺").as_deref(), Some("☺"));
    assert_eq!(matches("\\uD83D\\uDE00", "", "😀").as_deref(), Some("😀"));
    assert_eq!(matches("\\u{1F600}", "u", "😀").as_deref(), Some("😀"));
}

#[test]
fn test_named_back_reference() {
    let mut ctx = RegExpContext::new();
    let mut re = ctx.compile("(?<q>['\"]).*?\\k<q>", "g").unwrap();
    assert_eq!(
        re.match_string(&mut ctx, "say 'hi' and \"bye\""),
        Some(StringMatch::All(vec![
            "'hi'".to_string(),
            "\"bye\"".to_string()
        ]))
    );
}

#[test]
fn test_reference_to_non_participating_group_matches_empty() {
    assert_eq!(matches("(?:(a)|b)\\1", "", "b").as_deref(), Some("b"));
    assert_eq!(matches("(?:(a)|b)\\1", "", "aa").as_deref(), Some("aa"));
    assert_eq!(matches("(a)|b\\1", "", "b").as_deref(), Some("b"));
    assert_eq!(matches("(a)*\\1", "", "b").as_deref(), Some(""));
    assert_eq!(matches("(a)*?\\1b", "", "b").as_deref(), Some("b"));
    assert_eq!(matches("(a){0,2}\\1b", "", "b").as_deref(), Some("b"));
    assert_eq!(matches("(?:(?<q>a)|b)\\k<q>c", "", "bc").as_deref(), Some("bc"));
}

#[test]
fn test_quantified_lookahead() {
    assert_eq!(matches("(?=a)?b", "", "b").as_deref(), Some("b"));
    assert_eq!(matches("(?=a)*b", "", "ab").as_deref(), Some("b"));
    assert_eq!(matches("(?=a)+a", "", "ba").as_deref(), Some("a"));
    assert_eq!(matches("(?!a)+b", "", "b").as_deref(), Some("b"));
    assert_eq!(matches("(?=a){2}.", "", "ba").as_deref(), Some("a"));

    let mut ctx = RegExpContext::new();
    let mut re = ctx.compile("(?=(a))?a", "").unwrap();
    let m = re.exec(&mut ctx, "a").unwrap();
    assert_eq!(m.matched(), "a");
    assert_eq!(m.group(1), None);
}

#[test]
fn test_space_class_is_ecmascript_whitespace() {
    assert_eq!(matches("\\s", "", "\u{FEFF}").as_deref(), Some("\u{FEFF}"));
    assert_eq!(matches("\\s", "", "\u{3000}").as_deref(), Some("\u{3000}"));
    assert_eq!(matches("\\s", "", "\u{85}"), None);
    assert_eq!(matches("\\S", "", "\u{85}").as_deref(), Some("\u{85}"));
    assert_eq!(matches("[\\s]", "", "\u{FEFF}").as_deref(), Some("\u{FEFF}"));
    assert_eq!(matches("[^\\s]", "", "\u{FEFF}"), None);
}

#[test]
fn test_negated_shorthands_inside_classes_are_ascii() {
    assert_eq!(matches("[\\W]", "", "é").as_deref(), Some("é"));
    assert_eq!(matches("[^\\D]", "", "٣"), None);
    assert_eq!(matches("[^\\D]", "", "x5").as_deref(), Some("5"));
    assert_eq!(matches("[x\\S]", "", "\u{FEFF}"), None);
}

#[test]
fn test_word_boundaries_are_ascii() {
    assert_eq!(matches("\\bé", "", "é"), None);
    assert_eq!(matches("\\bx", "", "éx").as_deref(), Some("x"));
    assert_eq!(matches("é\\B", "", "é"), Some("é".to_string()));
    assert_eq!(matches("\\bab\\b", "", "(ab)").as_deref(), Some("ab"));
}

#[test]
fn test_ignore_case_keeps_word_sets_ascii() {
    assert_eq!(matches("\\w", "i", "\u{17F}"), None);
    assert_eq!(matches("\\w", "i", "\u{212A}"), None);
    assert_eq!(matches("\\W", "i", "\u{17F}").as_deref(), Some("\u{17F}"));
    assert_eq!(matches("\\bK", "i", "k").as_deref(), Some("k"));
}

#[test]
fn test_unicode_ignore_case_folds_word_sets() {
    assert_eq!(matches("\\w", "iu", "\u{17F}").as_deref(), Some("\u{17F}"));
}
