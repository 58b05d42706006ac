use super::*;

fn chars(s: &str) -> f32 {
    s.chars().count() as f32
}

#[test]
fn greedy_wrap_fills_lines() {
    let lines = wrap_text("the quick brown fox jumps", 10.0, chars);
    assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
}

#[test]
fn explicit_newlines_are_kept() {
    let lines = wrap_text("one\n\ntwo", 100.0, chars);
    assert_eq!(lines, vec!["one", "", "two"]);
}

#[test]
fn long_tokens_break_between_characters() {
    let lines = wrap_text("ab abcdefghij", 4.0, chars);
    assert_eq!(lines, vec!["ab", "abcd", "efgh", "ij"]);
}

#[test]
fn text_without_spaces_breaks_per_character() {
    let lines = wrap_text("日本語のテキスト", 3.0, chars);
    assert_eq!(lines, vec!["日本語", "のテキ", "スト"]);
}

#[test]
fn narrow_box_still_makes_progress() {
    let lines = wrap_text("abc", 0.5, chars);
    assert_eq!(lines, vec!["a", "b", "c"]);
}

#[test]
fn unregistered_font_is_an_export_error() {
    let mut engine = TextLayoutEngine::new();
    let style = TextStyle {
        size_px: 12.0,
        weight: 400,
        italic: false,
        brush: TextBrush::default(),
    };
    let err = engine.measure("Missing", "x", &style).unwrap_err();
    assert!(matches!(err, RetouchError::Export(_)), "{err}");
}

#[test]
fn garbage_font_bytes_are_rejected() {
    let mut reg = FontRegistry::new();
    assert!(reg.register("Junk", vec![0, 1, 2, 3]).is_err());
    assert!(reg.register(" ", vec![]).is_err());
    assert!(!reg.contains("Junk"));
}

#[test]
fn brush_from_rgba() {
    let b = TextBrush::from([1, 2, 3, 4]);
    assert_eq!((b.r, b.g, b.b, b.a), (1, 2, 3, 4));
}
