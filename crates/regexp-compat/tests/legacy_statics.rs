//! Legacy `RegExp.$1`..`$9`, `lastMatch`, `lastParen`, `leftContext` and
//! `rightContext` as observed through searches.

use regexp_compat::{ContextRegistry, RegExpConfig, RegExpContext};

#[test]
fn test_statics_after_exec() {
    let mut ctx = RegExpContext::new();
    let mut re = ctx.compile("(Html)Unit", "").unwrap();
    let m = re.exec(&mut ctx, "1234HtmlUnitxyz").unwrap();
    assert_eq!(m.matched(), "HtmlUnit");

    let statics = ctx.statics();
    assert_eq!(statics.dollar(1), Some("Html"));
    assert_eq!(statics.dollar(2), Some(""));
    assert_eq!(statics.last_match(), "HtmlUnit");
    assert_eq!(statics.last_paren(), "Html");
    assert_eq!(statics.left_context(), "1234");
    assert_eq!(statics.right_context(), "xyz");
    assert_eq!(statics.input(), "1234HtmlUnitxyz");
}

#[test]
fn test_failed_search_keeps_previous_state() {
    let mut ctx = RegExpContext::new();
    let mut hit = ctx.compile("b(c)", "").unwrap();
    let mut miss = ctx.compile("zzz", "").unwrap();

    assert!(hit.test(&mut ctx, "abcd"));
    assert!(!miss.test(&mut ctx, "abcd"));
    assert_eq!(ctx.statics().last_match(), "bc");
    assert_eq!(ctx.statics().dollar(1), Some("c"));
}

#[test]
fn test_last_paren_is_highest_participating_group() {
    let mut ctx = RegExpContext::new();
    let mut re = ctx.compile("(a)|(b)", "").unwrap();

    re.exec(&mut ctx, "b").unwrap();
    assert_eq!(ctx.statics().dollar(1), Some(""));
    assert_eq!(ctx.statics().dollar(2), Some("b"));
    assert_eq!(ctx.statics().last_paren(), "b");

    re.exec(&mut ctx, "a").unwrap();
    assert_eq!(ctx.statics().last_paren(), "a");
    assert_eq!(ctx.statics().dollar(2), Some(""));
}

#[test]
fn test_only_nine_slots() {
    let mut ctx = RegExpContext::new();
    let mut re = ctx
        .compile("(a)(b)(c)(d)(e)(f)(g)(h)(i)(j)", "")
        .unwrap();
    let m = re.exec(&mut ctx, "abcdefghij").unwrap();
    assert_eq!(m.group(10), Some("j"));

    let statics = ctx.statics();
    assert_eq!(statics.dollar(9), Some("i"));
    assert_eq!(statics.dollar(10), None);
    assert_eq!(statics.get("$10"), None);
    assert_eq!(statics.last_paren(), "j");
}

#[test]
fn test_global_replace_leaves_last_match() {
    let mut ctx = RegExpContext::new();
    let mut re = ctx.compile("(\\d)", "g").unwrap();
    assert_eq!(re.replace(&mut ctx, "a1b2c3", "[$1]"), "a[1]b[2]c[3]");
    assert_eq!(ctx.statics().last_match(), "3");
    assert_eq!(ctx.statics().left_context(), "a1b2c");
    assert_eq!(ctx.statics().right_context(), "");
}

#[test]
fn test_split_updates_statics() {
    let mut ctx = RegExpContext::new();
    let re = ctx.compile(",", "").unwrap();
    re.split(&mut ctx, "x,y", None);
    assert_eq!(ctx.statics().last_match(), ",");
    assert_eq!(ctx.statics().left_context(), "x");
}

#[test]
fn test_input_is_writable() {
    let mut ctx = RegExpContext::new();
    ctx.statics_mut().set_input("typed");
    assert_eq!(ctx.statics().get("$_"), Some("typed"));
    assert_eq!(ctx.statics().get("input"), Some("typed"));
}

#[test]
fn test_windows_are_isolated() {
    let registry = ContextRegistry::new(RegExpConfig::default());
    let top = registry.create();
    let frame = registry.create();

    {
        let mut ctx = top.lock();
        let mut re = ctx.compile("(o+)", "").unwrap();
        re.exec(&mut ctx, "foo").unwrap();
    }
    {
        let mut ctx = frame.lock();
        let mut re = ctx.compile("(a)", "").unwrap();
        re.exec(&mut ctx, "bar").unwrap();
    }

    assert_eq!(top.lock().statics().dollar(1), Some("oo"));
    assert_eq!(frame.lock().statics().dollar(1), Some("a"));

    let frame_id = frame.lock().id();
    drop(frame);
    assert!(registry.remove(frame_id).is_some());
    assert_eq!(top.lock().statics().last_match(), "oo");
}
