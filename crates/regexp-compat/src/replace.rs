//! `$`-template expansion for `String.prototype.replace` (GetSubstitution).
//!
//! Only `$` sequences are special; backslashes are ordinary characters.

use crate::match_result::MatchResult;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    /// `$&`
    Matched,
    /// `` $` ``
    LeftContext,
    /// `$'`
    RightContext,
    /// `$n` / `$nn`
    Group(usize),
    /// `$<name>`
    Named(String),
}

/// A replacement template parsed against a pattern's group layout, so a
/// global replace scans the template once rather than once per match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    parts: Vec<Part>,
}

impl Replacement {
    /// Parse `template` for a pattern with `group_count` capturing groups.
    ///
    /// `$<name>` is only a token when the pattern has named groups.
    pub fn parse(template: &str, group_count: usize, has_named_groups: bool) -> Self {
        let chars: Vec<char> = template.chars().collect();
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut i = 0;

        let push = |parts: &mut Vec<Part>, literal: &mut String, part: Part| {
            if !literal.is_empty() {
                parts.push(Part::Literal(std::mem::take(literal)));
            }
            parts.push(part);
        };

        while i < chars.len() {
            if chars[i] != '$' || i + 1 >= chars.len() {
                literal.push(chars[i]);
                i += 1;
                continue;
            }
            match chars[i + 1] {
                '$' => {
                    literal.push('$');
                    i += 2;
                }
                '&' => {
                    push(&mut parts, &mut literal, Part::Matched);
                    i += 2;
                }
                '`' => {
                    push(&mut parts, &mut literal, Part::LeftContext);
                    i += 2;
                }
                '\'' => {
                    push(&mut parts, &mut literal, Part::RightContext);
                    i += 2;
                }
                '<' if has_named_groups => {
                    match chars[i + 2..].iter().position(|&c| c == '>') {
                        Some(close) => {
                            let name: String = chars[i + 2..i + 2 + close].iter().collect();
                            push(&mut parts, &mut literal, Part::Named(name));
                            i += 3 + close;
                        }
                        None => {
                            literal.push_str("$<");
                            i += 2;
                        }
                    }
                }
                d if d.is_ascii_digit() => {
                    let first = d.to_digit(10).unwrap_or(0) as usize;
                    let two_digit = chars
                        .get(i + 2)
                        .and_then(|c| c.to_digit(10))
                        .map(|second| first * 10 + second as usize);

                    // Two digits first, then fall back to one.
                    match two_digit {
                        Some(n) if (1..=group_count).contains(&n) => {
                            push(&mut parts, &mut literal, Part::Group(n));
                            i += 3;
                        }
                        _ if (1..=group_count).contains(&first) => {
                            push(&mut parts, &mut literal, Part::Group(first));
                            i += 2;
                        }
                        _ => {
                            literal.push('$');
                            literal.push(d);
                            i += 2;
                        }
                    }
                }
                _ => {
                    literal.push('$');
                    i += 1;
                }
            }
        }
        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }
        Self { parts }
    }

    /// Parse against the layout of an existing match.
    pub fn for_match(template: &str, result: &MatchResult) -> Self {
        Self::parse(template, result.group_count(), result.has_named_groups())
    }

    /// True when the template contains no `$` tokens.
    pub fn is_literal(&self) -> bool {
        self.parts.iter().all(|p| matches!(p, Part::Literal(_)))
    }

    /// Expand for one match, appending to `out`.
    pub fn expand_into(&self, result: &MatchResult, out: &mut String) {
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Matched => out.push_str(result.matched()),
                Part::LeftContext => out.push_str(result.left_context()),
                Part::RightContext => out.push_str(result.right_context()),
                Part::Group(n) => out.push_str(result.group(*n).unwrap_or_default()),
                Part::Named(name) => out.push_str(result.named(name).unwrap_or_default()),
            }
        }
    }

    /// Expand for one match.
    pub fn expand(&self, result: &MatchResult) -> String {
        let mut out = String::new();
        self.expand_into(result, &mut out);
        out
    }
}

/// Expand `template` for `result`.
pub fn evaluate(template: &str, result: &MatchResult) -> String {
    Replacement::for_match(template, result).expand(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn no_groups() -> MatchResult {
        // /h/ against "hello"
        MatchResult::new("hello", 0..1, Vec::new())
    }

    fn one_group() -> MatchResult {
        // /(h)/ against "hello"
        MatchResult::new("hello", 0..1, vec![Some(0..1)])
    }

    #[test]
    fn test_group_reference_without_groups_is_literal() {
        assert_eq!(evaluate("$1", &no_groups()), "$1");
        assert_eq!(evaluate("$1", &one_group()), "h");
    }

    #[test]
    fn test_special_tokens() {
        // /ll/ against "hello"
        let m = MatchResult::new("hello", 2..4, Vec::new());
        assert_eq!(evaluate("[$&]", &m), "[ll]");
        assert_eq!(evaluate("$`", &m), "he");
        assert_eq!(evaluate("$'", &m), "o");
        assert_eq!(evaluate("$$", &m), "$");
        assert_eq!(evaluate("$$1", &m), "$1");
        assert_eq!(evaluate("a$", &m), "a$");
        assert_eq!(evaluate("$x$", &m), "$x$");
        assert_eq!(evaluate("\\$&", &m), "\\ll");
    }

    #[test]
    fn test_two_digit_fallback() {
        // 11 groups, only the first and eleventh participate
        let mut captures = vec![None; 11];
        captures[0] = Some(0..1);
        captures[10] = Some(1..2);
        let m = MatchResult::new("ab", 0..2, captures);
        assert_eq!(evaluate("$11", &m), "b");
        assert_eq!(evaluate("$01", &m), "a");
        assert_eq!(evaluate("$2", &m), "");

        // With one group `$12` is `$1` then a literal `2`.
        assert_eq!(evaluate("$12", &one_group()), "h2");
        assert_eq!(evaluate("$0", &one_group()), "$0");
        assert_eq!(evaluate("$00", &one_group()), "$00");
    }

    #[test]
    fn test_named_groups() {
        let names: Arc<[Option<String>]> = Arc::from(vec![Some("first".to_string())]);
        let m = one_group().with_group_names(names);
        assert_eq!(evaluate("<$<first>>", &m), "<h>");
        assert_eq!(evaluate("$<missing>", &m), "");
        assert_eq!(evaluate("$<first", &m), "$<first");
        // Without named groups `$<` is literal.
        assert_eq!(evaluate("$<first>", &one_group()), "$<first>");
    }

    #[test]
    fn test_parse_once_expand_many() {
        let replacement = Replacement::parse("<$1>", 1, false);
        assert!(!replacement.is_literal());
        let a = MatchResult::new("xy", 0..1, vec![Some(0..1)]);
        let b = MatchResult::new("xy", 1..2, vec![None]);
        assert_eq!(replacement.expand(&a), "<x>");
        assert_eq!(replacement.expand(&b), "<>");
        assert!(Replacement::parse("plain", 1, false).is_literal());
    }
}
