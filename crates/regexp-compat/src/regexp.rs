//! `RegExp` instances: a shared compiled [`Pattern`] plus a `lastIndex`.
//!
//! Every search entry point runs through the same lastIndex state machine
//! (RegExpBuiltinExec) and records successful matches in the
//! [`RegExpContext`] passed to the call.

use std::fmt;
use std::sync::Arc;

use crate::context::RegExpContext;
use crate::flags::RegExpFlags;
use crate::match_result::MatchResult;
use crate::pattern::Pattern;
use crate::replace::Replacement;

/// Result of `String.prototype.match`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringMatch {
    /// Non-global: the `exec` result
    Single(MatchResult),
    /// Global: every matched substring
    All(Vec<String>),
}

/// A JavaScript `RegExp` object.
#[derive(Debug, Clone)]
pub struct RegExpInstance {
    pattern: Arc<Pattern>,
    last_index: usize,
}

impl RegExpInstance {
    /// Wrap a compiled pattern with `lastIndex` 0.
    pub fn new(pattern: Arc<Pattern>) -> Self {
        Self {
            pattern,
            last_index: 0,
        }
    }

    /// The compiled pattern.
    pub fn pattern(&self) -> &Arc<Pattern> {
        &self.pattern
    }

    /// `source`, escaped for display. An empty pattern reads `(?:)`.
    pub fn source(&self) -> String {
        let source = self.pattern.source();
        if source.is_empty() {
            return "(?:)".to_string();
        }
        escape_source(source)
    }

    /// `flags`
    pub fn flags(&self) -> RegExpFlags {
        self.pattern.flags()
    }

    /// `global`
    pub fn global(&self) -> bool {
        self.flags().global
    }

    /// `ignoreCase`
    pub fn ignore_case(&self) -> bool {
        self.flags().ignore_case
    }

    /// `multiline`
    pub fn multiline(&self) -> bool {
        self.flags().multiline
    }

    /// `dotAll`
    pub fn dot_all(&self) -> bool {
        self.flags().dot_all
    }

    /// `unicode`
    pub fn unicode(&self) -> bool {
        self.flags().unicode
    }

    /// `sticky`
    pub fn sticky(&self) -> bool {
        self.flags().sticky
    }

    /// `lastIndex`, a byte offset.
    pub fn last_index(&self) -> usize {
        self.last_index
    }

    /// Assign `lastIndex`.
    pub fn set_last_index(&mut self, index: usize) {
        self.last_index = index;
    }

    /// `RegExp.prototype.toString`: `/source/flags`.
    pub fn to_js_string(&self) -> String {
        format!("/{}/{}", self.source(), self.flags())
    }

    /// `RegExp.prototype.exec`.
    ///
    /// - neither global nor sticky: search from 0, `lastIndex` untouched
    /// - `lastIndex` past the end: reset to 0, no match
    /// - sticky: the match must start at `lastIndex`
    /// - success: `lastIndex` moves to the end of the match, or one
    ///   character on for an empty match
    /// - failure: `lastIndex` resets to 0
    pub fn exec(&mut self, ctx: &mut RegExpContext, subject: &str) -> Option<MatchResult> {
        let subject: Arc<str> = Arc::from(subject);
        self.exec_shared(ctx, &subject)
    }

    fn exec_shared(&mut self, ctx: &mut RegExpContext, subject: &Arc<str>) -> Option<MatchResult> {
        let flags = self.flags();
        let found = if !flags.uses_last_index() {
            self.pattern.find_at(subject, 0)
        } else {
            if self.last_index > subject.len() {
                self.last_index = 0;
                return None;
            }
            let start = ceil_char_boundary(subject, self.last_index);
            let found = if flags.sticky {
                self.pattern.find_exact(subject, start)
            } else {
                self.pattern.find_at(subject, start)
            };
            self.last_index = match &found {
                Some(m) => next_search_index(m),
                None => 0,
            };
            found
        };

        if let Some(m) = &found {
            ctx.record(m);
        }
        found
    }

    /// `RegExp.prototype.test`.
    pub fn test(&mut self, ctx: &mut RegExpContext, subject: &str) -> bool {
        self.exec(ctx, subject).is_some()
    }

    /// `String.prototype.search`: offset of the first match from 0.
    /// `lastIndex` is left as it was.
    pub fn search(&mut self, ctx: &mut RegExpContext, subject: &str) -> Option<usize> {
        let previous = self.last_index;
        self.last_index = 0;
        let found = self.exec(ctx, subject).map(|m| m.start());
        self.last_index = previous;
        found
    }

    /// `String.prototype.match`.
    pub fn match_string(&mut self, ctx: &mut RegExpContext, subject: &str) -> Option<StringMatch> {
        if !self.global() {
            return self.exec(ctx, subject).map(StringMatch::Single);
        }
        let matches = self.exec_all(ctx, subject);
        if matches.is_empty() {
            return None;
        }
        Some(StringMatch::All(
            matches.iter().map(|m| m.matched().to_string()).collect(),
        ))
    }

    /// `String.prototype.matchAll`: every match for a global pattern, at
    /// most one otherwise. Iterates on a private cursor starting at
    /// `lastIndex`; the instance's own `lastIndex` is not touched.
    pub fn match_all(&self, ctx: &mut RegExpContext, subject: &str) -> Vec<MatchResult> {
        let mut cursor = self.clone();
        if !self.global() {
            return cursor.exec(ctx, subject).into_iter().collect();
        }
        let subject: Arc<str> = Arc::from(subject);
        let mut out = Vec::new();
        while let Some(m) = cursor.exec_shared(ctx, &subject) {
            out.push(m);
        }
        out
    }

    /// `String.prototype.replace` with a `$`-template.
    pub fn replace(&mut self, ctx: &mut RegExpContext, subject: &str, template: &str) -> String {
        let replacement = Replacement::parse(
            template,
            self.pattern.group_count(),
            self.pattern.has_named_groups(),
        );
        self.replace_with(ctx, subject, |m| replacement.expand(m))
    }

    /// `String.prototype.replace` with a replacer function.
    pub fn replace_with<F>(
        &mut self,
        ctx: &mut RegExpContext,
        subject: &str,
        mut replacer: F,
    ) -> String
    where
        F: FnMut(&MatchResult) -> String,
    {
        let matches = if self.global() {
            self.exec_all(ctx, subject)
        } else {
            self.exec(ctx, subject).into_iter().collect()
        };
        if matches.is_empty() {
            return subject.to_string();
        }

        let mut out = String::with_capacity(subject.len());
        let mut next = 0;
        for m in &matches {
            if m.start() < next {
                continue;
            }
            out.push_str(&subject[next..m.start()]);
            out.push_str(&replacer(m));
            next = m.end();
        }
        out.push_str(&subject[next..]);
        out
    }

    /// `String.prototype.split` (RegExp.prototype[@@split]).
    ///
    /// Matching is sticky at each candidate split point regardless of the
    /// instance's own flags, and `lastIndex` is not touched. A match that
    /// ends where the previous piece ended never splits. Captures are
    /// spliced in, `None` for groups that did not participate.
    pub fn split(
        &self,
        ctx: &mut RegExpContext,
        subject: &str,
        limit: Option<u32>,
    ) -> Vec<Option<String>> {
        let limit = limit.unwrap_or(u32::MAX) as usize;
        let mut parts: Vec<Option<String>> = Vec::new();
        if limit == 0 {
            return parts;
        }

        let subject: Arc<str> = Arc::from(subject);
        if subject.is_empty() {
            match self.pattern.find_exact(&subject, 0) {
                Some(m) => ctx.record(&m),
                None => parts.push(Some(String::new())),
            }
            return parts;
        }

        let size = subject.len();
        let mut p = 0;
        let mut q = 0;
        while q < size {
            // Leftmost-first: no split point before the next match start.
            let Some(m) = self.pattern.find_at(&subject, q) else {
                break;
            };
            q = m.start();
            if q >= size {
                break;
            }
            ctx.record(&m);

            let e = m.end().min(size);
            if e == p {
                q = advance_char(&subject, q);
                continue;
            }

            parts.push(Some(subject[p..q].to_string()));
            if parts.len() >= limit {
                return parts;
            }
            for capture in m.captures() {
                parts.push(capture.map(str::to_string));
                if parts.len() >= limit {
                    return parts;
                }
            }
            p = e;
            q = p;
        }

        parts.push(Some(subject[p..].to_string()));
        parts
    }

    /// Global iteration from `lastIndex` 0 until `exec` fails, which leaves
    /// `lastIndex` at 0.
    fn exec_all(&mut self, ctx: &mut RegExpContext, subject: &str) -> Vec<MatchResult> {
        let subject: Arc<str> = Arc::from(subject);
        self.last_index = 0;
        let mut out = Vec::new();
        while let Some(m) = self.exec_shared(ctx, &subject) {
            out.push(m);
        }
        out
    }
}

impl fmt::Display for RegExpInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_js_string())
    }
}

/// Where the next search starts after `m`.
fn next_search_index(m: &MatchResult) -> usize {
    if m.is_empty() {
        advance_char(m.subject(), m.end())
    } else {
        m.end()
    }
}

/// One character past `index`, or `index + 1` at the end of `s`.
fn advance_char(s: &str, index: usize) -> usize {
    match s.get(index..).and_then(|rest| rest.chars().next()) {
        Some(ch) => index + ch.len_utf8(),
        None => index + 1,
    }
}

/// Smallest char boundary `>= index`.
fn ceil_char_boundary(s: &str, index: usize) -> usize {
    (index..s.len())
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(s.len())
}

/// Escape `/` and line terminators for the `source` getter.
fn escape_source(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut escaped = false;
    let mut in_class = false;
    for ch in source.chars() {
        match ch {
            '/' if !escaped && !in_class => out.push_str("\\/"),
            '\n' => out.push_str(if escaped { "n" } else { "\\n" }),
            '\r' => out.push_str(if escaped { "r" } else { "\\r" }),
            '\u{2028}' => out.push_str(if escaped { "u2028" } else { "\\u2028" }),
            '\u{2029}' => out.push_str(if escaped { "u2029" } else { "\\u2029" }),
            _ => out.push(ch),
        }
        if !escaped {
            match ch {
                '[' => in_class = true,
                ']' => in_class = false,
                _ => {}
            }
        }
        escaped = !escaped && ch == '\\';
    }
    out
}
