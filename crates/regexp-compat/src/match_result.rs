//! Successful match: offsets, captures and the subject they index into.

use std::ops::Range;
use std::sync::Arc;

use crate::translate::GroupRemap;

/// One successful search.
///
/// Offsets are byte offsets into [`subject`](Self::subject). A capture is
/// `None` when its group did not participate in the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    subject: Arc<str>,
    range: Range<usize>,
    captures: Vec<Option<Range<usize>>>,
    group_names: Arc<[Option<String>]>,
}

impl MatchResult {
    /// Build a result from raw ranges. `captures[k]` is group `k + 1`.
    pub fn new(
        subject: impl Into<Arc<str>>,
        range: Range<usize>,
        captures: Vec<Option<Range<usize>>>,
    ) -> Self {
        Self {
            subject: subject.into(),
            range,
            captures,
            group_names: Arc::from(Vec::new()),
        }
    }

    /// Attach group names (by ordinal - 1).
    pub fn with_group_names(mut self, names: Arc<[Option<String>]>) -> Self {
        self.group_names = names;
        self
    }

    /// Read a host match back into JavaScript numbering.
    pub(crate) fn from_host(
        subject: &Arc<str>,
        caps: &fancy_regex::Captures,
        remap: &GroupRemap,
        group_names: &Arc<[Option<String>]>,
    ) -> Option<Self> {
        let whole = caps.get(0)?;
        let captures = (1..=remap.group_count())
            .map(|ordinal| {
                remap
                    .host_index(ordinal)
                    .and_then(|host| caps.get(host))
                    .map(|m| m.start()..m.end())
            })
            .collect();
        Some(Self {
            subject: Arc::clone(subject),
            range: whole.start()..whole.end(),
            captures,
            group_names: Arc::clone(group_names),
        })
    }

    /// The whole subject string.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Shared handle to the subject.
    pub fn subject_arc(&self) -> &Arc<str> {
        &self.subject
    }

    /// Matched text.
    pub fn matched(&self) -> &str {
        &self.subject[self.range.clone()]
    }

    /// Start offset of the match.
    pub fn start(&self) -> usize {
        self.range.start
    }

    /// End offset of the match.
    pub fn end(&self) -> usize {
        self.range.end
    }

    /// Offsets of the match.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// True for a zero-length match.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Number of capturing groups (not counting the whole match).
    pub fn group_count(&self) -> usize {
        self.captures.len()
    }

    /// Group `n`; 0 is the whole match. `None` if the group did not
    /// participate or does not exist.
    pub fn group(&self, n: usize) -> Option<&str> {
        self.group_range(n).map(|r| &self.subject[r])
    }

    /// Offsets of group `n`.
    pub fn group_range(&self, n: usize) -> Option<Range<usize>> {
        if n == 0 {
            return Some(self.range.clone());
        }
        self.captures.get(n - 1).cloned().flatten()
    }

    /// Captures 1..=n in order.
    pub fn captures(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.captures
            .iter()
            .map(|c| c.clone().map(|r| &self.subject[r]))
    }

    /// Whether the pattern declared named groups.
    pub fn has_named_groups(&self) -> bool {
        self.group_names.iter().any(Option::is_some)
    }

    /// Named group. With duplicate names the participating one wins.
    pub fn named(&self, name: &str) -> Option<&str> {
        self.group_names
            .iter()
            .enumerate()
            .filter(|(_, group_name)| group_name.as_deref() == Some(name))
            .find_map(|(idx, _)| self.group(idx + 1))
    }

    /// `(name, capture)` pairs in declaration order, one per distinct name.
    pub fn named_groups(&self) -> Vec<(&str, Option<&str>)> {
        let mut out: Vec<(&str, Option<&str>)> = Vec::new();
        for name in self.group_names.iter().flatten() {
            if out.iter().any(|(n, _)| *n == name.as_str()) {
                continue;
            }
            out.push((name.as_str(), self.named(name)));
        }
        out
    }

    /// Subject text before the match.
    pub fn left_context(&self) -> &str {
        &self.subject[..self.range.start]
    }

    /// Subject text after the match.
    pub fn right_context(&self) -> &str {
        &self.subject[self.range.end..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MatchResult {
        // /(Html)(x)?Unit/ against "1234HtmlUnitxyz"
        MatchResult::new("1234HtmlUnitxyz", 4..12, vec![Some(4..8), None])
    }

    #[test]
    fn test_accessors() {
        let m = sample();
        assert_eq!(m.matched(), "HtmlUnit");
        assert_eq!(m.group(0), Some("HtmlUnit"));
        assert_eq!(m.group(1), Some("Html"));
        assert_eq!(m.group(2), None);
        assert_eq!(m.group(3), None);
        assert_eq!(m.group_count(), 2);
        assert_eq!(m.left_context(), "1234");
        assert_eq!(m.right_context(), "xyz");
        assert_eq!(m.captures().collect::<Vec<_>>(), vec![Some("Html"), None]);
    }

    #[test]
    fn test_named_with_duplicates() {
        let names: Arc<[Option<String>]> =
            Arc::from(vec![Some("y".to_string()), Some("y".to_string())]);
        let m = MatchResult::new("b", 0..1, vec![None, Some(0..1)]).with_group_names(names);
        assert!(m.has_named_groups());
        assert_eq!(m.named("y"), Some("b"));
        assert_eq!(m.named("z"), None);
        assert_eq!(m.named_groups(), vec![("y", Some("b"))]);
    }
}
