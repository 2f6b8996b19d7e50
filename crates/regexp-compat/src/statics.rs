//! Legacy RegExp static properties (Annex B `RegExp.$1`..`$9` and friends).
//!
//! The state belongs to one script context. It is overwritten by every
//! successful search in that context and never reset.

use crate::match_result::MatchResult;

/// Number of `$n` slots exposed on the constructor.
pub const LEGACY_GROUP_SLOTS: usize = 9;

/// Legacy static property names, aliases resolved by [`GlobalMatchState::get`].
pub const LEGACY_PROPERTY_NAMES: &[&str] = &[
    "input",
    "$_",
    "lastMatch",
    "$&",
    "lastParen",
    "$+",
    "leftContext",
    "$`",
    "rightContext",
    "$'",
    "$1",
    "$2",
    "$3",
    "$4",
    "$5",
    "$6",
    "$7",
    "$8",
    "$9",
];

/// Last successful match as seen through `RegExp.lastMatch`, `RegExp.$1`...
///
/// Every slot reads as `""` until a match happens, and a group that did not
/// participate reads as `""` rather than `undefined`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalMatchState {
    input: String,
    last_match: String,
    last_paren: String,
    left_context: String,
    right_context: String,
    groups: [String; LEGACY_GROUP_SLOTS],
}

impl GlobalMatchState {
    /// Fresh state, every slot empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful match.
    pub fn update(&mut self, result: &MatchResult) {
        self.input.clear();
        self.input.push_str(result.subject());
        self.last_match = result.matched().to_string();
        // Highest-numbered group that participated.
        self.last_paren = (1..=result.group_count())
            .rev()
            .find_map(|n| result.group(n))
            .unwrap_or_default()
            .to_string();
        self.left_context = result.left_context().to_string();
        self.right_context = result.right_context().to_string();
        for (slot, n) in self.groups.iter_mut().zip(1..) {
            *slot = result.group(n).unwrap_or_default().to_string();
        }
    }

    /// `RegExp.input` / `RegExp.$_`
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Writable `RegExp.input`.
    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// `RegExp.lastMatch` / `RegExp["$&"]`
    pub fn last_match(&self) -> &str {
        &self.last_match
    }

    /// `RegExp.lastParen` / `RegExp["$+"]`
    pub fn last_paren(&self) -> &str {
        &self.last_paren
    }

    /// `RegExp.leftContext` / ``RegExp["$`"]``
    pub fn left_context(&self) -> &str {
        &self.left_context
    }

    /// `RegExp.rightContext` / `RegExp["$'"]`
    pub fn right_context(&self) -> &str {
        &self.right_context
    }

    /// `RegExp.$n` for `n` in `1..=9`; `None` for any other `n`.
    pub fn dollar(&self, n: usize) -> Option<&str> {
        if n == 0 {
            return None;
        }
        self.groups.get(n - 1).map(String::as_str)
    }

    /// Resolve a legacy property by name or alias.
    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "input" | "$_" => self.input(),
            "lastMatch" | "$&" => self.last_match(),
            "lastParen" | "$+" => self.last_paren(),
            "leftContext" | "$`" => self.left_context(),
            "rightContext" | "$'" => self.right_context(),
            _ => {
                let digit = name.strip_prefix('$')?;
                if digit.len() != 1 {
                    return None;
                }
                return self.dollar(digit.parse().ok()?);
            }
        };
        Some(value)
    }
}
