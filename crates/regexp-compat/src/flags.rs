//! RegExp flags (`dgimsuy`)

use std::fmt;
use std::str::FromStr;

use crate::error::{RegExpError, RegExpResult};

/// Parsed RegExp flags. Immutable once a pattern is compiled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RegExpFlags {
    /// `d`: record match indices
    pub has_indices: bool,
    /// `g`: iterate from `lastIndex`
    pub global: bool,
    /// `i`: case-insensitive
    pub ignore_case: bool,
    /// `m`: `^`/`$` match at line terminators
    pub multiline: bool,
    /// `s`: `.` matches line terminators
    pub dot_all: bool,
    /// `u`: unicode mode
    pub unicode: bool,
    /// `y`: match only at `lastIndex`
    pub sticky: bool,
}

impl RegExpFlags {
    /// Parse a flag string. Unknown and repeated flags are rejected.
    pub fn parse(flags: &str) -> RegExpResult<Self> {
        let mut out = Self::default();
        for ch in flags.chars() {
            let slot = match ch {
                'd' => &mut out.has_indices,
                'g' => &mut out.global,
                'i' => &mut out.ignore_case,
                'm' => &mut out.multiline,
                's' => &mut out.dot_all,
                'u' => &mut out.unicode,
                'y' => &mut out.sticky,
                _ => return Err(RegExpError::invalid_flags(flags)),
            };
            if *slot {
                return Err(RegExpError::invalid_flags(flags));
            }
            *slot = true;
        }
        Ok(out)
    }

    /// Whether searches read and write `lastIndex`.
    pub fn uses_last_index(&self) -> bool {
        self.global || self.sticky
    }

    /// Inline flag group the host pattern is prefixed with, e.g. `(?im)`.
    ///
    /// `g`, `y`, `d` and `u` are handled by the executor and translator and
    /// have no host counterpart.
    pub(crate) fn host_prefix(&self) -> String {
        let mut inline = String::new();
        if self.ignore_case {
            inline.push('i');
        }
        if self.multiline {
            inline.push('m');
        }
        if self.dot_all {
            inline.push('s');
        }
        if inline.is_empty() {
            inline
        } else {
            format!("(?{inline})")
        }
    }
}

impl FromStr for RegExpFlags {
    type Err = RegExpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RegExpFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs = [
            (self.has_indices, 'd'),
            (self.global, 'g'),
            (self.ignore_case, 'i'),
            (self.multiline, 'm'),
            (self.dot_all, 's'),
            (self.unicode, 'u'),
            (self.sticky, 'y'),
        ];
        for (set, ch) in pairs {
            if set {
                write!(f, "{ch}")?;
            }
        }
        Ok(())
    }
}
