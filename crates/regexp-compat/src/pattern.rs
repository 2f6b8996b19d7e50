//! Compiled pattern: JavaScript source, flags and the host regex built from
//! the translation.

use std::fmt;
use std::sync::Arc;

use fancy_regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use crate::config::RegExpConfig;
use crate::error::{RegExpError, RegExpResult};
use crate::flags::RegExpFlags;
use crate::match_result::MatchResult;
use crate::translate::{GroupRemap, TranslateOptions, translate_with};

/// Immutable compiled pattern, shared between instances through `Arc`.
pub struct Pattern {
    source: String,
    flags: RegExpFlags,
    translated_source: String,
    regex: Regex,
    remap: GroupRemap,
    group_names: Arc<[Option<String>]>,
    group_count: usize,
}

impl Pattern {
    /// Translate and compile `source`.
    ///
    /// Fails only if the host rejects the translated text.
    pub fn compile(source: &str, flags: RegExpFlags, config: &RegExpConfig) -> RegExpResult<Self> {
        let translation = translate_with(source, TranslateOptions::from(&flags));
        let host = format!("{}{}", flags.host_prefix(), translation.source);

        let regex = RegexBuilder::new(&host)
            .backtrack_limit(config.backtrack_limit)
            .build()
            .map_err(|e| {
                warn!(source, host = %host, error = %e, "Host rejected translated pattern");
                RegExpError::syntax(source, e.to_string())
            })?;

        debug!(
            source,
            flags = %flags,
            host = %host,
            groups = translation.group_count,
            "Compiled pattern"
        );

        Ok(Self {
            source: source.to_string(),
            flags,
            translated_source: translation.source,
            regex,
            remap: translation.remap,
            group_names: Arc::from(translation.group_names),
            group_count: translation.group_count,
        })
    }

    /// Parse `flags` and compile with the default configuration.
    pub fn new(source: &str, flags: &str) -> RegExpResult<Self> {
        Self::compile(source, RegExpFlags::parse(flags)?, &RegExpConfig::default())
    }

    /// JavaScript source as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Flags the pattern was compiled with.
    pub fn flags(&self) -> RegExpFlags {
        self.flags
    }

    /// Host source, without the inline flag prefix.
    pub fn translated_source(&self) -> &str {
        &self.translated_source
    }

    /// Host source as compiled, inline flag prefix included.
    pub fn host_source(&self) -> &str {
        self.regex.as_str()
    }

    /// Number of JavaScript capturing groups.
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Group names by ordinal - 1.
    pub fn group_names(&self) -> &[Option<String>] {
        &self.group_names
    }

    /// Whether any capturing group is named.
    pub fn has_named_groups(&self) -> bool {
        self.group_names.iter().any(Option::is_some)
    }

    /// First match starting at or after byte offset `pos`.
    ///
    /// Text before `pos` stays visible to `^`, `\b` and lookbehind. A host
    /// runtime error (backtrack limit) counts as no match.
    pub fn find_at(&self, subject: &Arc<str>, pos: usize) -> Option<MatchResult> {
        if pos > subject.len() {
            return None;
        }
        match self.regex.captures_from_pos(subject, pos) {
            Ok(Some(caps)) => MatchResult::from_host(subject, &caps, &self.remap, &self.group_names),
            Ok(None) => None,
            Err(e) => {
                warn!(source = %self.source, pos, error = %e, "Match aborted");
                None
            }
        }
    }

    /// Match that starts exactly at `pos`.
    pub fn find_exact(&self, subject: &Arc<str>, pos: usize) -> Option<MatchResult> {
        self.find_at(subject, pos).filter(|m| m.start() == pos)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("source", &self.source)
            .field("flags", &self.flags.to_string())
            .field("host", &self.regex.as_str())
            .field("group_count", &self.group_count)
            .finish()
    }
}
