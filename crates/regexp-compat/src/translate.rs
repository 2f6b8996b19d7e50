//! JavaScript pattern source → host (`fancy-regex`) pattern source.
//!
//! A single left-to-right scan with one token of lookahead. ECMAScript's
//! grammar is permissive (Annex B), the host's is not, so every construct the
//! host would reject or read differently is rewritten here. Nothing in this
//! module fails: ambiguous input always resolves to some host text.

use crate::flags::RegExpFlags;

/// Characters the host treats as metacharacters outside a class.
const HOST_META: &[char] = &[
    '\\', '.', '+', '*', '?', '(', ')', '|', '[', ']', '{', '}', '^', '$', '#', '&', '-', '~',
];

/// Characters that must be escaped inside a host class.
const HOST_CLASS_META: &[char] = &['\\', '[', ']', '^', '-', '&', '~'];

/// ECMAScript `.` outside dotAll mode: anything but a line terminator.
const JS_DOT: &str = r"[^\n\r\x{2028}\x{2029}]";

/// ECMAScript `[^]`: any character at all.
const MATCH_ANY: &str = r"[\s\S]";

/// ECMAScript `[]`: nothing.
const MATCH_NOTHING: &str = "(?!)";

/// Class body of ECMAScript `\w`; the host's is Unicode-aware.
const WORD_BODY: &str = "0-9A-Za-z_";

/// Class body of ECMAScript `\s`: WhiteSpace plus LineTerminator.
const SPACE_BODY: &str =
    r"\t\n\x0b\x0c\r\x20\xa0\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}";

/// `\b` over the ASCII word set.
const WORD_BOUNDARY: &str =
    "(?:(?<=[0-9A-Za-z_])(?![0-9A-Za-z_])|(?<![0-9A-Za-z_])(?=[0-9A-Za-z_]))";

/// `\B` over the ASCII word set.
const NOT_WORD_BOUNDARY: &str =
    "(?:(?<=[0-9A-Za-z_])(?=[0-9A-Za-z_])|(?<![0-9A-Za-z_])(?![0-9A-Za-z_]))";

/// Maps JavaScript capture ordinals onto host capture ordinals.
///
/// Index 0 is the whole match. `None` marks a group that exists in the
/// JavaScript numbering but has no host counterpart; it never participates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRemap(Vec<Option<usize>>);

impl GroupRemap {
    /// Identity mapping for `group_count` capturing groups.
    pub fn identity(group_count: usize) -> Self {
        Self((0..=group_count).map(Some).collect())
    }

    /// Host ordinal for a JavaScript ordinal.
    pub fn host_index(&self, ordinal: usize) -> Option<usize> {
        self.0.get(ordinal).copied().flatten()
    }

    /// Number of JavaScript capturing groups.
    pub fn group_count(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// True when no group was merged away.
    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, host)| *host == Some(i))
    }
}

/// Options that change how individual tokens are rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslateOptions {
    /// `s` flag: `.` is left to the host's `(?s)`
    pub dot_all: bool,
    /// `u` flag: `\u{...}` and `\p{...}` are escapes rather than literals
    pub unicode: bool,
    /// `i` flag: word sets are shielded from the host's Unicode case folding
    pub ignore_case: bool,
}

impl From<&RegExpFlags> for TranslateOptions {
    fn from(flags: &RegExpFlags) -> Self {
        Self {
            dot_all: flags.dot_all,
            ignore_case: flags.ignore_case,
            unicode: flags.unicode,
        }
    }
}

/// Output of [`translate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// Host pattern text (no inline flag prefix)
    pub source: String,
    /// JavaScript → host capture ordinals
    pub remap: GroupRemap,
    /// Number of JavaScript capturing groups
    pub group_count: usize,
    /// Name of each capturing group, by ordinal - 1
    pub group_names: Vec<Option<String>>,
    /// Whether the pattern contains numbered or named back-references
    pub has_back_references: bool,
}

impl Translation {
    /// Whether any capturing group is named.
    pub fn has_named_groups(&self) -> bool {
        self.group_names.iter().any(Option::is_some)
    }
}

/// Translate with default options (no `s`, no `u`).
pub fn translate(source: &str) -> Translation {
    translate_with(source, TranslateOptions::default())
}

/// Translate a JavaScript pattern into host syntax.
pub fn translate_with(source: &str, options: TranslateOptions) -> Translation {
    let chars: Vec<char> = source.chars().collect();
    let scan = scan_groups(&chars);
    Translator::new(&chars, scan, options).run()
}

/// Escape every `{`/`}` that does not form a `{n}`, `{n,}` or `{n,m}`
/// quantifier. Everything else is copied verbatim.
pub fn escape_curly(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;
    let mut in_class = false;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '\\' => {
                out.push(ch);
                if let Some(&next) = chars.get(i + 1) {
                    out.push(next);
                }
                i += 2;
                continue;
            }
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '{' if !in_class => {
                if let Some(len) = quantifier_len(&chars, i) {
                    out.extend(&chars[i..i + len]);
                    i += len;
                    continue;
                }
                out.push_str("\\{");
                i += 1;
                continue;
            }
            '}' if !in_class => {
                out.push_str("\\}");
                i += 1;
                continue;
            }
            _ => {}
        }
        out.push(ch);
        i += 1;
    }
    out
}

// ============================================================================
// Pre-scan
// ============================================================================

#[derive(Debug, Default)]
struct GroupScan {
    names: Vec<Option<String>>,
    has_back_references: bool,
}

impl GroupScan {
    fn has_named_groups(&self) -> bool {
        self.names.iter().any(Option::is_some)
    }

    /// First ordinal carrying `name`.
    fn ordinal_of(&self, name: &str) -> Option<usize> {
        self.names
            .iter()
            .position(|n| n.as_deref() == Some(name))
            .map(|idx| idx + 1)
    }
}

/// Collect capture group names and note whether back-references appear.
/// Classes and escapes are skipped with the same rules the translator uses so
/// the ordinals agree.
fn scan_groups(chars: &[char]) -> GroupScan {
    let mut scan = GroupScan::default();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                match chars.get(i + 1) {
                    Some('1'..='9') => scan.has_back_references = true,
                    Some('k') if chars.get(i + 2) == Some(&'<') => {
                        scan.has_back_references = true
                    }
                    _ => {}
                }
                i += 2;
            }
            '[' => match class_end(chars, i) {
                Some(end) => i = end + 1,
                None => i += 1,
            },
            '(' => {
                if chars.get(i + 1) != Some(&'?') {
                    scan.names.push(None);
                } else if let Some((name, _)) = named_group_at(chars, i) {
                    scan.names.push(Some(name));
                }
                i += 1;
            }
            _ => i += 1,
        }
    }

    // A back-reference needs at least one group to point at.
    scan.has_back_references &= !scan.names.is_empty();
    scan
}

/// Index of the `]` closing the class that opens at `start`, if any.
///
/// ECMAScript classes do not nest and a `]` directly after `[` or `[^`
/// closes the (empty) class.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;
    if chars.get(i) == Some(&'^') {
        i += 1;
    }
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            ']' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// `(?<name>` at `i`: the name and the index just past `>`.
fn named_group_at(chars: &[char], i: usize) -> Option<(String, usize)> {
    if chars.get(i + 1) != Some(&'?') || chars.get(i + 2) != Some(&'<') {
        return None;
    }
    let first = *chars.get(i + 3)?;
    if !(first.is_alphabetic() || first == '_' || first == '$') {
        return None;
    }
    let mut j = i + 4;
    while j < chars.len() && chars[j] != '>' {
        let c = chars[j];
        if !(c.is_alphanumeric() || c == '_' || c == '$') {
            return None;
        }
        j += 1;
    }
    if j >= chars.len() {
        return None;
    }
    Some((chars[i + 3..j].iter().collect(), j + 1))
}

/// Length of a `{n}`, `{n,}` or `{n,m}` quantifier starting at `i`.
fn quantifier_len(chars: &[char], i: usize) -> Option<usize> {
    let mut j = i + 1;
    let digits_start = j;
    while j < chars.len() && chars[j].is_ascii_digit() {
        j += 1;
    }
    if j == digits_start {
        return None;
    }
    if chars.get(j) == Some(&',') {
        j += 1;
        while j < chars.len() && chars[j].is_ascii_digit() {
            j += 1;
        }
    }
    (chars.get(j) == Some(&'}')).then(|| j + 1 - i)
}

/// Quantifier at `i`: whether it admits zero repetitions, and its length
/// including a lazy `?`.
fn quantifier_at(chars: &[char], i: usize) -> Option<(bool, usize)> {
    let (optional, len) = match chars.get(i)? {
        '*' | '?' => (true, 1),
        '+' => (false, 1),
        '{' => {
            let len = quantifier_len(chars, i)?;
            let min_is_zero = chars[i + 1..]
                .iter()
                .take_while(|c| c.is_ascii_digit())
                .all(|&c| c == '0');
            (min_is_zero, len)
        }
        _ => return None,
    };
    let lazy = chars.get(i + len) == Some(&'?');
    Some((optional, len + usize::from(lazy)))
}

/// Host spelling of a back-reference. A group that did not participate
/// matches empty in ECMAScript but fails the host's plain `\N`.
fn conditional_reference(host: usize) -> String {
    format!("(?({host})\\{host})")
}

/// Inline modifier group `(?ims-ims:` at `i`: length of the opener.
fn modifier_group_len(chars: &[char], i: usize) -> Option<usize> {
    let mut j = i + 2;
    while j < chars.len() && matches!(chars[j], 'i' | 'm' | 's') {
        j += 1;
    }
    if chars.get(j) == Some(&'-') {
        j += 1;
        while j < chars.len() && matches!(chars[j], 'i' | 'm' | 's') {
            j += 1;
        }
    }
    (chars.get(j) == Some(&':') && j > i + 2).then(|| j + 1 - i)
}

fn hex_value(chars: &[char], start: usize, len: usize) -> Option<u32> {
    if start + len > chars.len() {
        return None;
    }
    let digits = &chars[start..start + len];
    if !digits.iter().all(char::is_ascii_hexdigit) {
        return None;
    }
    u32::from_str_radix(&digits.iter().collect::<String>(), 16).ok()
}

fn push_literal(out: &mut String, ch: char) {
    if HOST_META.contains(&ch) {
        out.push('\\');
    }
    out.push(ch);
}

fn push_class_literal(out: &mut String, ch: char) {
    if HOST_CLASS_META.contains(&ch) {
        out.push('\\');
    }
    out.push(ch);
}

fn hex_escape(cp: u32) -> String {
    if cp <= 0xFF {
        format!("\\x{cp:02x}")
    } else {
        format!("\\x{{{cp:X}}}")
    }
}

// ============================================================================
// Escapes
// ============================================================================

/// A decoded escape sequence (the part after `\`).
#[derive(Debug)]
enum Escape {
    /// Numbered or named reference to a capturing group
    BackReference(usize),
    /// Reference that always matches empty (forward or unknown name)
    Empty,
    /// One character, already in host spelling
    Char(String),
    /// A character set such as `\d` or `\p{L}`, in class-body spelling
    Set { standalone: String, in_class: String },
    /// Assertion (`\b`, `\B`); only valid outside a class
    Assertion(String),
    /// A code unit no Rust string can contain (lone surrogate)
    Unmatchable,
}

/// Legacy octal escape at `i` (first digit 0-7): value and digit count.
fn legacy_octal(chars: &[char], i: usize) -> (u32, usize) {
    let first = chars[i].to_digit(8).unwrap_or(0);
    let max_len = if first <= 3 { 3 } else { 2 };
    let mut value = first;
    let mut len = 1;
    while len < max_len {
        match chars.get(i + len).and_then(|c| c.to_digit(8)) {
            Some(d) => {
                value = value * 8 + d;
                len += 1;
            }
            None => break,
        }
    }
    (value, len)
}

// ============================================================================
// Translator
// ============================================================================

#[derive(Debug)]
struct Frame {
    /// JavaScript ordinal for capturing groups
    ordinal: Option<usize>,
    /// Output index of the opener
    open_at: usize,
    /// Output index just past the opener
    body_start: usize,
    /// Source text of the opener, for demotion to a literal
    opener: String,
    /// `(?=` or `(?!`, which Annex B lets a quantifier follow
    lookahead: bool,
    /// Capturing groups opened before this one
    opened_before: usize,
}

/// An emitted back-reference, rewritten at the end if groups were demoted.
#[derive(Debug)]
struct EmittedRef {
    at: usize,
    len: usize,
    ordinal: usize,
}

struct Translator<'a> {
    chars: &'a [char],
    scan: GroupScan,
    options: TranslateOptions,
    out: String,
    /// Capturing groups opened so far
    opened: usize,
    frames: Vec<Frame>,
    refs: Vec<EmittedRef>,
}

impl<'a> Translator<'a> {
    fn new(chars: &'a [char], scan: GroupScan, options: TranslateOptions) -> Self {
        Self {
            chars,
            scan,
            options,
            out: String::with_capacity(chars.len() + 8),
            opened: 0,
            frames: Vec::new(),
            refs: Vec::new(),
        }
    }

    fn peek(&self, i: usize) -> Option<char> {
        self.chars.get(i).copied()
    }

    fn emit(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn emit_literal(&mut self, ch: char) {
        let mut buf = String::with_capacity(2);
        push_literal(&mut buf, ch);
        self.emit(&buf);
    }

    fn is_open(&self, ordinal: usize) -> bool {
        self.frames.iter().any(|f| f.ordinal == Some(ordinal))
    }

    fn run(mut self) -> Translation {
        let mut i = 0;
        while i < self.chars.len() {
            i = match self.chars[i] {
                '\\' => self.escape(i),
                '[' => self.class(i),
                '(' => self.open_group(i),
                ')' => self.close_group(i),
                '{' => match quantifier_len(self.chars, i) {
                    Some(len) => {
                        let text: String = self.chars[i..i + len].iter().collect();
                        self.emit(&text);
                        i + len
                    }
                    None => {
                        self.emit("\\{");
                        i + 1
                    }
                },
                '}' => {
                    self.emit("\\}");
                    i + 1
                }
                ']' => {
                    self.emit("\\]");
                    i + 1
                }
                '.' => {
                    let dot = if self.options.dot_all { "." } else { JS_DOT };
                    self.emit(dot);
                    i + 1
                }
                c @ ('^' | '$' | '|' | '*' | '+' | '?') => {
                    self.emit(c.encode_utf8(&mut [0; 4]));
                    i + 1
                }
                c => {
                    self.emit_literal(c);
                    i + 1
                }
            };
        }
        self.finish()
    }

    /// Decode the escape whose backslash is at `i`. Returns the escape and
    /// the index after it. `None` means a trailing or `\c`-style lone
    /// backslash that stands for itself.
    fn decode_escape(&self, i: usize, in_class: bool) -> (Option<Escape>, usize) {
        let Some(next) = self.peek(i + 1) else {
            return (None, i + 1);
        };
        let after = i + 2;
        let escape = match next {
            '1'..='9' => {
                let mut j = i + 1;
                let mut value: usize = 0;
                while let Some(d) = self.peek(j).and_then(|c| c.to_digit(10)) {
                    value = value.saturating_mul(10).saturating_add(d as usize);
                    j += 1;
                }
                if value <= self.opened {
                    return (Some(Escape::BackReference(value)), j);
                }
                if matches!(next, '8' | '9') {
                    // Identity escape; the digits after it are literals.
                    return (Some(Escape::Char(next.to_string())), after);
                }
                let (value, len) = legacy_octal(self.chars, i + 1);
                return (Some(Escape::Char(hex_escape(value))), i + 1 + len);
            }
            '0' => {
                let (value, len) = legacy_octal(self.chars, i + 1);
                return (Some(Escape::Char(hex_escape(value))), i + 1 + len);
            }
            'b' if in_class => Escape::Char(hex_escape(0x08)),
            'B' if in_class => Escape::Char("B".to_string()),
            'b' | 'B' => {
                let assertion = if next == 'b' { WORD_BOUNDARY } else { NOT_WORD_BOUNDARY };
                Escape::Assertion(self.fold_safe(assertion))
            }
            'd' => self.shorthand("0-9", false),
            'D' => self.shorthand("0-9", true),
            'w' => self.shorthand(WORD_BODY, false),
            'W' => self.shorthand(WORD_BODY, true),
            's' => self.shorthand(SPACE_BODY, false),
            'S' => self.shorthand(SPACE_BODY, true),
            'f' | 'n' | 'r' | 't' => Escape::Char(format!("\\{next}")),
            'v' => Escape::Char(hex_escape(0x0B)),
            'x' => match hex_value(self.chars, i + 2, 2) {
                Some(_) => {
                    let text: String = self.chars[i..i + 4].iter().collect();
                    return (Some(Escape::Char(text)), i + 4);
                }
                None => Escape::Char("x".to_string()),
            },
            'u' => return self.decode_unicode_escape(i),
            'c' => {
                let control = self
                    .peek(i + 2)
                    .filter(|c| c.is_ascii_alphabetic() || (in_class && (c.is_ascii_digit() || *c == '_')));
                match control {
                    Some(c) => {
                        return (Some(Escape::Char(hex_escape(c as u32 % 32))), i + 3);
                    }
                    // `\c` without a control letter: the backslash is literal
                    None => return (None, i + 1),
                }
            }
            'k' if !in_class && self.scan.has_named_groups() => {
                return self.decode_named_reference(i);
            }
            'p' | 'P' if self.options.unicode && self.peek(i + 2) == Some('{') => {
                let close = self.chars[i + 2..].iter().position(|&c| c == '}');
                match close {
                    Some(len) => {
                        let end = i + 2 + len + 1;
                        let text: String = self.chars[i..end].iter().collect();
                        return (
                            Some(Escape::Set {
                                standalone: text.clone(),
                                in_class: text,
                            }),
                            end,
                        );
                    }
                    None => Escape::Char(next.to_string()),
                }
            }
            c if c.is_ascii_alphabetic() => Escape::Char(c.to_string()),
            c => {
                let mut text = String::with_capacity(2);
                if in_class {
                    push_class_literal(&mut text, c);
                } else {
                    push_literal(&mut text, c);
                }
                Escape::Char(text)
            }
        };
        (Some(escape), after)
    }

    /// An ASCII or ECMAScript-defined set spelled out for the host, whose
    /// shorthands are Unicode-aware. Negated sets nest inside classes.
    fn shorthand(&self, body: &str, negated: bool) -> Escape {
        let class = if negated { format!("[^{body}]") } else { format!("[{body}]") };
        let in_class = if negated { class.clone() } else { body.to_string() };
        let standalone = if body == WORD_BODY { self.fold_safe(&class) } else { class };
        Escape::Set { standalone, in_class }
    }

    /// Under `i` the host folds `k` onto the Kelvin sign and `s` onto the
    /// long s. ECMAScript only does so in unicode mode.
    fn fold_safe(&self, text: &str) -> String {
        if self.options.ignore_case && !self.options.unicode {
            format!("(?-i:{text})")
        } else {
            text.to_string()
        }
    }

    /// `\uHHHH`, a surrogate pair of them, or `\u{H...}` in unicode mode.
    fn decode_unicode_escape(&self, i: usize) -> (Option<Escape>, usize) {
        if self.options.unicode && self.peek(i + 2) == Some('{') {
            let digits_start = i + 3;
            let mut j = digits_start;
            while self.peek(j).is_some_and(|c| c.is_ascii_hexdigit()) {
                j += 1;
            }
            if j > digits_start && self.peek(j) == Some('}') {
                if let Some(cp) = hex_value(self.chars, digits_start, j - digits_start) {
                    let escape = match char::from_u32(cp) {
                        Some(_) => Escape::Char(hex_escape(cp)),
                        None => Escape::Unmatchable,
                    };
                    return (Some(escape), j + 1);
                }
            }
            return (Some(Escape::Char("u".to_string())), i + 2);
        }

        let Some(unit) = hex_value(self.chars, i + 2, 4) else {
            return (Some(Escape::Char("u".to_string())), i + 2);
        };
        if (0xD800..=0xDBFF).contains(&unit)
            && self.peek(i + 6) == Some('\\')
            && self.peek(i + 7) == Some('u')
        {
            if let Some(low) = hex_value(self.chars, i + 8, 4) {
                if (0xDC00..=0xDFFF).contains(&low) {
                    let cp = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    return (Some(Escape::Char(hex_escape(cp))), i + 12);
                }
            }
        }
        let escape = match char::from_u32(unit) {
            Some(_) => Escape::Char(hex_escape(unit)),
            None => Escape::Unmatchable,
        };
        (Some(escape), i + 6)
    }

    /// `\k<name>`; only called when the pattern has named groups.
    fn decode_named_reference(&self, i: usize) -> (Option<Escape>, usize) {
        if self.peek(i + 2) != Some('<') {
            return (Some(Escape::Char("k".to_string())), i + 2);
        }
        let Some(len) = self.chars[i + 3..].iter().position(|&c| c == '>') else {
            return (Some(Escape::Char("k".to_string())), i + 2);
        };
        let name: String = self.chars[i + 3..i + 3 + len].iter().collect();
        let end = i + 3 + len + 1;
        match self.scan.ordinal_of(&name) {
            Some(ordinal) if ordinal <= self.opened => (Some(Escape::BackReference(ordinal)), end),
            Some(_) => (Some(Escape::Empty), end),
            None => (Some(Escape::Char("k".to_string())), i + 2),
        }
    }

    fn escape(&mut self, i: usize) -> usize {
        let (escape, next) = self.decode_escape(i, false);
        match escape {
            None => self.emit("\\\\"),
            Some(Escape::BackReference(ordinal)) => return self.back_reference(ordinal, next),
            Some(Escape::Empty) => return self.zero_width("", next),
            Some(Escape::Char(text)) => self.emit(&text),
            Some(Escape::Set { standalone, .. }) => self.emit(&standalone),
            Some(Escape::Assertion(text)) => self.emit(&text),
            Some(Escape::Unmatchable) => return self.zero_width(MATCH_NOTHING, next),
        }
        next
    }

    /// A reference to a group that is still open matches empty in
    /// ECMAScript; the host would fail it, so it is dropped.
    fn back_reference(&mut self, ordinal: usize, next: usize) -> usize {
        if self.is_open(ordinal) {
            return self.zero_width("", next);
        }
        let text = conditional_reference(ordinal);
        self.refs.push(EmittedRef {
            at: self.out.len(),
            len: text.len(),
            ordinal,
        });
        self.emit(&text);
        next
    }

    /// Emit an atom that consumes nothing. The host refuses to repeat such
    /// atoms, so a following quantifier is folded in: with zero repetitions
    /// allowed the atom matches empty, otherwise it stands alone.
    fn zero_width(&mut self, text: &str, next: usize) -> usize {
        match quantifier_at(self.chars, next) {
            Some((true, len)) => next + len,
            Some((false, len)) => {
                self.emit(text);
                next + len
            }
            None => {
                self.emit(text);
                next
            }
        }
    }

    fn open_group(&mut self, i: usize) -> usize {
        let open_at = self.out.len();
        if self.peek(i + 1) != Some('?') {
            self.opened += 1;
            self.emit("(");
            self.push_frame(Some(self.opened), open_at, "(".to_string());
            return i + 1;
        }

        if let Some((name, end)) = named_group_at(self.chars, i) {
            // Names live in the translation's table; the host group is plain.
            self.opened += 1;
            self.emit("(");
            self.push_frame(Some(self.opened), open_at, format!("(?<{name}>"));
            return end;
        }

        let opener_len = match (self.peek(i + 2), self.peek(i + 3)) {
            (Some(':' | '=' | '!'), _) => Some(3),
            (Some('<'), Some('=' | '!')) => Some(4),
            _ => modifier_group_len(self.chars, i),
        };
        match opener_len {
            Some(len) => {
                let opener: String = self.chars[i..i + len].iter().collect();
                self.emit(&opener);
                self.push_frame(None, open_at, opener);
                i + len
            }
            None => {
                // `(?` that starts nothing the host knows: keep it inert.
                self.emit("\\(\\?");
                i + 2
            }
        }
    }

    fn push_frame(&mut self, ordinal: Option<usize>, open_at: usize, opener: String) {
        let lookahead = opener == "(?=" || opener == "(?!";
        let opened_before = self.opened - usize::from(ordinal.is_some());
        self.frames.push(Frame {
            ordinal,
            open_at,
            body_start: self.out.len(),
            opener,
            lookahead,
            opened_before,
        });
    }

    fn close_group(&mut self, i: usize) -> usize {
        let Some(frame) = self.frames.pop() else {
            self.emit("\\)");
            return i + 1;
        };
        if frame.lookahead {
            if let Some((optional, len)) = quantifier_at(self.chars, i + 1) {
                self.quantified_lookahead(&frame, optional);
                return i + 1 + len;
            }
        }
        if frame.ordinal.is_none() && frame.body_start == self.out.len() {
            // `(?:)*`: repeating nothing is nothing.
            if let Some((_, len)) = quantifier_at(self.chars, i + 1) {
                self.out.truncate(frame.open_at);
                return i + 1 + len;
            }
        }

        let optional = frame.ordinal.is_some()
            && self.scan.has_back_references
            && self.peek(i + 1) == Some('?');
        if !optional {
            self.emit(")");
            return i + 1;
        }

        let lazy = self.peek(i + 2) == Some('?');
        let next = if lazy { i + 3 } else { i + 2 };
        if frame.body_start == self.out.len() {
            self.emit(")");
            return next;
        }

        // `(x)?` → `((?:x)?)`: optionality binds to the content and the
        // group itself always participates.
        const INNER: &str = "(?:";
        self.out.insert_str(frame.body_start, INNER);
        for r in self.refs.iter_mut().filter(|r| r.at >= frame.body_start) {
            r.at += INNER.len();
        }
        self.emit(if lazy { ")??)" } else { ")?)" });
        next
    }

    /// Annex B allows a quantifier after a lookahead, the host does not.
    /// Repeating an assertion is the assertion itself. When zero
    /// repetitions are allowed the empty iteration is rejected, so the
    /// assertion never takes part and its groups never participate.
    fn quantified_lookahead(&mut self, frame: &Frame, optional: bool) {
        if !optional {
            self.emit(")");
            return;
        }
        if self.opened == frame.opened_before {
            self.out.truncate(frame.open_at);
            self.refs.retain(|r| r.at < frame.open_at);
            return;
        }
        // Keep the inner groups numbered but never enter them.
        const NEVER: &str = "(?:(?!)";
        self.out.insert_str(frame.open_at, NEVER);
        for r in self.refs.iter_mut().filter(|r| r.at >= frame.open_at) {
            r.at += NEVER.len();
        }
        self.emit(")|)");
    }

    fn class(&mut self, start: usize) -> usize {
        let Some(end) = class_end(self.chars, start) else {
            // Unterminated: the bracket (and a following caret) are literals.
            self.emit("\\[");
            if self.peek(start + 1) == Some('^') {
                self.emit("\\^");
                return start + 2;
            }
            return start + 1;
        };

        let negated = self.peek(start + 1) == Some('^');
        let body_start = if negated { start + 2 } else { start + 1 };
        let items = self.class_items(body_start, end);

        let mut body = String::new();
        let mut prev_is_char = false;
        let mut k = 0;
        while k < items.len() {
            match &items[k] {
                ClassItem::Char(text) => {
                    body.push_str(text);
                    prev_is_char = true;
                }
                ClassItem::Set(text) => {
                    body.push_str(text);
                    prev_is_char = false;
                }
                ClassItem::Dash => {
                    // A dash is itself a valid range endpoint: `[!--]`.
                    let range_end = match items.get(k + 1) {
                        Some(ClassItem::Char(text)) => Some(text.as_str()),
                        Some(ClassItem::Dash) => Some("\\-"),
                        _ => None,
                    };
                    if let (true, Some(end)) = (prev_is_char, range_end) {
                        body.push('-');
                        body.push_str(end);
                        k += 1;
                        // A range endpoint cannot start another range.
                        prev_is_char = false;
                    } else {
                        body.push_str("\\-");
                        prev_is_char = true;
                    }
                }
            }
            k += 1;
        }

        let text = match (body.is_empty(), negated) {
            (true, true) => MATCH_ANY.to_string(),
            (true, false) => return self.zero_width(MATCH_NOTHING, end + 1),
            (false, true) => format!("[^{body}]"),
            (false, false) => format!("[{body}]"),
        };
        self.emit(&text);
        end + 1
    }

    fn class_items(&self, start: usize, end: usize) -> Vec<ClassItem> {
        let mut items = Vec::new();
        let mut i = start;
        while i < end {
            let ch = self.chars[i];
            if ch == '-' {
                items.push(ClassItem::Dash);
                i += 1;
                continue;
            }
            if ch != '\\' {
                let mut text = String::with_capacity(2);
                push_class_literal(&mut text, ch);
                items.push(ClassItem::Char(text));
                i += 1;
                continue;
            }
            let (escape, next) = self.decode_escape(i, true);
            match escape {
                None => items.push(ClassItem::Char("\\\\".to_string())),
                // Back-references mean nothing inside a class and are dropped.
                Some(Escape::BackReference(_) | Escape::Empty | Escape::Unmatchable) => {}
                Some(Escape::Char(text)) => items.push(ClassItem::Char(text)),
                Some(Escape::Set { in_class, .. }) => items.push(ClassItem::Set(in_class)),
                Some(Escape::Assertion(text)) => items.push(ClassItem::Char(text)),
            }
            i = next.min(end);
        }
        items
    }

    /// Demote groups left open at the end to literals and renumber the
    /// back-references emitted after them.
    fn finish(mut self) -> Translation {
        let group_count = self.opened;
        let mut remap = GroupRemap::identity(group_count);

        if !self.frames.is_empty() {
            let demoted: Vec<usize> = self.frames.iter().filter_map(|f| f.ordinal).collect();
            let mut host = 0;
            for ordinal in 1..=group_count {
                if demoted.contains(&ordinal) {
                    remap.0[ordinal] = None;
                } else {
                    host += 1;
                    remap.0[ordinal] = Some(host);
                }
            }

            let mut edits: Vec<(usize, usize, String)> = Vec::new();
            for frame in &self.frames {
                let mut literal = String::with_capacity(frame.opener.len() * 2);
                for ch in frame.opener.chars() {
                    push_literal(&mut literal, ch);
                }
                edits.push((frame.open_at, frame.body_start, literal));
            }
            for r in &self.refs {
                let text = match remap.host_index(r.ordinal) {
                    Some(host) => conditional_reference(host),
                    None => "(?:)".to_string(),
                };
                edits.push((r.at, r.at + r.len, text));
            }
            edits.sort_by(|a, b| b.0.cmp(&a.0));
            for (from, to, text) in edits {
                self.out.replace_range(from..to, &text);
            }
        }

        Translation {
            source: self.out,
            remap,
            group_count,
            group_names: self.scan.names,
            has_back_references: self.scan.has_back_references,
        }
    }
}

#[derive(Debug)]
enum ClassItem {
    Char(String),
    Set(String),
    Dash,
}
