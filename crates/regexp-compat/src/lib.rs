//! # regexp-compat
//!
//! JavaScript `RegExp` semantics on top of a Rust backtracking regex engine
//! (`fancy-regex`).
//!
//! ## Pieces
//!
//! - **Translation**: JavaScript pattern text is rewritten into host syntax,
//!   resolving Annex B leniencies (stray brackets, octal escapes, forward
//!   references, unterminated groups) instead of rejecting them
//! - **Instances**: `lastIndex` with global and sticky behaviour, plus the
//!   `String.prototype` entry points built on `exec`
//! - **Legacy statics**: `RegExp.$1`..`$9`, `lastMatch` and friends, kept
//!   per script context
//! - **Replacement**: `$`-template expansion
//!
//! ```
//! use regexp_compat::RegExpContext;
//!
//! let mut ctx = RegExpContext::new();
//! let mut re = ctx.compile("(Html)Unit", "g").unwrap();
//! assert!(re.test(&mut ctx, "1234HtmlUnitxyz"));
//! assert_eq!(re.last_index(), 12);
//! assert_eq!(ctx.statics().dollar(1), Some("Html"));
//! assert_eq!(ctx.statics().left_context(), "1234");
//! ```

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod flags;
pub mod match_result;
pub mod pattern;
pub mod regexp;
pub mod replace;
pub mod statics;
pub mod translate;

pub use cache::PatternCache;
pub use config::RegExpConfig;
pub use context::{ContextHandle, ContextId, ContextRegistry, RegExpContext};
pub use error::{RegExpError, RegExpResult};
pub use flags::RegExpFlags;
pub use match_result::MatchResult;
pub use pattern::Pattern;
pub use regexp::{RegExpInstance, StringMatch};
pub use replace::{Replacement, evaluate};
pub use statics::GlobalMatchState;
pub use translate::{GroupRemap, TranslateOptions, Translation, escape_curly, translate, translate_with};
