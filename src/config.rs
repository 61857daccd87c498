//! Construction-time configuration consumed from the hosting proxy.
//!
//! The hosting filter chain loads and validates configuration; this crate
//! only reads the result. With the `config-serde` feature enabled the types
//! here derive `serde::Deserialize` so hosts can populate them directly from
//! their own configuration format.

use crate::rewrite::RewriteRule;

/// Configuration for one listener's response rewriters.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "config-serde", derive(serde::Deserialize))]
pub struct RewriterConfig {
    /// Whether advertised addresses need rewriting at all. When `false` the
    /// factory selects the pass-through variant and responses flow untouched.
    pub rewrite_enabled: bool,
    /// Address substitutions applied to metadata and coordinator responses.
    pub rules: Vec<RewriteRule>,
}

impl RewriterConfig {
    /// Configuration that disables rewriting entirely.
    #[must_use]
    pub fn disabled() -> Self { Self::default() }

    /// Configuration that rewrites according to `rules`.
    #[must_use]
    pub fn with_rules(rules: Vec<RewriteRule>) -> Self {
        Self {
            rewrite_enabled: true,
            rules,
        }
    }
}
