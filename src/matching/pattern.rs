//! Path pattern compilation.
//!
//! # Syntax
//! - Segments are separated by `/`
//! - `:name` starts a placeholder; the name is `[A-Za-z0-9_]+` and any
//!   text after it in the segment is literal (`/files/:stem.json`)
//! - Everything else is matched literally
//!
//! # Design Decisions
//! - Compiled once per registration into a regex plus the ordered name list
//! - Case-insensitive and trailing-slash tolerant unless told otherwise
//! - Captured text is percent-decoded only after a full match

use regex::Regex;

use crate::context::value::decode_component;
use crate::context::Params;
use crate::error::{PatternError, PipeError};

/// Matching switches for [`PathPattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternOptions {
    /// Compare literal text case-sensitively.
    pub sensitive: bool,
    /// Reject a trailing slash the pattern does not have.
    pub strict: bool,
    /// Require the pattern to consume the whole path. When false the
    /// pattern matches any path it is a segment-aligned prefix of.
    pub end: bool,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self {
            sensitive: false,
            strict: false,
            end: true,
        }
    }
}

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
    names: Vec<String>,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        Self::with_options(pattern, PatternOptions::default())
    }

    pub fn with_options(pattern: &str, options: PatternOptions) -> Result<Self, PatternError> {
        let mut expr = String::with_capacity(pattern.len() + 16);
        let mut names: Vec<String> = Vec::with_capacity(pattern.matches(':').count());

        for (index, segment) in pattern.split('/').enumerate() {
            if index > 0 {
                expr.push('/');
            }
            let Some(rest) = segment.strip_prefix(':') else {
                expr.push_str(&regex::escape(segment));
                continue;
            };

            let name_len = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            let (name, literal) = rest.split_at(name_len);
            if name.is_empty() {
                return Err(PatternError::EmptyName(pattern.to_string()));
            }
            if names.iter().any(|n| n == name) {
                return Err(PatternError::DuplicateName {
                    pattern: pattern.to_string(),
                    name: name.to_string(),
                });
            }
            names.push(name.to_string());
            expr.push_str("([^/]+?)");
            expr.push_str(&regex::escape(literal));
        }

        if !options.strict {
            if expr.ends_with('/') {
                expr.pop();
            }
            expr.push_str("/?");
        }

        let anchored = format!(
            "{}^{}{}",
            if options.sensitive { "" } else { "(?i)" },
            expr,
            if options.end { "$" } else { "(?:/|$)" },
        );
        let regex = Regex::new(&anchored).map_err(|source| PatternError::Regex {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
            names,
        })
    }

    /// The pattern as registered.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder names, in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Match a raw (still percent-encoded) path.
    ///
    /// Returns `Ok(None)` when the path does not match, or when the number
    /// of captured groups differs from the number of placeholders.
    pub fn match_path(&self, path: &str) -> Result<Option<Params>, PipeError> {
        let Some(captures) = self.regex.captures(path) else {
            return Ok(None);
        };
        let raw: Vec<&str> = captures
            .iter()
            .skip(1)
            .flatten()
            .map(|m| m.as_str())
            .collect();
        if raw.len() != self.names.len() {
            return Ok(None);
        }

        let mut params = Params::with_capacity(raw.len());
        for (name, value) in self.names.iter().zip(raw) {
            params.insert(name.clone(), decode_component(value)?);
        }
        Ok(Some(params))
    }
}
