//! Path rewrite rule entity

use crate::errors::DomainError;

/// A prefix mount with its rewrite
///
/// A rule with prefix `/sms` and replacement `/api/sms` forwards
/// `/sms/status?id=7` as `/api/sms/status?id=7`. Prefixes match on segment
/// boundaries only: `/sms` never matches `/smsx`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    prefix: String,
    replacement: String,
}

impl RouteRule {
    /// Create a rule
    ///
    /// `prefix` must start with `/`. `replacement` is either empty (strip the
    /// prefix) or starts with `/`. Trailing slashes are trimmed from both.
    pub fn new(
        prefix: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let prefix = prefix.into();
        let replacement = replacement.into();

        if !prefix.starts_with('/') {
            return Err(DomainError::InvalidRoute(format!(
                "prefix '{prefix}' must start with '/'"
            )));
        }
        if !replacement.is_empty() && !replacement.starts_with('/') {
            return Err(DomainError::InvalidRoute(format!(
                "replacement '{replacement}' must be empty or start with '/'"
            )));
        }
        if prefix.contains(['?', '#']) || replacement.contains(['?', '#']) {
            return Err(DomainError::InvalidRoute(
                "prefix and replacement must not contain '?' or '#'".to_string(),
            ));
        }

        Ok(Self {
            prefix: prefix.trim_end_matches('/').to_string(),
            replacement: replacement.trim_end_matches('/').to_string(),
        })
    }

    /// Mount prefix; empty means the root mount
    pub fn prefix(&self) -> &str {
        if self.prefix.is_empty() { "/" } else { &self.prefix }
    }

    /// Replacement for the prefix
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Length of the matched stem, used to prefer the most specific rule
    pub fn specificity(&self) -> usize {
        self.prefix.len()
    }

    /// Whether `path` (without query) falls under this rule
    pub fn matches(&self, path: &str) -> bool {
        self.remainder(path).is_some()
    }

    /// Rewrite a path and re-attach its query string untouched
    ///
    /// Returns `None` when the rule does not match.
    pub fn rewrite(&self, path: &str, query: Option<&str>) -> Option<String> {
        let rest = self.remainder(path)?;

        let mut rewritten = format!("{}{rest}", self.replacement);
        if rewritten.is_empty() {
            rewritten.push('/');
        }
        if let Some(query) = query {
            rewritten.push('?');
            rewritten.push_str(query);
        }
        Some(rewritten)
    }

    fn remainder<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() || rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}
