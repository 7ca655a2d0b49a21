//! URL matching patterns.

use std::fmt;

use regex::Regex;
use url::Url;

use crate::error::Result;

/// Pattern matched against the full URL of an intercepted request.
#[derive(Debug, Clone)]
pub enum UrlPattern {
    /// Exact URL, compared after normalisation.
    Exact(String),
    /// Unanchored regex search over the URL string.
    Regex(Regex),
}

impl UrlPattern {
    /// Exact-URL pattern.
    pub fn exact(url: impl Into<String>) -> Self {
        Self::Exact(url.into())
    }

    /// Compile a regex pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn regex(pattern: &str) -> Result<Self> {
        Ok(Self::Regex(Regex::new(pattern)?))
    }

    /// Check a request URL against this pattern.
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(expected) => normalize(expected) == normalize(url),
            Self::Regex(re) => re.is_match(url),
        }
    }

    /// The pattern source text.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Exact(url) => url,
            Self::Regex(re) => re.as_str(),
        }
    }
}

// Unparseable input is compared verbatim.
fn normalize(raw: &str) -> String {
    Url::parse(raw)
        .map(String::from)
        .unwrap_or_else(|_| raw.to_string())
}

impl PartialEq for UrlPattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(url) => f.write_str(url),
            Self::Regex(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl From<Regex> for UrlPattern {
    fn from(re: Regex) -> Self {
        Self::Regex(re)
    }
}

impl From<&str> for UrlPattern {
    fn from(url: &str) -> Self {
        Self::Exact(url.to_string())
    }
}

impl From<String> for UrlPattern {
    fn from(url: String) -> Self {
        Self::Exact(url)
    }
}
