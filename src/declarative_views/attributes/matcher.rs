//! Detection of declarative attributes embedded in raw markup.
//!
//! Raw template strings have no element to carry `data-*` attributes, so they
//! are written inside an HTML comment instead:
//!
//! ```html
//! <!-- data-tag-name="ul" data-class-name='list' -->
//! <li>...</li>
//! ```
//!
//! Only the first comment containing at least one registered attribute
//! counts. Every assignment inside that comment is copied onto the synthetic
//! wrapper exactly as written.

use crate::error::{DeclarativeError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--(.*?)-->").expect("comment pattern is valid"));

static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("assignment pattern is valid")
});

/// The attribute-bearing comment found in a markup string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedAttributes {
    /// Byte range of the whole comment, delimiters included.
    pub range: Range<usize>,
    /// Name/value pairs in source order, values unescaped-as-written.
    pub attributes: Vec<(String, String)>,
}

/// Finds the first comment that declares a registered attribute.
#[derive(Debug, Clone)]
pub struct DetectionMatcher {
    registered: Option<Regex>,
}

impl DetectionMatcher {
    /// A matcher that never matches.
    pub fn empty() -> Self {
        Self { registered: None }
    }

    /// Builds a matcher for the given dashed attribute names.
    pub fn for_names<'a, I>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let alternatives: Vec<String> = names.into_iter().map(regex::escape).collect();
        if alternatives.is_empty() {
            return Ok(Self::empty());
        }

        let pattern = format!(
            r#"(?:^|\s)(?i:data-(?:{}))\s*=\s*(?:"[^"]*"|'[^']*')"#,
            alternatives.join("|")
        );
        let registered = Regex::new(&pattern).map_err(|e| {
            DeclarativeError::customization(format!(
                "Failed to build the attribute matcher: {}",
                e
            ))
        })?;
        Ok(Self {
            registered: Some(registered),
        })
    }

    /// Returns true if `text` contains a registered attribute assignment.
    pub fn declares_registered(&self, text: &str) -> bool {
        self.registered
            .as_ref()
            .is_some_and(|re| re.is_match(text))
    }

    /// Locates the first qualifying comment in `markup`.
    pub fn find(&self, markup: &str) -> Option<EmbeddedAttributes> {
        let caps = COMMENT
            .captures_iter(markup)
            .find(|caps| self.declares_registered(&caps[1]))?;

        let whole = caps.get(0)?;
        let attributes = ASSIGNMENT
            .captures_iter(&caps[1])
            .map(|a| {
                let value = a.get(2).or_else(|| a.get(3)).map_or("", |m| m.as_str());
                (a[1].to_ascii_lowercase(), value.to_string())
            })
            .collect();

        Some(EmbeddedAttributes {
            range: whole.range(),
            attributes,
        })
    }
}

impl Default for DetectionMatcher {
    fn default() -> Self {
        Self::empty()
    }
}
