//! Tag values
//!
//! A [`Tag`] is an immutable, normalized name. Normalization lowercases the
//! input so that `NUS`, `Nus` and `nus` all name the same tag. The reserved
//! wildcard `*` is never a valid tag; it only exists as [`ChildSelector::All`]
//! when removing hierarchy edges.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Reserved argument meaning "every child" in edge removal
pub const WILDCARD: &str = "*";

/// Maximum length of a tag name, in characters
pub const MAX_TAG_CHARS: usize = 64;

static TAG_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").unwrap());

/// A normalized tag name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag(String);

impl Tag {
    /// Validate and normalize a raw tag name
    pub fn new(raw: impl AsRef<str>) -> CoreResult<Self> {
        let trimmed = raw.as_ref().trim();

        if trimmed.is_empty() {
            return Err(CoreError::invalid_tag(trimmed, "tag names cannot be empty"));
        }
        if trimmed == WILDCARD {
            return Err(CoreError::invalid_tag(
                trimmed,
                "'*' is reserved and cannot be used as a tag name",
            ));
        }
        if trimmed.chars().count() > MAX_TAG_CHARS {
            return Err(CoreError::invalid_tag(
                trimmed,
                format!("tag names are limited to {} characters", MAX_TAG_CHARS),
            ));
        }
        if !TAG_NAME_RE.is_match(trimmed) {
            return Err(CoreError::invalid_tag(
                trimmed,
                "tag names may only contain letters, digits, '-' and '_' and must start with a letter or digit",
            ));
        }

        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Tag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Tag {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Which children of a parent an edge removal targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildSelector {
    /// A single child tag
    One(Tag),
    /// Every child of the parent (written `*` on the command line)
    All,
}

impl ChildSelector {
    /// Parse a removal argument, mapping the wildcard to [`ChildSelector::All`]
    pub fn parse(raw: &str) -> CoreResult<Self> {
        if raw.trim() == WILDCARD {
            Ok(Self::All)
        } else {
            Tag::new(raw).map(Self::One)
        }
    }
}

impl From<Tag> for ChildSelector {
    fn from(tag: Tag) -> Self {
        Self::One(tag)
    }
}

impl fmt::Display for ChildSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(tag) => tag.fmt(f),
            Self::All => f.write_str(WILDCARD),
        }
    }
}
