//! Per-struct field naming tables.
//!
//! By default every member serde emits for a top-level struct becomes a form
//! field named after its serde name, and `#[serde(skip)]` keeps a member out of
//! the form. When the form names must differ from the serde names (which are
//! still used whenever the struct is embedded as JSON), register a
//! [`FieldTags`] table for the struct in [`EncoderOptions`](crate::EncoderOptions).
//! With a table registered:
//!
//! - a member tagged with a name is encoded under that name
//! - a member tagged `-` is excluded
//! - a member missing from the table (or tagged with an empty name) is skipped
//!
//! ## Examples
//!
//! ```rust
//! use serde_multipart::{FieldTag, FieldTags};
//!
//! let tags = FieldTags::new()
//!     .tag("user_name", "username")
//!     .exclude("password");
//!
//! assert_eq!(tags.resolve("user_name"), Some("username"));
//! assert_eq!(tags.resolve("password"), None);
//! assert_eq!(tags.resolve("unknown"), None);
//! assert_eq!(FieldTag::from("-"), FieldTag::Exclude);
//! ```

use indexmap::IndexMap;

/// The annotation value used to exclude a member.
pub const EXCLUDE_SENTINEL: &str = "-";

/// How one struct member appears in the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTag {
    /// Encode the member under this field name.
    Name(String),
    /// Never encode the member.
    Exclude,
}

impl From<&str> for FieldTag {
    fn from(tag: &str) -> Self {
        if tag == EXCLUDE_SENTINEL {
            FieldTag::Exclude
        } else {
            FieldTag::Name(tag.to_string())
        }
    }
}

impl From<String> for FieldTag {
    fn from(tag: String) -> Self {
        FieldTag::from(tag.as_str())
    }
}

/// An ordered table from serde member names to [`FieldTag`]s.
///
/// This is a thin wrapper around [`IndexMap`] so that iteration follows the
/// order in which tags were declared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldTags(IndexMap<String, FieldTag>);

impl FieldTags {
    /// Creates an empty table.
    ///
    /// An empty table registered for a struct skips every member.
    #[must_use]
    pub fn new() -> Self {
        FieldTags(IndexMap::new())
    }

    /// Tags `member` with a form field name. A name of `-` excludes the member.
    #[must_use]
    pub fn tag(mut self, member: &str, name: &str) -> Self {
        self.insert(member, FieldTag::from(name));
        self
    }

    /// Excludes `member` from the form.
    #[must_use]
    pub fn exclude(mut self, member: &str) -> Self {
        self.insert(member, FieldTag::Exclude);
        self
    }

    /// Inserts a tag, returning the one it replaced.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_multipart::{FieldTag, FieldTags};
    ///
    /// let mut tags = FieldTags::new();
    /// assert!(tags.insert("a", FieldTag::from("x")).is_none());
    /// assert_eq!(tags.insert("a", FieldTag::Exclude), Some(FieldTag::Name("x".to_string())));
    /// ```
    pub fn insert(&mut self, member: &str, tag: FieldTag) -> Option<FieldTag> {
        self.0.insert(member.to_string(), tag)
    }

    #[must_use]
    pub fn get(&self, member: &str) -> Option<&FieldTag> {
        self.0.get(member)
    }

    /// Returns the form field name for `member`, or `None` if it must be skipped.
    #[must_use]
    pub fn resolve(&self, member: &str) -> Option<&str> {
        match self.0.get(member) {
            Some(FieldTag::Name(name)) if !name.is_empty() => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the tags, in declaration order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, FieldTag> {
        self.0.iter()
    }
}

impl<K: Into<String>, T: Into<FieldTag>> FromIterator<(K, T)> for FieldTags {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        FieldTags(
            iter.into_iter()
                .map(|(k, t)| (k.into(), t.into()))
                .collect(),
        )
    }
}

impl IntoIterator for FieldTags {
    type Item = (String, FieldTag);
    type IntoIter = indexmap::map::IntoIter<String, FieldTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
