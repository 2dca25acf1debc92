/// Builds a [`FieldTags`](crate::FieldTags) table.
///
/// Each entry maps a serde member name to a form field name; `-` excludes the
/// member.
///
/// ```rust
/// use serde_multipart::{field_tags, FieldTag};
///
/// let tags = field_tags! {
///     "title" => "post_title",
///     "draft" => "-",
/// };
/// assert_eq!(tags.resolve("title"), Some("post_title"));
/// assert_eq!(tags.get("draft"), Some(&FieldTag::Exclude));
/// ```
#[macro_export]
macro_rules! field_tags {
    // Handle empty table
    () => {
        $crate::FieldTags::new()
    };

    // Handle non-empty table
    ($($member:literal => $tag:expr),+ $(,)?) => {{
        let mut tags = $crate::FieldTags::new();
        $(
            tags.insert($member, $crate::FieldTag::from($tag));
        )+
        tags
    }};
}
