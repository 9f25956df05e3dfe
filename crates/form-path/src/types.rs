//! Path segment and path types.

use std::fmt;

/// Token standing in for "any array index" in abstract (schema-context) paths.
pub const INDEX_TOKEN: &str = "INDEX";

/// A single step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object property name.
    Key(String),
    /// Concrete array position.
    Index(usize),
    /// Abstract array position, rendered as `INDEX`.
    Placeholder,
}

impl Segment {
    /// Classifies a raw path step.
    ///
    /// `INDEX` becomes a placeholder, canonical non-negative integers become
    /// indices, everything else is a key.
    ///
    /// ```
    /// use form_path::Segment;
    ///
    /// assert_eq!(Segment::parse("INDEX"), Segment::Placeholder);
    /// assert_eq!(Segment::parse("12"), Segment::Index(12));
    /// assert_eq!(Segment::parse("01"), Segment::Key("01".to_string()));
    /// assert_eq!(Segment::parse("name"), Segment::Key("name".to_string()));
    /// ```
    pub fn parse(raw: &str) -> Segment {
        if raw == INDEX_TOKEN {
            return Segment::Placeholder;
        }
        if is_valid_index(raw) {
            if let Ok(index) = raw.parse() {
                return Segment::Index(index);
            }
        }
        Segment::Key(raw.to_string())
    }

    pub fn key(name: impl Into<String>) -> Segment {
        Segment::Key(name.into())
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Segment::Placeholder)
    }

    /// Returns the property name for key segments.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::Key(key) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "{index}"),
            Segment::Placeholder => f.write_str(INDEX_TOKEN),
        }
    }
}

impl From<&str> for Segment {
    fn from(raw: &str) -> Self {
        Segment::parse(raw)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// Check if a string represents a canonical non-negative integer (no leading zeros).
pub fn is_valid_index(raw: &str) -> bool {
    if raw.is_empty() {
        return false;
    }
    let bytes = raw.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|b| b.is_ascii_digit())
}

/// Ordered sequence of segments addressing a node in form data or in a schema.
///
/// The empty path denotes the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn new(segments: Vec<Segment>) -> Self {
        FieldPath { segments }
    }

    pub fn root() -> Self {
        FieldPath::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Name of the addressed property, if the last step is a key.
    pub fn last_key(&self) -> Option<&str> {
        self.last().and_then(Segment::as_key)
    }

    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.segments.push(segment.into());
    }

    /// Returns a new path extended by one segment.
    pub fn child(&self, segment: impl Into<Segment>) -> FieldPath {
        let mut out = self.clone();
        out.push(segment);
        out
    }

    /// Returns a new path extended by every segment of `other`.
    pub fn join(&self, other: &FieldPath) -> FieldPath {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        FieldPath { segments }
    }

    /// All segments except the last. The root's context is the root.
    pub fn parent_context(&self) -> FieldPath {
        match self.segments.split_last() {
            Some((_, init)) => FieldPath::new(init.to_vec()),
            None => FieldPath::root(),
        }
    }

    /// Enclosing path, or `None` for the root.
    pub fn parent(&self) -> Option<FieldPath> {
        if self.is_root() {
            None
        } else {
            Some(self.parent_context())
        }
    }

    /// Check if `self` is a strict prefix of `other`.
    pub fn is_ancestor_of(&self, other: &FieldPath) -> bool {
        self.len() < other.len() && other.segments[..self.len()] == self.segments[..]
    }

    /// Concrete indices in left-to-right order.
    pub fn indices(&self) -> Vec<usize> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Index(index) => Some(*index),
                _ => None,
            })
            .collect()
    }

    /// Replaces every concrete index with a placeholder.
    pub fn abstract_indices(&self) -> FieldPath {
        FieldPath::new(
            self.segments
                .iter()
                .map(|segment| match segment {
                    Segment::Index(_) => Segment::Placeholder,
                    other => other.clone(),
                })
                .collect(),
        )
    }

    pub fn placeholder_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_placeholder()).count()
    }

    /// True when no placeholder is left.
    pub fn is_resolved(&self) -> bool {
        self.placeholder_count() == 0
    }

    /// Fills placeholders left-to-right with `indices`.
    ///
    /// Surplus indices are ignored; when indices run out the remaining
    /// placeholders are kept, which leaves a path that resolves to nothing.
    ///
    /// ```
    /// use form_path::FieldPath;
    ///
    /// let path = FieldPath::from_dotted("a.INDEX.b.INDEX.c");
    /// assert_eq!(path.substitute(&[2, 5]).to_dotted(), "a.2.b.5.c");
    /// assert_eq!(path.substitute(&[2]).to_dotted(), "a.2.b.INDEX.c");
    /// ```
    pub fn substitute(&self, indices: &[usize]) -> FieldPath {
        let mut next = indices.iter();
        FieldPath::new(
            self.segments
                .iter()
                .map(|segment| match segment {
                    Segment::Placeholder => match next.next() {
                        Some(index) => Segment::Index(*index),
                        None => Segment::Placeholder,
                    },
                    other => other.clone(),
                })
                .collect(),
        )
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dotted())
    }
}

impl FromIterator<Segment> for FieldPath {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        FieldPath::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FieldPath {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_context_of_root_is_root() {
        assert!(FieldPath::root().parent_context().is_root());
        let path = FieldPath::from_dotted("a");
        assert!(path.parent_context().is_root());
        assert_eq!(FieldPath::root().parent(), None);
        assert_eq!(path.parent(), Some(FieldPath::root()));
    }

    #[test]
    fn test_abstract_indices() {
        let path = FieldPath::from_dotted("list.3.items.0.name");
        assert_eq!(path.abstract_indices().to_dotted(), "list.INDEX.items.INDEX.name");
        assert_eq!(path.indices(), vec![3, 0]);
    }

    #[test]
    fn test_is_ancestor_of() {
        let parent = FieldPath::from_dotted("a.b");
        let child = FieldPath::from_dotted("a.b.c");
        assert!(parent.is_ancestor_of(&child));
        assert!(!child.is_ancestor_of(&parent));
        assert!(!parent.is_ancestor_of(&parent));
    }

    #[test]
    fn test_surplus_indices_are_ignored() {
        let path = FieldPath::from_dotted("a.INDEX");
        assert_eq!(path.substitute(&[1, 2, 3]).to_dotted(), "a.1");
    }
}
