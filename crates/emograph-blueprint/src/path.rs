//! Document paths for schema diagnostics
//!
//! Provides [`SchemaPath`] for pointing at a location inside a raw blueprint
//! document, e.g. `elements[2].size.rx`.

use std::fmt::{self, Display, Formatter};

/// One step into a document: a mapping key or a sequence index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Mapping key
    Key(String),
    /// Sequence index
    Index(usize),
}

/// Location within a raw document
///
/// The empty path is the document root and displays as `$`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SchemaPath(Vec<PathSegment>);

impl SchemaPath {
    /// Document root
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path with one more key segment
    #[must_use]
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.into()));
        Self(segments)
    }

    /// Path with one more index segment
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// Prefix every segment of `self` with `prefix`
    #[must_use]
    pub fn under(&self, prefix: &SchemaPath) -> Self {
        let mut segments = prefix.0.clone();
        segments.extend(self.0.iter().cloned());
        Self(segments)
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Check if path is the root
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for SchemaPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("$");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_displays_as_dollar() {
        assert_eq!(SchemaPath::root().to_string(), "$");
        assert!(SchemaPath::root().is_root());
    }

    #[test]
    fn nested_path_display() {
        let path = SchemaPath::root().key("elements").index(2).key("size").key("rx");
        assert_eq!(path.to_string(), "elements[2].size.rx");
    }

    #[test]
    fn under_prefixes_segments() {
        let inner = SchemaPath::root().key("width");
        let outer = inner.under(&SchemaPath::root().key("emograph_blueprint"));
        assert_eq!(outer.to_string(), "emograph_blueprint.width");
    }
}
