use crate::error::{invalid_argument, DocstoreResult};

/// Name the backend reserves for the document-identity pseudo-field.
const DOCUMENT_ID_NAME: &str = "__name__";

const NO_SEGMENTS: &[String] = &[];

/// A dotted reference to a document field, or the reserved document-identity
/// marker.
///
/// The identity marker is a distinct singleton: it never compares equal to a
/// parsed segment list, not even one whose only segment is the literal
/// `__name__`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldPath {
    kind: FieldPathKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum FieldPathKind {
    DocumentId,
    Segments(Vec<String>),
}

impl FieldPath {
    pub fn new<S, I>(segments: I) -> DocstoreResult<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(invalid_argument(
                "FieldPath must contain at least one segment",
            ));
        }
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(invalid_argument("FieldPath segments cannot be empty"));
        }
        Ok(Self {
            kind: FieldPathKind::Segments(segments),
        })
    }

    pub fn from_dot_separated(path: &str) -> DocstoreResult<Self> {
        if path.trim().is_empty() {
            return Err(invalid_argument("FieldPath string cannot be empty"));
        }
        Self::new(path.split('.'))
    }

    /// The reserved pseudo-field naming a document's own identifier.
    pub fn document_id() -> Self {
        Self {
            kind: FieldPathKind::DocumentId,
        }
    }

    pub fn is_document_id(&self) -> bool {
        matches!(self.kind, FieldPathKind::DocumentId)
    }

    /// The user-field segments; empty for the document-identity marker.
    pub fn segments(&self) -> &[String] {
        match &self.kind {
            FieldPathKind::DocumentId => NO_SEGMENTS,
            FieldPathKind::Segments(segments) => segments,
        }
    }

    pub fn canonical_string(&self) -> String {
        match &self.kind {
            FieldPathKind::DocumentId => DOCUMENT_ID_NAME.to_string(),
            FieldPathKind::Segments(segments) => segments.join("."),
        }
    }
}

/// Trait that converts common user inputs into a validated [`FieldPath`].
pub trait IntoFieldPath {
    fn into_field_path(self) -> DocstoreResult<FieldPath>;
}

impl IntoFieldPath for FieldPath {
    fn into_field_path(self) -> DocstoreResult<FieldPath> {
        Ok(self)
    }
}

impl<'a> IntoFieldPath for &'a FieldPath {
    fn into_field_path(self) -> DocstoreResult<FieldPath> {
        Ok(self.clone())
    }
}

impl IntoFieldPath for String {
    fn into_field_path(self) -> DocstoreResult<FieldPath> {
        FieldPath::from_dot_separated(&self)
    }
}

impl<'a> IntoFieldPath for &'a str {
    fn into_field_path(self) -> DocstoreResult<FieldPath> {
        FieldPath::from_dot_separated(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_dot_path() {
        let field = FieldPath::from_dot_separated("foo.bar").unwrap();
        assert_eq!(field.segments(), &["foo", "bar"]);
        assert_eq!(field.canonical_string(), "foo.bar");
    }

    #[test]
    fn rejects_empty() {
        let err = FieldPath::from_dot_separated("").unwrap_err();
        assert_eq!(err.code_str(), "docstore/invalid-argument");
    }

    #[test]
    fn rejects_empty_segment() {
        let err = FieldPath::from_dot_separated("foo..bar").unwrap_err();
        assert_eq!(err.code_str(), "docstore/invalid-argument");
    }

    #[test]
    fn document_id_is_a_singleton() {
        let marker = FieldPath::document_id();
        assert!(marker.is_document_id());
        assert_eq!(marker.canonical_string(), "__name__");

        let literal = FieldPath::from_dot_separated("__name__").unwrap();
        assert!(!literal.is_document_id());
        assert_ne!(marker, literal);
    }
}
