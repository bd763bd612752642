use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocstoreErrorCode {
    InvalidArgument,
    InvalidFilterValue,
    SentinelValueRejected,
    OrderingAfterCursor,
    InvalidCursorValues,
    InvalidDocumentIdCursorValue,
    SnapshotCollectionMismatch,
    MissingSnapshotField,
    MissingReadTimestamp,
    Cancelled,
    Internal,
}

impl DocstoreErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocstoreErrorCode::InvalidArgument => "docstore/invalid-argument",
            DocstoreErrorCode::InvalidFilterValue => "docstore/invalid-filter-value",
            DocstoreErrorCode::SentinelValueRejected => "docstore/sentinel-value-rejected",
            DocstoreErrorCode::OrderingAfterCursor => "docstore/ordering-after-cursor",
            DocstoreErrorCode::InvalidCursorValues => "docstore/invalid-cursor-values",
            DocstoreErrorCode::InvalidDocumentIdCursorValue => {
                "docstore/invalid-document-id-cursor-value"
            }
            DocstoreErrorCode::SnapshotCollectionMismatch => {
                "docstore/snapshot-collection-mismatch"
            }
            DocstoreErrorCode::MissingSnapshotField => "docstore/missing-snapshot-field",
            DocstoreErrorCode::MissingReadTimestamp => "docstore/missing-read-timestamp",
            DocstoreErrorCode::Cancelled => "docstore/cancelled",
            DocstoreErrorCode::Internal => "docstore/internal",
        }
    }
}

#[derive(Clone, Debug)]
pub struct DocstoreError {
    pub code: DocstoreErrorCode,
    message: String,
}

impl DocstoreError {
    pub fn new(code: DocstoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl Display for DocstoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl Error for DocstoreError {}

pub type DocstoreResult<T> = Result<T, DocstoreError>;

pub fn invalid_argument(message: impl Into<String>) -> DocstoreError {
    DocstoreError::new(DocstoreErrorCode::InvalidArgument, message)
}

pub fn invalid_filter_value(message: impl Into<String>) -> DocstoreError {
    DocstoreError::new(DocstoreErrorCode::InvalidFilterValue, message)
}

pub fn sentinel_value_rejected(message: impl Into<String>) -> DocstoreError {
    DocstoreError::new(DocstoreErrorCode::SentinelValueRejected, message)
}

pub fn ordering_after_cursor(message: impl Into<String>) -> DocstoreError {
    DocstoreError::new(DocstoreErrorCode::OrderingAfterCursor, message)
}

pub fn invalid_cursor_values(message: impl Into<String>) -> DocstoreError {
    DocstoreError::new(DocstoreErrorCode::InvalidCursorValues, message)
}

pub fn invalid_document_id_cursor_value(message: impl Into<String>) -> DocstoreError {
    DocstoreError::new(DocstoreErrorCode::InvalidDocumentIdCursorValue, message)
}

pub fn snapshot_collection_mismatch(message: impl Into<String>) -> DocstoreError {
    DocstoreError::new(DocstoreErrorCode::SnapshotCollectionMismatch, message)
}

pub fn missing_snapshot_field(message: impl Into<String>) -> DocstoreError {
    DocstoreError::new(DocstoreErrorCode::MissingSnapshotField, message)
}

pub fn missing_read_timestamp(message: impl Into<String>) -> DocstoreError {
    DocstoreError::new(DocstoreErrorCode::MissingReadTimestamp, message)
}

pub fn cancelled(message: impl Into<String>) -> DocstoreError {
    DocstoreError::new(DocstoreErrorCode::Cancelled, message)
}

pub fn internal_error(message: impl Into<String>) -> DocstoreError {
    DocstoreError::new(DocstoreErrorCode::Internal, message)
}
