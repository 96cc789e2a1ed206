//! Domain models for the Inventory Log Steward.

pub mod audit;
pub mod conversation;
pub mod execution;
pub mod log_record;
pub mod operation;
pub mod preview;

pub use audit::{
    CreateOperationAuditInput, ListOperationAuditQuery, OperationAudit, OperationStatus,
};
pub use conversation::{
    ConversationExchange, ARCHIVE_PREVIEW_MARKER, DELETE_PREVIEW_MARKER,
};
pub use execution::ExecutionResult;
pub use log_record::LogRecord;
pub use operation::{
    DateComparison, FilterSet, LogTable, OperationAction, OperationDescriptor,
};
pub use preview::{PreviewResult, PREVIEW_SAMPLE_LIMIT};
