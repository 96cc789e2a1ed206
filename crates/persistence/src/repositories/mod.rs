//! Repository implementations.

pub mod conversation;
pub mod log_records;
pub mod operation_audit;

pub use conversation::{AppendExchangeInput, ConversationRepository};
pub use log_records::{ExecutionError, LogPredicate, LogRecordRepository};
pub use operation_audit::OperationAuditRepository;
