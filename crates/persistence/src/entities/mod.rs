//! Entity definitions (database row mappings).

pub mod conversation;
pub mod log_record;
pub mod operation_audit;

pub use conversation::ConversationExchangeEntity;
pub use log_record::LogRecordEntity;
pub use operation_audit::OperationAuditEntity;
