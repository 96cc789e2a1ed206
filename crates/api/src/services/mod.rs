//! Application services.

pub mod classifier;
pub mod operations;

pub use classifier::{HttpIntentClassifier, IntentClassifier};
pub use operations::{ChatReply, OperationService};
