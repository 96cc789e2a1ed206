//! Domain services for the Inventory Log Steward.
//!
//! Services contain business logic that operates on domain models. All of
//! them are pure over their inputs and the wall clock; database access
//! lives in the persistence crate.

pub mod confirmation;
pub mod filter_normalizer;
pub mod safety_gate;

pub use confirmation::{detect_signal, resolve, ConfirmationSignal, Resolution, HISTORY_WINDOW};
pub use filter_normalizer::{extract_date_filter, normalize, normalize_at, NormalizedFilters};
pub use safety_gate::{validate, validate_at};
