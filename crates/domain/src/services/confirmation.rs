//! Confirmation-signal detection and replay resolution.
//!
//! A terse "CONFIRM ARCHIVE" / "CONFIRM DELETE" / "CANCEL" message is
//! matched against a bounded window of recent session history to rebuild
//! the exact operation that was previewed. Resolution fails closed: if no
//! stored preview can be located, the caller is told to restart the
//! operation naming the table — a guessed default table once caused
//! cross-table misfires and is never acceptable here.

use std::str::FromStr;

use crate::error::{OperationError, ResolutionFailure};
use crate::models::{
    ConversationExchange, FilterSet, LogTable, OperationAction, OperationDescriptor,
    ARCHIVE_PREVIEW_MARKER, DELETE_PREVIEW_MARKER,
};
use crate::services::filter_normalizer::extract_date_filter;

/// How far back in session history the resolver will scan.
pub const HISTORY_WINDOW: usize = 10;

/// Recognized confirmation signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationSignal {
    ConfirmArchive,
    ConfirmDelete,
    Cancel,
}

/// Outcome of resolving a confirmation signal.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// CANCEL short-circuit: nothing to execute, nothing destructive
    /// reachable from here.
    Cancelled,
    /// A confirmed descriptor ready for the safety gate and execution.
    Execute(OperationDescriptor),
}

/// Detects a confirmation signal in a chat message.
///
/// Case-insensitive substring match over a fixed token set. A message
/// matching more than one token is ambiguous and detects as no signal, so
/// it can never fall through to execution.
pub fn detect_signal(message: &str) -> Option<ConfirmationSignal> {
    let lowered = message.to_lowercase();
    let mut detected = Vec::new();
    if lowered.contains("confirm archive") {
        detected.push(ConfirmationSignal::ConfirmArchive);
    }
    if lowered.contains("confirm delete") {
        detected.push(ConfirmationSignal::ConfirmDelete);
    }
    if lowered.contains("cancel") {
        detected.push(ConfirmationSignal::Cancel);
    }
    match detected.as_slice() {
        [single] => Some(*single),
        _ => None,
    }
}

/// Resolves a detected signal against session history, most recent first.
///
/// The rebuilt descriptor uses the table stored with the preview exchange
/// and date filters re-extracted from the original triggering user message,
/// not from the confirmation message.
pub fn resolve(
    signal: ConfirmationSignal,
    history: &[ConversationExchange],
) -> Result<Resolution, OperationError> {
    let (action, marker) = match signal {
        ConfirmationSignal::Cancel => return Ok(Resolution::Cancelled),
        ConfirmationSignal::ConfirmArchive => (OperationAction::Archive, ARCHIVE_PREVIEW_MARKER),
        ConfirmationSignal::ConfirmDelete => (OperationAction::Delete, DELETE_PREVIEW_MARKER),
    };

    for exchange in history.iter().take(HISTORY_WINDOW) {
        if !exchange.is_replayable_preview(marker) {
            continue;
        }
        let stored = exchange.table_name.as_deref().unwrap_or_default();
        let table = match LogTable::from_str(stored) {
            Ok(table) => table,
            Err(_) => {
                // A corrupt tag is as good as no tag; keep scanning rather
                // than guess.
                tracing::warn!(table = stored, "skipping preview exchange with unknown table tag");
                continue;
            }
        };

        let filters = FilterSet {
            date_filter: extract_date_filter(&exchange.user_message),
            ..Default::default()
        };

        let descriptor = match action {
            OperationAction::Archive => OperationDescriptor::archive(table, filters),
            OperationAction::Delete => OperationDescriptor::delete_archived(table, filters),
            OperationAction::Select => unreachable!("signals map only to destructive actions"),
        };
        return Ok(Resolution::Execute(descriptor.confirmed()));
    }

    Err(ResolutionFailure { operation: action }.into())
}
