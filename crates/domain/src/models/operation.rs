//! Operation descriptor types.
//!
//! An [`OperationDescriptor`] is the canonical, serializable representation
//! of a requested operation. It is built fresh per request, either from a
//! classified intent or from a confirmation replay, and never mutated after
//! construction.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kinds of operations the engine executes. Closed set: unknown tags from
/// the classifier are rejected at the adapter boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationAction {
    Select,
    Archive,
    Delete,
}

impl OperationAction {
    /// Minimum record age, in days, before this action may touch a record.
    pub fn minimum_age_days(&self) -> Option<i64> {
        match self {
            OperationAction::Archive => Some(7),
            OperationAction::Delete => Some(30),
            OperationAction::Select => None,
        }
    }

    /// True for actions that modify data.
    pub fn is_destructive(&self) -> bool {
        matches!(self, OperationAction::Archive | OperationAction::Delete)
    }
}

impl FromStr for OperationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "select" | "query" => Ok(OperationAction::Select),
            "archive" => Ok(OperationAction::Archive),
            "delete" => Ok(OperationAction::Delete),
            _ => Err(format!("Unknown operation action: {}", s)),
        }
    }
}

impl std::fmt::Display for OperationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationAction::Select => write!(f, "select"),
            OperationAction::Archive => write!(f, "archive"),
            OperationAction::Delete => write!(f, "delete"),
        }
    }
}

/// Logical log tables of the inventory platform. Archive variants are
/// derived names, not distinct members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogTable {
    DsiActivities,
    DsiTransactionLog,
}

impl LogTable {
    /// Name of the main table.
    pub fn main_table_name(&self) -> &'static str {
        match self {
            LogTable::DsiActivities => "dsiactivities",
            LogTable::DsiTransactionLog => "dsitransactionlog",
        }
    }

    /// Name of the derived archive table.
    pub fn archive_table_name(&self) -> &'static str {
        match self {
            LogTable::DsiActivities => "dsiactivities_archive",
            LogTable::DsiTransactionLog => "dsitransactionlog_archive",
        }
    }
}

impl FromStr for LogTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dsiactivities" | "activities" => Ok(LogTable::DsiActivities),
            "dsitransactionlog" | "transactions" => Ok(LogTable::DsiTransactionLog),
            _ => Err(format!("Unknown log table: {}", s)),
        }
    }
}

impl std::fmt::Display for LogTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.main_table_name())
    }
}

/// How a cutoff timestamp is compared against record timestamps.
///
/// Always derived from the filter's semantic origin: an `older_than_*`
/// expression yields strict `<`, a raw `date_end` yields `<=`. Never left
/// unset once a cutoff exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateComparison {
    OlderThan,
    AtOrBefore,
}

impl DateComparison {
    /// SQL comparison operator for the cutoff predicate.
    pub fn sql_operator(&self) -> &'static str {
        match self {
            DateComparison::OlderThan => "<",
            DateComparison::AtOrBefore => "<=",
        }
    }
}

impl FromStr for DateComparison {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "older_than" => Ok(DateComparison::OlderThan),
            "at_or_before" => Ok(DateComparison::AtOrBefore),
            _ => Err(format!("Unknown date comparison: {}", s)),
        }
    }
}

/// Typed filter set attached to an operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    /// Symbolic date expression ("older_than_30_days", "yesterday", ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_filter: Option<String>,
    /// Concrete lower bound, char(14) log timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_start: Option<String>,
    /// Concrete cutoff, char(14) log timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_comparison: Option<DateComparison>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl FilterSet {
    /// True when no filter of any kind is set.
    pub fn is_empty(&self) -> bool {
        self.date_filter.is_none()
            && self.date_start.is_none()
            && self.date_end.is_none()
            && self.agent_name.is_none()
            && self.server_name.is_none()
            && self.user_id.is_none()
            && self.device_id.is_none()
    }

    /// Equality filters as (column, value) pairs, in fixed column order.
    pub fn equality_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        if let Some(v) = self.agent_name.as_deref() {
            pairs.push(("agent_name", v));
        }
        if let Some(v) = self.server_name.as_deref() {
            pairs.push(("server_name", v));
        }
        if let Some(v) = self.user_id.as_deref() {
            pairs.push(("user_id", v));
        }
        if let Some(v) = self.device_id.as_deref() {
            pairs.push(("device_id", v));
        }
        pairs
    }
}

/// Canonical representation of a requested operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    pub action: OperationAction,
    pub table: LogTable,
    pub filters: FilterSet,
    /// True when the operation targets the derived archive table.
    pub is_archive_target: bool,
    /// Provenance signal from the upstream classifier; never alters
    /// execution behavior.
    pub confidence: f64,
    /// Set by the confirmation resolver: skip preview, proceed to execute.
    /// The safety gate's age check still runs unconditionally.
    #[serde(default)]
    pub confirmed: bool,
    /// Structural problems found before execution.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<String>,
}

impl OperationDescriptor {
    /// A non-destructive query descriptor.
    pub fn select(table: LogTable, filters: FilterSet) -> Self {
        Self::new(OperationAction::Select, table, filters, false)
    }

    /// An archive descriptor targeting the main table.
    pub fn archive(table: LogTable, filters: FilterSet) -> Self {
        Self::new(OperationAction::Archive, table, filters, false)
    }

    /// A delete descriptor. Deletion is only ever permitted against archive
    /// tables, so the archive-target flag is fixed here.
    pub fn delete_archived(table: LogTable, filters: FilterSet) -> Self {
        Self::new(OperationAction::Delete, table, filters, true)
    }

    fn new(
        action: OperationAction,
        table: LogTable,
        filters: FilterSet,
        is_archive_target: bool,
    ) -> Self {
        Self {
            action,
            table,
            filters,
            is_archive_target,
            confidence: 1.0,
            confirmed: false,
            validation_errors: Vec::new(),
        }
    }

    /// Attach the classifier's confidence score.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Mark this descriptor as a confirmed replay of a prior preview.
    pub fn confirmed(mut self) -> Self {
        self.confirmed = true;
        self
    }

    /// The physical table this operation reads or mutates.
    pub fn target_table_name(&self) -> &'static str {
        if self.is_archive_target {
            self.table.archive_table_name()
        } else {
            self.table.main_table_name()
        }
    }
}
