//! Approval audit trail

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::workflow::{ApproverRole, WorkflowTier};

/// Action recorded in the approval log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalAction {
    Approved,
    Denied,
    Escalated,
}

impl ApprovalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalAction::Approved => "approved",
            ApprovalAction::Denied => "denied",
            ApprovalAction::Escalated => "escalated",
        }
    }
}

impl fmt::Display for ApprovalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decision taken on a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub action: ApprovalAction,
    /// Role of the approver who acted
    pub actor: ApproverRole,
    /// Tier the claim was at when the action was taken
    pub tier: WorkflowTier,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only log of approval decisions
///
/// Entries can be added and read back in order; nothing can edit, remove or
/// reorder them once written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApprovalLog(Vec<ApprovalRecord>);

impl ApprovalLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, record: ApprovalRecord) {
        self.0.push(record);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ApprovalRecord> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&ApprovalRecord> {
        self.0.last()
    }

    /// True if `earlier` is a prefix of this log
    pub fn extends(&self, earlier: &ApprovalLog) -> bool {
        self.0.starts_with(&earlier.0)
    }
}

impl<'a> IntoIterator for &'a ApprovalLog {
    type Item = &'a ApprovalRecord;
    type IntoIter = std::slice::Iter<'a, ApprovalRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
