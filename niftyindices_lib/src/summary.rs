//! End-of-run reporting.
//!
//! Successful indices are grouped by identical record-count delta so a
//! routine daily run collapses to a couple of lines (`+1 -> (..all..)`),
//! and anything unusual stands out.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::store::ChangeRecord;

/// An index that could not be fetched or saved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IndexFailure {
    pub index_name: String,
    /// Name sent upstream, when it differs from `index_name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub reason: String,
    /// Fetch requests made for the index; zero when it failed while saving.
    pub attempts: u32,
}

/// Indices sharing the same record-count delta.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeltaGroup {
    pub delta: i64,
    pub indices: Vec<String>,
}

/// How a run ended, for the process exit status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every listed index was fetched and saved.
    Complete,
    /// At least one index failed, or the run was interrupted.
    Partial,
}

/// Everything a run did, in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Indices the run was asked to process.
    pub total: usize,
    pub changes: Vec<ChangeRecord>,
    pub failures: Vec<IndexFailure>,
    pub interrupted: bool,
}

/// Serializable view of a [`RunSummary`], grouped for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SummaryReport {
    pub total: usize,
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub interrupted: bool,
    pub increased: Vec<DeltaGroup>,
    pub unchanged: Vec<String>,
    pub decreased: Vec<DeltaGroup>,
    pub failures: Vec<IndexFailure>,
    pub changes: Vec<ChangeRecord>,
}

impl RunSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn successful(&self) -> usize {
        self.changes.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn processed(&self) -> usize {
        self.successful() + self.failed()
    }

    pub fn outcome(&self) -> RunOutcome {
        if self.failures.is_empty() && !self.interrupted && self.processed() == self.total {
            RunOutcome::Complete
        } else {
            RunOutcome::Partial
        }
    }

    /// Index names keyed by delta, each group in input order.
    pub fn grouped_by_delta(&self) -> BTreeMap<i64, Vec<String>> {
        let mut groups: BTreeMap<i64, Vec<String>> = BTreeMap::new();
        for change in &self.changes {
            groups
                .entry(change.delta)
                .or_default()
                .push(change.index_name.clone());
        }
        groups
    }

    /// Positive deltas, largest first.
    pub fn increases(&self) -> Vec<DeltaGroup> {
        self.grouped_by_delta()
            .into_iter()
            .rev()
            .filter(|(delta, _)| *delta > 0)
            .map(|(delta, indices)| DeltaGroup { delta, indices })
            .collect()
    }

    /// Indices whose record count did not move.
    pub fn unchanged(&self) -> Vec<String> {
        self.grouped_by_delta().remove(&0).unwrap_or_default()
    }

    /// Negative deltas, smallest loss first.
    pub fn decreases(&self) -> Vec<DeltaGroup> {
        self.grouped_by_delta()
            .into_iter()
            .rev()
            .filter(|(delta, _)| *delta < 0)
            .map(|(delta, indices)| DeltaGroup { delta, indices })
            .collect()
    }

    pub fn report(&self) -> SummaryReport {
        SummaryReport {
            total: self.total,
            processed: self.processed(),
            successful: self.successful(),
            failed: self.failed(),
            interrupted: self.interrupted,
            increased: self.increases(),
            unchanged: self.unchanged(),
            decreased: self.decreases(),
            failures: self.failures.clone(),
            changes: self.changes.clone(),
        }
    }
}
