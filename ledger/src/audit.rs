//! Full ledger audit: both indexes, their records, and the links between them.
//!
//! [`LedgerAuditor::run`] is a collect-everything diagnostic. Each ledger is
//! checked for sequence and hash integrity independently, then every
//! challenge's `Challenged_Event_ID` is checked against the event IDs the
//! event index names. Nothing short-circuits: one run lists every defect.

use std::path::PathBuf;

use plrs_kernel::proof::hash::HashAlgorithm;
use plrs_kernel::record::RecordKind;

use crate::finding::{AuditReport, Finding};
use crate::index::{audit_cross_links, audit_hashes, audit_sequence, IndexLedger};
use crate::store::{DirRecordStore, RecordStore};

/// On-disk locations of a complete ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerPaths {
    pub event_index: PathBuf,
    pub challenge_index: PathBuf,
    pub events_dir: PathBuf,
    pub challenges_dir: PathBuf,
}

impl LedgerPaths {
    fn index(&self, kind: RecordKind) -> &PathBuf {
        match kind {
            RecordKind::Event => &self.event_index,
            RecordKind::Challenge => &self.challenge_index,
        }
    }

    fn records_dir(&self, kind: RecordKind) -> &PathBuf {
        match kind {
            RecordKind::Event => &self.events_dir,
            RecordKind::Challenge => &self.challenges_dir,
        }
    }
}

/// Runs ledger audits under one hash algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerAuditor {
    algorithm: HashAlgorithm,
}

impl LedgerAuditor {
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Sequence and hash audit of a single index.
    #[must_use]
    pub fn audit_index(&self, ledger: &IndexLedger, store: &dyn RecordStore) -> AuditReport {
        let mut report = AuditReport::from(audit_sequence(ledger));
        report.extend(audit_hashes(ledger, store, self.algorithm));
        tracing::debug!(
            kind = %ledger.kind(),
            entries = ledger.len(),
            findings = report.findings().len(),
            "audited index"
        );
        report
    }

    /// Audit both ledgers and the challenge → event cross-links.
    #[must_use]
    pub fn run(
        &self,
        events: &IndexLedger,
        challenges: &IndexLedger,
        event_store: &dyn RecordStore,
        challenge_store: &dyn RecordStore,
    ) -> AuditReport {
        tracing::info!(
            events = events.len(),
            challenges = challenges.len(),
            algorithm = %self.algorithm,
            "auditing ledger"
        );
        let mut report = self.audit_index(events, event_store);
        report.merge(self.audit_index(challenges, challenge_store));
        report.extend(audit_cross_links(challenges, &events.record_ids()));
        tracing::info!(
            ok = report.is_ok(),
            findings = report.findings().len(),
            "ledger audit complete"
        );
        report
    }

    /// Load a ledger from disk and audit it.
    ///
    /// An index that cannot be loaded is reported as `IndexUnreadable` and
    /// audited as empty, so the other ledger is still checked. Cross-links
    /// against an unreadable event index are then all dangling.
    #[must_use]
    pub fn run_files(&self, paths: &LedgerPaths) -> AuditReport {
        let mut unreadable = AuditReport::new();
        let mut load = |kind: RecordKind| {
            IndexLedger::load(kind, paths.index(kind)).unwrap_or_else(|e| {
                tracing::warn!(%kind, error = %e, "index unreadable");
                unreadable.push(Finding::IndexUnreadable {
                    kind,
                    detail: e.to_string(),
                });
                IndexLedger::new(kind)
            })
        };
        let events = load(RecordKind::Event);
        let challenges = load(RecordKind::Challenge);

        let event_store = DirRecordStore::new(paths.records_dir(RecordKind::Event));
        let challenge_store = DirRecordStore::new(paths.records_dir(RecordKind::Challenge));

        unreadable.merge(self.run(&events, &challenges, &event_store, &challenge_store));
        unreadable
    }
}
