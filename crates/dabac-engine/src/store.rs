//! In-memory trust store.
//!
//! [`MemoryTrustStore`] keeps one [`VersionedRecord`] per subject in a
//! [`DashMap`]. Each record is a single `Copy` value, so a read returns
//! `(belief, last_update, version)` as one consistent snapshot, and a
//! compare-and-swap holds only the shard lock of its own key for the
//! duration of the version check and the write.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use dabac_core::error::StoreError;
use dabac_core::traits::{CasOutcome, TrustStore};
use dabac_core::types::{SubjectId, TrustRecord, VersionedRecord};

/// Sharded, lock-per-shard trust store.
#[derive(Debug, Default)]
pub struct MemoryTrustStore {
    records: DashMap<SubjectId, VersionedRecord>,
}

impl MemoryTrustStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrustStore for MemoryTrustStore {
    fn load(&self, subject: &SubjectId) -> Result<Option<VersionedRecord>, StoreError> {
        Ok(self.records.get(subject).map(|r| *r))
    }

    fn compare_and_swap(
        &self,
        subject: &SubjectId,
        expected_version: Option<u64>,
        record: TrustRecord,
    ) -> Result<CasOutcome, StoreError> {
        match self.records.entry(subject.clone()) {
            Entry::Occupied(mut slot) => {
                let current = *slot.get();
                if expected_version != Some(current.version) {
                    return Ok(CasOutcome::Conflict(Some(current)));
                }
                if record.last_update < current.record.last_update {
                    return Err(StoreError::TimestampRegression {
                        subject: subject.clone(),
                        stored: current.record.last_update.as_secs(),
                        proposed: record.last_update.as_secs(),
                    });
                }
                let next = VersionedRecord {
                    record,
                    version: current.version + 1,
                };
                slot.insert(next);
                Ok(CasOutcome::Committed(next))
            }
            Entry::Vacant(slot) => {
                if expected_version.is_some() {
                    return Ok(CasOutcome::Conflict(None));
                }
                let next = VersionedRecord { record, version: 1 };
                slot.insert(next);
                Ok(CasOutcome::Committed(next))
            }
        }
    }

    fn subjects(&self) -> Result<Vec<SubjectId>, StoreError> {
        let mut ids: Vec<SubjectId> = self.records.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        Ok(ids)
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
