//! Append-only, hash-chained notification log.
//!
//! Each record commits to the previous record's hash, its own sequence
//! number, and the canonical JSON of its event:
//!
//! ```text
//! chain_hash[n] = SHA-256(domain || chain_hash[n-1] || n || json(event[n]))
//! chain_hash[-1] = 0^32
//! ```
//!
//! An observer holding only `head()` can later detect any rewritten,
//! dropped, or reordered record.

use chrono::Utc;
use openescrow_types::{constants, EscrowError, EscrowEvent, EventRecord, Result};
use sha2::{Digest, Sha256};

/// Ordered list of every event the ledger has emitted.
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append an event and return its record.
    ///
    /// # Errors
    /// Returns `Serialization` if the event can't be encoded for hashing.
    pub fn append(&mut self, event: EscrowEvent) -> Result<&EventRecord> {
        let record = self.seal(event)?;
        Ok(self.push(record))
    }

    /// Build the record `event` would get as the next entry, without
    /// appending it.
    ///
    /// # Errors
    /// Returns `Serialization` if the event can't be encoded for hashing.
    pub(crate) fn seal(&self, event: EscrowEvent) -> Result<EventRecord> {
        let sequence = u64::try_from(self.records.len())
            .map_err(|_| EscrowError::Internal("event log sequence overflow".into()))?;
        let chain_hash = Self::compute_chain_hash(&self.head(), sequence, &event)?;
        Ok(EventRecord {
            sequence,
            event,
            emitted_at: Utc::now(),
            chain_hash,
        })
    }

    /// Append a record produced by [`seal`](Self::seal) on this log with no
    /// append in between.
    pub(crate) fn push(&mut self, record: EventRecord) -> &EventRecord {
        debug_assert_eq!(Some(record.sequence), u64::try_from(self.records.len()).ok());
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// Hash of the latest record, or the genesis hash if empty.
    #[must_use]
    pub fn head(&self) -> [u8; 32] {
        self.records
            .last()
            .map_or(constants::GENESIS_CHAIN_HASH, |r| r.chain_hash)
    }

    /// Recompute every chain hash from genesis.
    ///
    /// # Errors
    /// Returns `EventChainBroken` at the first record whose stored hash or
    /// sequence doesn't match.
    pub fn verify_chain(&self) -> Result<()> {
        let mut prev = constants::GENESIS_CHAIN_HASH;
        for (expected_seq, record) in (0u64..).zip(&self.records) {
            if record.sequence != expected_seq
                || Self::compute_chain_hash(&prev, expected_seq, &record.event)?
                    != record.chain_hash
            {
                return Err(EscrowError::EventChainBroken {
                    sequence: expected_seq,
                });
            }
            prev = record.chain_hash;
        }
        Ok(())
    }

    /// All records, oldest first.
    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been emitted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn compute_chain_hash(prev: &[u8; 32], sequence: u64, event: &EscrowEvent) -> Result<[u8; 32]> {
        let body = serde_json::to_vec(event)?;
        let mut hasher = Sha256::new();
        hasher.update(constants::EVENT_CHAIN_DOMAIN);
        hasher.update(prev);
        hasher.update(sequence.to_le_bytes());
        hasher.update(&body);

        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        Ok(hash)
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use openescrow_types::EscrowPlan;

    use super::*;

    fn created() -> EscrowEvent {
        EscrowEvent::plan_created(&EscrowPlan::dummy(2))
    }

    #[test]
    fn empty_log_head_is_genesis() {
        let log = EventLog::new();
        assert!(log.is_empty());
        assert_eq!(log.head(), constants::GENESIS_CHAIN_HASH);
        assert!(log.verify_chain().is_ok());
    }

    #[test]
    fn append_assigns_sequence_and_moves_head() {
        let mut log = EventLog::new();
        let first = log.append(created()).unwrap().clone();
        assert_eq!(first.sequence, 0);
        assert_eq!(log.head(), first.chain_hash);

        let second = log.append(created()).unwrap().clone();
        assert_eq!(second.sequence, 1);
        assert_ne!(first.chain_hash, second.chain_hash);
        assert_eq!(log.len(), 2);
        assert!(log.verify_chain().is_ok());
    }

    #[test]
    fn seal_leaves_log_untouched_until_push() {
        let mut log = EventLog::new();
        log.append(created()).unwrap();
        let head = log.head();

        let record = log.seal(created()).unwrap();
        assert_eq!(record.sequence, 1);
        assert_eq!(log.len(), 1);
        assert_eq!(log.head(), head);

        let hash = log.push(record).chain_hash;
        assert_eq!(log.head(), hash);
        assert!(log.verify_chain().is_ok());
    }

    #[test]
    fn identical_events_hash_differently_by_position() {
        let event = created();
        let mut log = EventLog::new();
        let a = log.append(event.clone()).unwrap().chain_hash;
        let b = log.append(event).unwrap().chain_hash;
        assert_ne!(a, b);
    }

    #[test]
    fn tampered_record_detected() {
        let mut log = EventLog::new();
        log.append(created()).unwrap();
        log.append(created()).unwrap();
        log.append(created()).unwrap();

        log.records[1].event = created();
        let err = log.verify_chain().unwrap_err();
        assert!(matches!(err, EscrowError::EventChainBroken { sequence: 1 }));
    }

    #[test]
    fn dropped_record_detected() {
        let mut log = EventLog::new();
        log.append(created()).unwrap();
        log.append(created()).unwrap();
        log.records.remove(0);
        assert!(log.verify_chain().is_err());
    }
}
