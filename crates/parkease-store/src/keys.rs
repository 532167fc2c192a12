//! Key encoding utilities for `RocksDB`.
//!
//! This module provides functions for encoding and decoding keys used in column families.

use parkease_core::{BranchId, Plate, RecordId};

/// Separator between the branch and record parts of a record key.
///
/// Branch identifiers never contain a NUL byte, so a branch prefix cannot
/// match the records of another branch whose ID it prefixes.
const SEPARATOR: u8 = 0x00;

/// Length of an encoded ULID.
const RECORD_ID_LEN: usize = 16;

/// Create a branch key (profile and tariff column families).
#[must_use]
pub fn branch_key(branch_id: &BranchId) -> Vec<u8> {
    branch_id.as_bytes().to_vec()
}

/// Create a parking record key.
///
/// Format: `branch_id || 0x00 || record_id (16 bytes)`
///
/// Since ULIDs are time-ordered, a branch's records sort by entry order.
#[must_use]
pub fn record_key(branch_id: &BranchId, record_id: &RecordId) -> Vec<u8> {
    let mut key = record_prefix(branch_id);
    key.extend_from_slice(&record_id.to_bytes());
    key
}

/// Create a prefix for iterating all records of a branch.
#[must_use]
pub fn record_prefix(branch_id: &BranchId) -> Vec<u8> {
    let mut key = Vec::with_capacity(branch_id.as_bytes().len() + 1 + RECORD_ID_LEN);
    key.extend_from_slice(branch_id.as_bytes());
    key.push(SEPARATOR);
    key
}

/// Create a loyalty account key.
#[must_use]
pub fn loyalty_key(plate: &Plate) -> Vec<u8> {
    plate.as_str().as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch(s: &str) -> BranchId {
        s.parse().unwrap()
    }

    #[test]
    fn record_key_format() {
        let branch_id = branch("lot-a");
        let record_id = RecordId::generate();
        let key = record_key(&branch_id, &record_id);

        assert_eq!(key.len(), 5 + 1 + 16);
        assert_eq!(&key[..5], b"lot-a");
        assert_eq!(key[5], 0);
        assert_eq!(&key[6..], &record_id.to_bytes());
    }

    #[test]
    fn prefix_does_not_match_longer_branch() {
        let short = record_prefix(&branch("lot"));
        let other = record_key(&branch("lot-b"), &RecordId::generate());
        assert!(!other.starts_with(&short));
    }

    #[test]
    fn record_keys_sort_chronologically() {
        let branch_id = branch("lot-a");
        let first = RecordId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = RecordId::generate();

        assert!(record_key(&branch_id, &first) < record_key(&branch_id, &second));
    }
}
