//! Wallet number index
//!
//! Bijection between wallet numbers and addresses. Numbers start at 1, only
//! grow, and are never handed out twice, even after a wallet is removed.

use std::collections::{BTreeMap, HashMap};
use crate::domain::entities::IndexSnapshot;
use crate::shared::error::IndexError;
use crate::shared::types::{Address, WalletNumber};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletNumberIndex {
    by_number: BTreeMap<WalletNumber, Address>,
    by_address: HashMap<Address, WalletNumber>,
    highest_assigned: WalletNumber,
}

impl WalletNumberIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from a persisted snapshot, checking that it is a bijection
    pub fn from_snapshot(snapshot: &IndexSnapshot) -> Result<Self, IndexError> {
        let mut index = Self::new();
        for (&number, address) in &snapshot.entries {
            if number == 0 {
                return Err(IndexError::inconsistent("wallet number 0 is reserved"));
            }
            if let Some(existing) = index.by_address.insert(address.clone(), number) {
                return Err(IndexError::inconsistent(format!(
                    "address {} is listed under both {} and {}",
                    address, existing, number
                )));
            }
            index.by_number.insert(number, address.clone());
        }

        let max_number = index.by_number.keys().next_back().copied().unwrap_or(0);
        if snapshot.highest_assigned < max_number {
            return Err(IndexError::inconsistent(format!(
                "highest assigned {} is below wallet number {}",
                snapshot.highest_assigned, max_number
            )));
        }
        index.highest_assigned = snapshot.highest_assigned;
        Ok(index)
    }

    pub fn snapshot(&self) -> IndexSnapshot {
        IndexSnapshot::new(self.highest_assigned, self.by_number.clone())
    }

    /// The number the next `assign_next` call would hand out
    pub fn next_number(&self) -> WalletNumber {
        self.highest_assigned + 1
    }

    pub fn highest_assigned(&self) -> WalletNumber {
        self.highest_assigned
    }

    pub fn assign_next(&mut self, address: &str) -> Result<WalletNumber, IndexError> {
        if let Some(&number) = self.by_address.get(address) {
            return Err(IndexError::AlreadyAssigned {
                address: address.to_string(),
                number,
            });
        }
        let number = self.next_number();
        self.bind(number, address);
        Ok(number)
    }

    pub fn resolve_number(&self, number: WalletNumber) -> Result<Address, IndexError> {
        self.by_number
            .get(&number)
            .cloned()
            .ok_or_else(|| IndexError::not_found(format!("wallet number {}", number)))
    }

    pub fn resolve_address(&self, address: &str) -> Option<WalletNumber> {
        self.by_address.get(address).copied()
    }

    /// Drop the binding for an address. Its number stays consumed.
    pub fn retire(&mut self, address: &str) -> Option<WalletNumber> {
        let number = self.by_address.remove(address)?;
        self.by_number.remove(&number);
        Some(number)
    }

    /// Entries ordered by wallet number
    pub fn entries(&self) -> impl Iterator<Item = (WalletNumber, &Address)> {
        self.by_number.iter().map(|(&number, address)| (number, address))
    }

    pub fn len(&self) -> usize {
        self.by_number.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_number.is_empty()
    }

    /// Rebuild from stored records, given in creation order with the sequence
    /// each record carries.
    ///
    /// A record keeps its stored sequence when that number is free; the rest
    /// get fresh numbers after everything already used, in creation order.
    pub fn rebuild<'a, I>(records: I, previous_highest: WalletNumber) -> Self
    where
        I: IntoIterator<Item = (&'a str, WalletNumber)>,
    {
        let records: Vec<(&str, WalletNumber)> = records.into_iter().collect();
        let mut index = Self::new();
        let mut pending = Vec::new();

        for &(address, sequence) in &records {
            if index.by_address.contains_key(address) {
                continue;
            }
            if sequence > 0 && !index.by_number.contains_key(&sequence) {
                index.bind(sequence, address);
            } else {
                pending.push(address);
            }
        }

        let max_number = index.by_number.keys().next_back().copied().unwrap_or(0);
        index.highest_assigned = previous_highest.max(max_number);
        for address in pending {
            let number = index.next_number();
            index.bind(number, address);
        }
        index
    }

    fn bind(&mut self, number: WalletNumber, address: &str) {
        self.by_number.insert(number, address.to_string());
        self.by_address.insert(address.to_string(), number);
        self.highest_assigned = self.highest_assigned.max(number);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_start_at_one() {
        let mut index = WalletNumberIndex::new();
        assert_eq!(index.next_number(), 1);
        assert_eq!(index.assign_next("a").expect("Failed to assign"), 1);
        assert_eq!(index.assign_next("b").expect("Failed to assign"), 2);
        assert_eq!(index.resolve_number(2).expect("Failed to resolve"), "b");
        assert_eq!(index.resolve_address("a"), Some(1));
    }

    #[test]
    fn test_duplicate_address_rejected() {
        let mut index = WalletNumberIndex::new();
        index.assign_next("a").expect("Failed to assign");
        let result = index.assign_next("a");
        assert_eq!(
            result,
            Err(IndexError::AlreadyAssigned { address: "a".to_string(), number: 1 })
        );
    }

    #[test]
    fn test_unknown_number() {
        let index = WalletNumberIndex::new();
        assert!(matches!(index.resolve_number(1), Err(IndexError::NotFound(_))));
        assert_eq!(index.resolve_address("a"), None);
    }

    #[test]
    fn test_retired_numbers_are_not_reused() {
        let mut index = WalletNumberIndex::new();
        index.assign_next("a").expect("Failed to assign");
        index.assign_next("b").expect("Failed to assign");

        assert_eq!(index.retire("b"), Some(2));
        assert_eq!(index.retire("b"), None);
        assert!(index.resolve_number(2).is_err());
        assert_eq!(index.assign_next("c").expect("Failed to assign"), 3);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut index = WalletNumberIndex::new();
        index.assign_next("a").expect("Failed to assign");
        index.assign_next("b").expect("Failed to assign");
        index.retire("b");

        let snapshot = index.snapshot();
        assert_eq!(snapshot.highest_assigned, 2);

        let restored = WalletNumberIndex::from_snapshot(&snapshot).expect("Failed to restore index");
        assert_eq!(restored, index);
        assert_eq!(restored.next_number(), 3);
    }

    #[test]
    fn test_inconsistent_snapshots_rejected() {
        let mut entries = BTreeMap::new();
        entries.insert(1, "a".to_string());
        entries.insert(2, "a".to_string());
        assert!(WalletNumberIndex::from_snapshot(&IndexSnapshot::new(2, entries)).is_err());

        let mut entries = BTreeMap::new();
        entries.insert(5, "a".to_string());
        assert!(WalletNumberIndex::from_snapshot(&IndexSnapshot::new(3, entries)).is_err());

        let mut entries = BTreeMap::new();
        entries.insert(0, "a".to_string());
        assert!(WalletNumberIndex::from_snapshot(&IndexSnapshot::new(3, entries)).is_err());
    }

    #[test]
    fn test_rebuild_keeps_sequences() {
        let records = vec![("a", 1), ("c", 3), ("d", 4)];
        let index = WalletNumberIndex::rebuild(records, 4);

        assert_eq!(index.resolve_number(1).expect("Failed to resolve"), "a");
        assert_eq!(index.resolve_number(3).expect("Failed to resolve"), "c");
        assert!(index.resolve_number(2).is_err());
        assert_eq!(index.next_number(), 5);
    }

    #[test]
    fn test_rebuild_assigns_fresh_numbers_after_highest() {
        // "x" has no sequence, "y" collides with "a"
        let records = vec![("a", 1), ("x", 0), ("y", 1), ("b", 2)];
        let index = WalletNumberIndex::rebuild(records, 6);

        assert_eq!(index.resolve_address("a"), Some(1));
        assert_eq!(index.resolve_address("b"), Some(2));
        assert_eq!(index.resolve_address("x"), Some(7));
        assert_eq!(index.resolve_address("y"), Some(8));
        assert_eq!(index.len(), 4);
    }
}
