/**
 * The `Item` and `Bank` data structures, and the two operations that mutate a bank in
 * memory: merging a batch of authored items and recording the outcome of an attempt.
 *
 * Author:  Ian Fisher (iafisher@fastmail.com)
 * Version: August 2026
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{BankError, Result};


/// Represents one quiz question plus its accumulated answer history.
///
/// Optional and history fields carry `serde(default)` so that blobs written before a
/// field existed still load.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Item {
    /// Identifier of the question, stable across merges. Unique within a bank.
    pub id: String,
    /// The text of the question.
    pub text: String,
    /// Carried through unchanged for the host application; never consulted when
    /// scheduling.
    #[serde(default)]
    pub correct_flag: bool,
    /// Supplementary text shown after answering.
    #[serde(default)]
    pub explanation: String,
    /// Intended to range from 1 to 5. Out-of-range values are not rejected.
    #[serde(default)]
    pub difficulty: i32,
    /// User-defined tags for the question.
    #[serde(default)]
    pub tags: Vec<String>,
    /// How many times the question has been presented and answered.
    #[serde(default)]
    pub attempts: u32,
    /// How many of those attempts were answered incorrectly. Never exceeds
    /// `attempts`.
    #[serde(default)]
    pub wrongs: u32,
    /// When the question was last answered. Absent until the first attempt.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_answered_at: Option<DateTime<Utc>>,
}


/// Represents the entire question collection for one topic, in insertion/merge order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Bank {
    #[serde(default)]
    pub items: Vec<Item>,
}


impl Item {
    /// Return a new item with no answer history.
    pub fn new(id: &str, text: &str) -> Self {
        Item {
            id: String::from(id),
            text: String::from(text),
            correct_flag: false,
            explanation: String::new(),
            difficulty: 3,
            tags: Vec::new(),
            attempts: 0,
            wrongs: 0,
            last_answered_at: None,
        }
    }
}


impl Bank {
    pub fn new() -> Self {
        Bank { items: Vec::new() }
    }

    /// Merge a batch of items into the bank. An item whose id is already present
    /// replaces the stored item wholesale, history fields included, even when the
    /// incoming history is zeroed; anything else is appended in the order given. No
    /// item is ever removed, and merging the same batch twice leaves the same bank as
    /// merging it once.
    ///
    /// The whole batch is checked before anything is applied, so a rejected batch
    /// leaves the bank untouched.
    pub fn merge_batch(&mut self, batch: Vec<Item>) -> Result<()> {
        for (index, item) in batch.iter().enumerate() {
            validate_item(item, index)?;
        }

        for item in batch.into_iter() {
            let existing = self.items.iter().position(|e| e.id == item.id);
            if let Some(index) = existing {
                self.items[index] = item;
            } else {
                self.items.push(item);
            }
        }
        Ok(())
    }

    /// Record the outcome of one attempt at the item with the given id: bump
    /// `attempts`, bump `wrongs` on an incorrect answer, and stamp
    /// `last_answered_at`. Return `false` and leave the bank untouched if no item has
    /// that id.
    pub fn record_result(&mut self, id: &str, was_correct: bool, now: DateTime<Utc>) -> bool {
        for item in self.items.iter_mut() {
            if item.id == id {
                item.attempts += 1;
                if !was_correct {
                    item.wrongs += 1;
                }
                item.last_answered_at = Some(now);
                return true;
            }
        }
        false
    }

    /// Return the item with the given id, if any.
    pub fn find(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }
}


/// Check the invariants enforced at the merge boundary. `difficulty` is deliberately
/// not range-checked.
fn validate_item(item: &Item, index: usize) -> Result<()> {
    if item.id.len() == 0 {
        return Err(BankError::InvalidItem {
            index,
            message: String::from("empty id"),
        });
    }
    if item.text.len() == 0 {
        return Err(BankError::InvalidItem {
            index,
            message: String::from("empty text"),
        });
    }
    if item.wrongs > item.attempts {
        return Err(BankError::InvalidItem {
            index,
            message: String::from("wrongs exceeds attempts"),
        });
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_appends_new_items_in_order() {
        let mut bank = Bank::new();
        bank.merge_batch(vec![question("q1"), question("q2")]).unwrap();
        bank.merge_batch(vec![question("q3")]).unwrap();

        let ids: Vec<&str> = bank.items.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2", "q3"]);
    }

    #[test]
    fn merge_replaces_existing_items_wholesale() {
        let mut bank = Bank::new();
        let mut q = question("q1");
        q.attempts = 4;
        q.wrongs = 2;
        q.last_answered_at = Some(Utc::now());
        bank.merge_batch(vec![q, question("q2")]).unwrap();

        let mut replacement = question("q1");
        replacement.text = String::from("What is the capital of Chile?");
        bank.merge_batch(vec![replacement]).unwrap();

        assert_eq!(bank.items.len(), 2);
        let merged = bank.find("q1").unwrap();
        assert_eq!(merged.text, "What is the capital of Chile?");
        // The replacement's zeroed history wins; that is the contract.
        assert_eq!(merged.attempts, 0);
        assert_eq!(merged.wrongs, 0);
        assert!(merged.last_answered_at.is_none());
        // Replacement happens in place, not at the end.
        assert_eq!(bank.items[0].id, "q1");
    }

    #[test]
    fn merge_is_idempotent_for_identical_batches() {
        let batch = vec![question("q1"), question("q2")];

        let mut once = Bank::new();
        once.merge_batch(batch.clone()).unwrap();

        let mut twice = Bank::new();
        twice.merge_batch(batch.clone()).unwrap();
        twice.merge_batch(batch).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn merge_rejects_malformed_items_without_applying_any() {
        let mut bank = Bank::new();
        bank.merge_batch(vec![question("q1")]).unwrap();

        let mut bad = question("q2");
        bad.wrongs = 3;
        let result = bank.merge_batch(vec![question("q3"), bad]);

        assert!(result.is_err());
        // The batch is checked up front, so not even the valid item was applied.
        assert_eq!(bank.items.len(), 1);
    }

    #[test]
    fn merge_rejects_empty_ids_and_text() {
        let mut bank = Bank::new();
        assert!(bank.merge_batch(vec![question("")]).is_err());
        assert!(bank.merge_batch(vec![Item::new("q1", "")]).is_err());
        assert_eq!(bank.items.len(), 0);
    }

    #[test]
    fn recording_an_incorrect_attempt_updates_history() {
        let mut bank = Bank::new();
        bank.merge_batch(vec![question("q1")]).unwrap();

        let now = Utc::now();
        assert!(bank.record_result("q1", false, now));

        let q = bank.find("q1").unwrap();
        assert_eq!(q.attempts, 1);
        assert_eq!(q.wrongs, 1);
        assert_eq!(q.last_answered_at, Some(now));
    }

    #[test]
    fn recording_a_correct_attempt_leaves_wrongs_alone() {
        let mut bank = Bank::new();
        bank.merge_batch(vec![question("q1")]).unwrap();

        let now = Utc::now();
        assert!(bank.record_result("q1", true, now));

        let q = bank.find("q1").unwrap();
        assert_eq!(q.attempts, 1);
        assert_eq!(q.wrongs, 0);
        assert_eq!(q.last_answered_at, Some(now));
    }

    #[test]
    fn recording_against_an_unknown_id_is_a_no_op() {
        let mut bank = Bank::new();
        bank.merge_batch(vec![question("q1")]).unwrap();

        let before = bank.clone();
        assert!(!bank.record_result("q2", false, Utc::now()));
        assert_eq!(bank, before);
    }

    fn question(id: &str) -> Item {
        Item::new(id, "What is the capital of Mongolia?")
    }
}
