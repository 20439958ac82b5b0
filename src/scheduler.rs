/**
 * The public entry point of the crate, composing the persistence layer with the pure
 * bank operations. Every call is one load → transform → save round trip against a
 * single topic key; reads never write.
 *
 * Because load, mutate, and save are three separate steps, two concurrent mutations
 * of the same topic could otherwise interleave and silently lose an update. Every
 * operation therefore runs under a per-key lock; distinct keys share no state and
 * proceed in parallel.
 *
 * Author:  Ian Fisher (iafisher@fastmail.com)
 * Version: August 2026
 */
use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use log::warn;
use parking_lot::Mutex;

use super::bank::Item;
use super::common::{FilterOptions, Result, SelectOptions};
use super::persistence::{BankStore, PersistenceGateway};
use super::repetition;


pub struct Scheduler<G: PersistenceGateway> {
    store: BankStore<G>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}


impl<G: PersistenceGateway> Scheduler<G> {
    pub fn new(gateway: G) -> Self {
        Scheduler {
            store: BankStore::new(gateway),
            locks: DashMap::new(),
        }
    }

    /// Merge a batch of authored items into the bank for `topic` and persist the
    /// result. Items whose ids are already present replace the stored items
    /// wholesale; everything else is appended. See `Bank::merge_batch`.
    pub fn merge(&self, topic: &str, batch: Vec<Item>) -> Result<()> {
        let lock = self.lock_for(topic);
        let _guard = lock.lock();

        let mut bank = self.store.load(topic);
        bank.merge_batch(batch)?;
        self.store.save(topic, &bank)
    }

    /// Return the `num_to_take` highest-priority items for `topic`.
    pub fn select_top(&self, topic: &str, num_to_take: usize) -> Vec<Item> {
        self.select(topic, &SelectOptions::new(num_to_take))
    }

    /// Return the highest-priority items for `topic` after applying the filters in
    /// `options`.
    pub fn select(&self, topic: &str, options: &SelectOptions) -> Vec<Item> {
        let lock = self.lock_for(topic);
        let _guard = lock.lock();

        let bank = self.store.load(topic);
        let chosen = repetition::choose_items(&bank, options, Utc::now());
        chosen.into_iter().cloned().collect()
    }

    /// Return the items in `topic` that have ever been answered incorrectly, in bank
    /// order, for a remediation session.
    pub fn select_wrong_only(&self, topic: &str) -> Vec<Item> {
        let lock = self.lock_for(topic);
        let _guard = lock.lock();

        let bank = self.store.load(topic);
        let chosen = repetition::select_wrong_only(&bank);
        chosen.into_iter().cloned().collect()
    }

    /// Record the outcome of one attempt at item `id` under `topic` and persist the
    /// bank. An id that is not in the bank leaves it untouched: nothing is written
    /// and the call still succeeds.
    pub fn record_result(&self, topic: &str, id: &str, was_correct: bool) -> Result<()> {
        let lock = self.lock_for(topic);
        let _guard = lock.lock();

        let mut bank = self.store.load(topic);
        if !bank.record_result(id, was_correct, Utc::now()) {
            warn!("no item with id '{}' in bank '{}'; result dropped", id, topic);
            return Ok(());
        }
        self.store.save(topic, &bank)
    }

    /// Return the number of items in `topic` that satisfy `options`.
    pub fn count(&self, topic: &str, options: &FilterOptions) -> usize {
        let lock = self.lock_for(topic);
        let _guard = lock.lock();

        let bank = self.store.load(topic);
        let mut count = 0;
        for item in bank.items.iter() {
            if repetition::filter_item(item, options) {
                count += 1;
            }
        }
        count
    }

    /// Return every tag used in `topic` with the number of items carrying it,
    /// sorted by tag.
    pub fn list_tags(&self, topic: &str) -> Vec<(String, usize)> {
        let lock = self.lock_for(topic);
        let _guard = lock.lock();

        let bank = self.store.load(topic);
        let mut tags = HashMap::<&str, usize>::new();
        for item in bank.items.iter() {
            for tag in item.tags.iter() {
                if let Some(n) = tags.get(tag.as_str()) {
                    tags.insert(tag.as_str(), n + 1);
                } else {
                    tags.insert(tag.as_str(), 1);
                }
            }
        }

        let mut tags_in_order: Vec<(String, usize)> = tags
            .into_iter()
            .map(|(tag, count)| (String::from(tag), count))
            .collect();
        tags_in_order.sort();
        tags_in_order
    }

    /// Return the lock guarding `topic`, creating it on first use. Locks live for
    /// the lifetime of the scheduler; the number of distinct topics is small.
    fn lock_for(&self, topic: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(String::from(topic))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
