/**
 * Choose the most valuable questions to review based on past results.
 *
 * Each item gets a scalar weight combining three signals: how often the user answers
 * it incorrectly, how long ago it was last reviewed, and its difficulty. An item that
 * has never been answered is treated as moderately risky and a week overdue, so new
 * items compete for selection instead of being starved by items with real history.
 *
 * Author:  Ian Fisher (iafisher@fastmail.com)
 * Version: August 2026
 */
use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::bank::{Bank, Item};
use super::common::{FilterOptions, SelectOptions};


// The wrong rate assumed for an item that has never been answered.
const UNSEEN_WRONG_RATE: f64 = 0.5;
// The age in days assumed for an item that has never been answered.
const UNSEEN_AGE_DAYS: f64 = 7.0;
// Items at or below this difficulty are resurfaced more aggressively than harder
// ones.
const EASY_DIFFICULTY_CUTOFF: i32 = 3;
const EASY_DIFFICULTY_BIAS: f64 = 1.2;
const HARD_DIFFICULTY_BIAS: f64 = 0.8;


/// Compute the priority weight of `item` at time `now`. Pure: the caller passes the
/// clock in, so results are reproducible.
pub fn weight(item: &Item, now: DateTime<Utc>) -> f64 {
    let wrong_rate = if item.attempts > 0 {
        (item.wrongs as f64) / (item.attempts as f64)
    } else {
        UNSEEN_WRONG_RATE
    };

    let age_days = if let Some(last) = item.last_answered_at {
        days_between(last, now).max(1.0)
    } else {
        UNSEEN_AGE_DAYS
    };

    let bias = if item.difficulty <= EASY_DIFFICULTY_CUTOFF {
        EASY_DIFFICULTY_BIAS
    } else {
        HARD_DIFFICULTY_BIAS
    };

    wrong_rate * bias * (age_days + 1.0).ln()
}


/// Choose up to `options.num_to_take` items to review: filter by tags, then rank by
/// weight, heaviest first. `sort_by` is stable, so items of equal weight stay in bank
/// order and the result is deterministic.
pub fn choose_items<'a>(
    bank: &'a Bank, options: &SelectOptions, now: DateTime<Utc>
) -> Vec<&'a Item> {
    let mut weighted = Vec::new();
    for item in bank.items.iter() {
        if filter_item(item, &options.filter_opts) {
            weighted.push((weight(item, now), item));
        }
    }

    weighted.sort_by(cmp_weighted);
    weighted.truncate(options.num_to_take);
    weighted.into_iter().map(|(_, item)| item).collect()
}


/// Return the `num_to_take` heaviest items in the bank with no filtering applied.
/// Never returns more than the bank holds; `num_to_take` of zero yields nothing.
pub fn select_top<'a>(bank: &'a Bank, num_to_take: usize, now: DateTime<Utc>) -> Vec<&'a Item> {
    choose_items(bank, &SelectOptions::new(num_to_take), now)
}


/// Return the items that have ever been answered incorrectly, in bank order. This is
/// a plain filter for remediation sessions; no weighting is applied.
pub fn select_wrong_only(bank: &Bank) -> Vec<&Item> {
    let mut chosen = Vec::new();
    for item in bank.items.iter() {
        if item.wrongs > 0 {
            chosen.push(item);
        }
    }
    chosen
}


/// Return `true` if `item` satisfies the constraints in `options`.
pub fn filter_item(item: &Item, options: &FilterOptions) -> bool {
    // Either no tags were specified, or the item has all the specified tags.
    (options.tags.len() == 0 || options.tags.iter().all(|tag| item.tags.contains(tag)))
        // The item must not have any excluded tags.
        && options.exclude.iter().all(|tag| !item.tags.contains(tag))
}


/// Comparison function that sorts weighted items such that the heaviest come first.
fn cmp_weighted(a: &(f64, &Item), b: &(f64, &Item)) -> Ordering {
    if a.0 < b.0 {
        Ordering::Greater
    } else if a.0 > b.0 {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}


fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let seconds = later.signed_duration_since(earlier).num_seconds();
    (seconds as f64) / 86400.0
}
