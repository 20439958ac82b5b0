/**
 * A per-topic bank of quiz questions with an adaptive review scheduler.
 *
 * Callers hand the `Scheduler` a topic key plus a batch of authored items to merge, a
 * desired sample size to select, or an attempt outcome to record. Every operation
 * loads the topic's bank from a durable keyed store, transforms it in memory, and
 * writes it back if it changed. Selection favors items the user answers incorrectly
 * often, items not reviewed recently, and items of moderate difficulty.
 *
 * Author:  Ian Fisher (iafisher@fastmail.com)
 * Version: August 2026
 */
pub mod bank;
pub mod common;
pub mod persistence;
pub mod repetition;
pub mod scheduler;

pub use self::bank::{Bank, Item};
pub use self::common::{BankError, FilterOptions, Result, SelectOptions};
pub use self::persistence::{BankStore, FileGateway, PersistenceGateway, SqliteGateway};
pub use self::scheduler::Scheduler;
