/**
 * Reading and writing banks through a durable keyed byte store.
 *
 * The store itself is behind the `PersistenceGateway` trait so that the host
 * application can supply its own storage. Two implementations ship with the crate:
 * one JSON file per topic key, and a single-table SQLite database.
 *
 * Author:  Ian Fisher (iafisher@fastmail.com)
 * Version: August 2026
 */
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use super::bank::Bank;
use super::common::{BankError, Result};


/// A durable keyed byte store. Implementations must guarantee that `save` is atomic
/// (no reader ever observes a partial write) and that distinct keys map to distinct
/// storage locations.
pub trait PersistenceGateway {
    /// Return the bytes stored under `key`, or `None` if nothing has been stored
    /// there. Unreadable storage is also reported as `None`; the bank store treats it
    /// the same as absence.
    fn load(&self, key: &str) -> Option<Vec<u8>>;

    /// Durably store `data` under `key`.
    fn save(&self, key: &str, data: &[u8]) -> Result<()>;
}


/// A gateway that keeps one JSON file per key inside a root directory.
pub struct FileGateway {
    dir: PathBuf,
}


impl FileGateway {
    pub fn new(dir: PathBuf) -> Self {
        FileGateway { dir }
    }

    /// Return a gateway rooted in the per-user application data directory, creating
    /// the directory if necessary.
    pub fn in_app_dir() -> Result<FileGateway> {
        let mut dirpath = dirs::data_dir().ok_or(BankError::CannotMakeAppDir)?;
        dirpath.push("recap");
        dirpath.push("banks");
        fs::create_dir_all(&dirpath).or(Err(BankError::CannotMakeAppDir))?;
        Ok(FileGateway::new(dirpath))
    }

    /// Return the path to the file where the bank for `key` is stored. The key is
    /// percent-encoded so that distinct keys never collide on one path.
    fn bank_path(&self, key: &str) -> PathBuf {
        let mut path = self.dir.clone();
        path.push(format!("{}.json", urlencoding::encode(key)));
        path
    }
}


impl PersistenceGateway for FileGateway {
    fn load(&self, key: &str) -> Option<Vec<u8>> {
        match fs::read(self.bank_path(key)) {
            Ok(data) => Some(data),
            Err(_) => None,
        }
    }

    fn save(&self, key: &str, data: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(BankError::Io)?;

        // Write the whole blob to a scratch file and rename it over the real one, so
        // a concurrent reader sees either the old bank or the new bank, never a mix.
        let path = self.bank_path(key);
        let mut scratch = path.clone();
        scratch.set_extension("json.tmp");
        fs::write(&scratch, data).or(Err(BankError::CannotWriteToFile(scratch.clone())))?;
        fs::rename(&scratch, &path).or(Err(BankError::CannotWriteToFile(path)))?;
        Ok(())
    }
}


/// A gateway that keeps every bank in one SQLite table, keyed by topic.
pub struct SqliteGateway {
    connection: Mutex<Connection>,
}


impl SqliteGateway {
    /// Open the database at `path`, creating it and the banks table if necessary.
    pub fn open(path: &Path) -> Result<SqliteGateway> {
        let connection = Connection::open(path).map_err(BankError::Sql)?;
        SqliteGateway::init(connection)
    }

    /// Open a database that lives only in memory. Useful for tests.
    pub fn open_in_memory() -> Result<SqliteGateway> {
        let connection = Connection::open_in_memory().map_err(BankError::Sql)?;
        SqliteGateway::init(connection)
    }

    fn init(connection: Connection) -> Result<SqliteGateway> {
        connection
            .execute(
                "
            CREATE TABLE IF NOT EXISTS banks(
              key TEXT NOT NULL PRIMARY KEY,
              data BLOB NOT NULL,
              updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
                [],
            )
            .map_err(BankError::Sql)?;
        Ok(SqliteGateway { connection: Mutex::new(connection) })
    }
}


impl PersistenceGateway for SqliteGateway {
    fn load(&self, key: &str) -> Option<Vec<u8>> {
        let connection = self.connection.lock();
        let row = connection
            .query_row("SELECT data FROM banks WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional();

        match row {
            Ok(data) => data,
            Err(e) => {
                warn!("could not read bank for key '{}' ({})", key, e);
                None
            }
        }
    }

    fn save(&self, key: &str, data: &[u8]) -> Result<()> {
        let connection = self.connection.lock();
        // A single statement, so the replacement is atomic per key.
        connection
            .execute(
                "INSERT OR REPLACE INTO banks(key, data) VALUES (?1, ?2)",
                params![key, data],
            )
            .map_err(BankError::Sql)?;
        Ok(())
    }
}


/// Loads and saves one topic's bank through a gateway.
///
/// A bank that is absent or cannot be decoded loads as an empty bank: the scheduler
/// favors staying available over refusing to operate on a damaged blob. Save
/// failures, on the other hand, are always returned to the caller, because a failed
/// save means the mutation was not durably persisted.
pub struct BankStore<G: PersistenceGateway> {
    gateway: G,
}


impl<G: PersistenceGateway> BankStore<G> {
    pub fn new(gateway: G) -> Self {
        BankStore { gateway }
    }

    /// Deserialize the bank stored under `key`. Absent and corrupt blobs both yield
    /// an empty bank; corruption is logged but deliberately not an error.
    pub fn load(&self, key: &str) -> Bank {
        let data = match self.gateway.load(key) {
            Some(data) => data,
            None => {
                debug!("no stored bank for key '{}'", key);
                return Bank::new();
            }
        };

        match serde_json::from_slice(&data) {
            Ok(bank) => bank,
            Err(e) => {
                warn!("discarding corrupt bank for key '{}' ({})", key, e);
                Bank::new()
            }
        }
    }

    /// Serialize `bank` and store it under `key`.
    pub fn save(&self, key: &str, bank: &Bank) -> Result<()> {
        let serialized = serde_json::to_string_pretty(bank).map_err(BankError::Json)?;
        self.gateway.save(key, serialized.as_bytes())?;
        debug!("saved {} items for key '{}'", bank.items.len(), key);
        Ok(())
    }
}
