/**
 * Definitions of data structures used by several modules, such as `BankError` and the
 * options structs that control selection.
 *
 * Author:  Ian Fisher (iafisher@fastmail.com)
 * Version: August 2026
 */
use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;


pub type Result<T> = std::result::Result<T, BankError>;


#[derive(Debug)]
pub enum BankError {
    /// For JSON errors.
    Json(serde_json::Error),
    /// For errors from the SQLite gateway.
    Sql(rusqlite::Error),
    /// For when the application directory cannot be created.
    CannotMakeAppDir,
    CannotWriteToFile(PathBuf),
    Io(io::Error),
    /// For items rejected at the merge boundary. `index` is the position of the
    /// offending item within the batch.
    InvalidItem { index: usize, message: String },
}


impl fmt::Display for BankError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BankError::Json(ref err) => {
                write!(f, "JSON error ({})", err)
            },
            BankError::Sql(ref err) => {
                write!(f, "database error ({})", err)
            },
            BankError::CannotMakeAppDir => {
                write!(f, "unable to create application directory")
            },
            BankError::CannotWriteToFile(ref path) => {
                write!(f, "cannot write to file '{}'", path.to_string_lossy())
            },
            BankError::Io(ref err) => {
                write!(f, "IO error ({})", err)
            },
            BankError::InvalidItem { index, ref message } => {
                write!(f, "invalid item at position {} in batch ({})", index, message)
            },
        }
    }
}


impl error::Error for BankError {
    fn cause(&self) -> Option<&dyn error::Error> {
        match *self {
            BankError::Json(ref err) => Some(err),
            BankError::Sql(ref err) => Some(err),
            BankError::Io(ref err) => Some(err),
            _ => None,
        }
    }
}


/// These filtering options are shared between the `select` and `count` operations.
#[derive(Clone, Debug)]
pub struct FilterOptions {
    /// Only include items with the given tags.
    pub tags: Vec<String>,
    /// Exclude items with the given tags.
    pub exclude: Vec<String>,
}


/// Holds the configuration for one selection pass.
#[derive(Clone, Debug)]
pub struct SelectOptions {
    /// Limit the total number of items.
    pub num_to_take: usize,
    pub filter_opts: FilterOptions,
}


impl FilterOptions {
    pub fn new() -> Self {
        FilterOptions {
            tags: Vec::new(), exclude: Vec::new(),
        }
    }
}


impl SelectOptions {
    pub fn new(num_to_take: usize) -> Self {
        SelectOptions {
            num_to_take, filter_opts: FilterOptions::new(),
        }
    }
}
