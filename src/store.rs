//! Persistence for the consent decision: the [`Storage`] trait (the injected
//! handle to a browser-local-storage-like area) and [`ConsentStore`], which
//! reads a validated [`ConsentState`] out of it and writes fresh records
//! into it. The store's public operations never fail; every storage failure
//! degrades to "no decision".

use crate::policy::Policy;
use crate::record::{ConsentRecord, ConsentState};
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

/// A handle to a persistent storage area holding one string value per key.
/// Implementations make no atomicity promise across concurrent writers
/// (multiple browser tabs, multiple processes); last write wins.
pub trait Storage {
    /// Returns the value stored under `key`, or `None` if there is none.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes the entry for `key`. Removing a missing entry is not an
    /// error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Reads and writes the consent record under a [`Policy`]. Owns its storage
/// handle; constructed once per page load.
pub struct ConsentStore<S> {
    storage: S,
    policy: Policy,
}

impl<S: Storage> ConsentStore<S> {
    pub fn new(storage: S, policy: Policy) -> ConsentStore<S> {
        ConsentStore { storage, policy }
    }

    /// The policy this store validates records against.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Derives the stored decision. Never fails: an unavailable storage
    /// area, a missing value, a malformed record, and a record from a
    /// superseded policy version all read as [`ConsentState::Unknown`].
    pub fn read(&self) -> ConsentState {
        let value = match self.storage.get(&self.policy.storage_key) {
            Ok(Some(value)) => value,
            Ok(None) => return ConsentState::Unknown,
            Err(err) => {
                debug!("consent storage unavailable on read: {}", err);
                return ConsentState::Unknown;
            }
        };
        match serde_json::from_str::<ConsentRecord>(&value) {
            Ok(record) => {
                let state = record.state(&self.policy);
                if !state.is_decided() {
                    debug!(
                        "discarding consent record from policy version {:?} (current is {:?})",
                        record.version, self.policy.version
                    );
                }
                state
            }
            Err(err) => {
                warn!("discarding malformed consent record: {}", err);
                ConsentState::Unknown
            }
        }
    }

    /// Persists a fresh record for `consent` under the current policy
    /// version, stamped with the current time. A failed write is logged and
    /// otherwise ignored: the decision still takes effect for this page
    /// load, and the user is prompted again on the next one.
    pub fn write(&mut self, consent: bool) {
        let record = ConsentRecord::new(consent, &self.policy);
        let value = match serde_json::to_string(&record) {
            Ok(value) => value,
            Err(err) => {
                warn!("failed to serialize consent record: {}", err);
                return;
            }
        };
        if let Err(err) = self.storage.set(&self.policy.storage_key, &value) {
            warn!("failed to persist consent decision: {}", err);
        }
    }

    /// Deletes the stored record, if any. The page-load flow never calls
    /// this; it backs the operator's `consentctl reset`.
    pub fn clear(&mut self) {
        if let Err(err) = self.storage.remove(&self.policy.storage_key) {
            warn!("failed to clear consent record: {}", err);
        }
    }
}

/// An in-memory [`Storage`] for tests and fakes.
#[derive(Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A [`Storage`] keeping each key in its own file under a directory. The
/// file-backed analog of the browser's storage area, used by `consentctl`.
/// A missing file reads as an absent entry, mirroring empty storage.
pub struct FileStorage {
    directory: PathBuf,
}

impl FileStorage {
    pub fn new(directory: PathBuf) -> FileStorage {
        FileStorage { directory }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.entry_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::Io(err)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.directory)?;
        fs::write(self.entry_path(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::Io(err)),
        }
    }
}

/// The result of a fallible [`Storage`] operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure of the underlying storage area. [`ConsentStore`]
/// swallows these; they never escape the component.
#[derive(Debug)]
pub enum Error {
    /// The storage area cannot be used at all (privacy mode, quota,
    /// storage disabled).
    Unavailable,

    /// An I/O error from a file-backed storage area.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible file operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Unavailable => write!(f, "storage unavailable"),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Unavailable => None,
            Error::Io(err) => Some(err),
        }
    }
}
