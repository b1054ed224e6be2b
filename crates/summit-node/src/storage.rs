//! Persistent storage using RocksDB.
//!
//! Everything is stored as JSON blobs under prefixed keys (`demon:`,
//! `completion:`, `account:`). An empty database loads as empty
//! collections, never as an error. Multi-record commits go through a
//! `WriteBatch` so a cascading position shift lands atomically.

use crate::account::Account;
use crate::error::Result;
use rocksdb::{Options, WriteBatch, DB};
use std::path::Path;
use summit_core::{Completion, Demon};

const DEMON_PREFIX: &str = "demon:";
const COMPLETION_PREFIX: &str = "completion:";
const ACCOUNT_PREFIX: &str = "account:";

/// Storage backend for Summit data.
pub struct Storage {
    db: DB,
}

impl Storage {
    /// Open or create storage at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path)?;
        Ok(Self { db })
    }

    // --- Demons ---

    /// Store one demon.
    pub fn put_demon(&self, demon: &Demon) -> Result<()> {
        let key = format!("{}{}", DEMON_PREFIX, demon.id);
        let value = serde_json::to_vec(demon)?;
        self.db.put(key.as_bytes(), value)?;
        Ok(())
    }

    /// Get a demon by id.
    pub fn get_demon(&self, id: &str) -> Result<Option<Demon>> {
        let key = format!("{}{}", DEMON_PREFIX, id);
        match self.db.get(key.as_bytes())? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    /// Persist the full demon collection in one atomic batch, deleting
    /// `removed` ids. Cascading shifts touch many demons at once; either
    /// all of them land or none do.
    pub fn commit_demons(&self, demons: &[&Demon], removed: &[&str]) -> Result<()> {
        let mut batch = WriteBatch::default();
        for id in removed {
            batch.delete(format!("{}{}", DEMON_PREFIX, id).as_bytes());
        }
        for demon in demons {
            let key = format!("{}{}", DEMON_PREFIX, demon.id);
            batch.put(key.as_bytes(), serde_json::to_vec(demon)?);
        }
        self.db.write(batch)?;
        Ok(())
    }

    /// Load all demons.
    pub fn load_demons(&self) -> Result<Vec<Demon>> {
        self.load_prefixed(DEMON_PREFIX)
    }

    // --- Completions ---

    /// Store one completion.
    pub fn put_completion(&self, completion: &Completion) -> Result<()> {
        let key = format!("{}{}", COMPLETION_PREFIX, completion.id);
        let value = serde_json::to_vec(completion)?;
        self.db.put(key.as_bytes(), value)?;
        Ok(())
    }

    /// Load all completions.
    pub fn load_completions(&self) -> Result<Vec<Completion>> {
        self.load_prefixed(COMPLETION_PREFIX)
    }

    // --- Accounts ---

    /// Store one account.
    pub fn put_account(&self, account: &Account) -> Result<()> {
        let key = format!("{}{}", ACCOUNT_PREFIX, account.username);
        let value = serde_json::to_vec(account)?;
        self.db.put(key.as_bytes(), value)?;
        Ok(())
    }

    /// Get an account by username.
    pub fn get_account(&self, username: &str) -> Result<Option<Account>> {
        let key = format!("{}{}", ACCOUNT_PREFIX, username);
        match self.db.get(key.as_bytes())? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    /// Load all accounts.
    pub fn load_accounts(&self) -> Result<Vec<Account>> {
        self.load_prefixed(ACCOUNT_PREFIX)
    }

    fn load_prefixed<T: serde::de::DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let iter = self.db.prefix_iterator(prefix.as_bytes());
        for item in iter {
            let (key, value) = item?;
            if key.starts_with(prefix.as_bytes()) {
                items.push(serde_json::from_slice(&value)?);
            } else {
                break;
            }
        }
        Ok(items)
    }
}
