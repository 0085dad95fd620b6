//! Embedded key-value store.
//!
//! Wraps a `redb` database, declares the nine named keyspaces the graph
//! layer depends on, and exposes two transactional primitives: a read view
//! and a write view. Graph and engine code never touches `redb` directly —
//! everything routes through [`Store::read`] / [`Store::write`] and the
//! typed accessors on [`ReadView`] / [`WriteView`].

use crate::codec;
use crate::error::{Error, Result};
use crate::ids::Id;
use redb::{Database, ReadTransaction, ReadableTable, TableDefinition, WriteTransaction};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::{instrument, warn};

use crate::config::EngineConfig;

pub(crate) const USER: TableDefinition<&[u8], &[u8]> = TableDefinition::new("user");
pub(crate) const ITEM: TableDefinition<&[u8], &[u8]> = TableDefinition::new("item");
pub(crate) const USER_LIKES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("userLikes");
pub(crate) const USER_DISLIKES: TableDefinition<&[u8], &[u8]> =
    TableDefinition::new("userDislikes");
pub(crate) const ITEM_LIKES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("itemLikes");
pub(crate) const ITEM_DISLIKES: TableDefinition<&[u8], &[u8]> =
    TableDefinition::new("itemDislikes");
pub(crate) const USER_SIMILARITY: TableDefinition<&[u8], &[u8]> =
    TableDefinition::new("userSimilarity");
/// Reserved for a future item-to-item similarity algorithm. Declared so the
/// keyspace exists but never read or written by the current engine.
pub(crate) const ITEM_SIMILARITY: TableDefinition<&[u8], &[u8]> =
    TableDefinition::new("itemSimilarity");
pub(crate) const SUGGESTIONS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("suggestions");

const ALL_TABLES: &[TableDefinition<&[u8], &[u8]>] = &[
    USER,
    ITEM,
    USER_LIKES,
    USER_DISLIKES,
    ITEM_LIKES,
    ITEM_DISLIKES,
    USER_SIMILARITY,
    ITEM_SIMILARITY,
    SUGGESTIONS,
];

/// Handle to the embedded store. Cheap to share by reference; internally
/// synchronizes writers the way `redb` itself does.
pub struct Store {
    db: RwLock<Option<Database>>,
    path: PathBuf,
}

impl Store {
    /// Open (creating if necessary) the store file named by `config`, and
    /// ensure all nine keyspaces exist.
    #[instrument(skip(config), fields(path = %config.store_path.display()))]
    pub fn open(config: &EngineConfig) -> Result<Self> {
        let mut builder = Database::builder();
        if let Some(bytes) = config.cache_size_bytes {
            builder.set_cache_size(bytes);
        }
        let db = builder
            .create(&config.store_path)
            .map_err(|e| Error::store_unavailable(&config.store_path, e))?;

        let store = Self {
            db: RwLock::new(Some(db)),
            path: config.store_path.clone(),
        };
        store.ensure_tables()?;
        Ok(store)
    }

    fn ensure_tables(&self) -> Result<()> {
        self.write(|view| {
            for table in ALL_TABLES {
                // Opening a table for write creates it if absent.
                view.txn.open_table(*table)?;
            }
            Ok(())
        })
    }

    /// Path to the underlying store file.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Run `f` against a read-only view of the store. Concurrent readers
    /// never block each other or a writer.
    pub fn read<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ReadView) -> Result<T>,
    {
        let guard = self.db.read().expect("store lock poisoned");
        let db = guard.as_ref().ok_or(Error::StoreClosed)?;
        let txn = db.begin_read()?;
        let view = ReadView { txn: &txn };
        f(&view)
    }

    /// Run `f` against a read-write view of the store inside a single
    /// `redb` write transaction. If `f` returns `Ok`, the transaction
    /// commits atomically; if it returns `Err`, the transaction is dropped
    /// (aborted) and the store is left unchanged.
    pub fn write<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&WriteView) -> Result<T>,
    {
        let guard = self.db.read().expect("store lock poisoned");
        let db = guard.as_ref().ok_or(Error::StoreClosed)?;
        let txn = db.begin_write()?;
        let view = WriteView { txn: &txn };
        match f(&view) {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(e) => Err(e),
        }
    }

    /// Release the store handle. Subsequent operations fail with
    /// [`Error::StoreClosed`].
    #[instrument(skip(self))]
    pub fn close(&self) {
        let mut guard = self.db.write().expect("store lock poisoned");
        *guard = None;
    }
}

/// A read-only view into the store, scoped to a single `redb` read
/// transaction.
pub struct ReadView<'a> {
    txn: &'a ReadTransaction,
}

impl<'a> ReadView<'a> {
    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: TableDefinition<&[u8], &[u8]>,
        entity_type: &'static str,
        key: &Id,
    ) -> Result<Option<T>> {
        let table = self.txn.open_table(table)?;
        match table.get(key.as_bytes())? {
            Some(guard) => Ok(Some(codec::decode(entity_type, guard.value())?)),
            None => Ok(None),
        }
    }

    /// Load the id-set stored at `key` in `table`, or the empty set if
    /// absent.
    pub(crate) fn get_set(&self, table: TableDefinition<&[u8], &[u8]>, key: &Id) -> Result<HashSet<Id>> {
        Ok(self
            .get_record::<HashSet<Id>>(table, "id-set", key)?
            .unwrap_or_default())
    }

    /// Load the id-keyed map stored at `key` in `table`, or the empty map if
    /// absent.
    pub(crate) fn get_map<V: DeserializeOwned>(
        &self,
        table: TableDefinition<&[u8], &[u8]>,
        entity_type: &'static str,
        key: &Id,
    ) -> Result<HashMap<Id, V>> {
        Ok(self
            .get_record::<HashMap<Id, V>>(table, entity_type, key)?
            .unwrap_or_default())
    }
}

/// A read-write view into the store, scoped to a single `redb` write
/// transaction.
pub struct WriteView<'a> {
    txn: &'a WriteTransaction,
}

impl<'a> WriteView<'a> {
    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: TableDefinition<&[u8], &[u8]>,
        entity_type: &'static str,
        key: &Id,
    ) -> Result<Option<T>> {
        let t = self.txn.open_table(table)?;
        match t.get(key.as_bytes())? {
            Some(guard) => Ok(Some(codec::decode(entity_type, guard.value())?)),
            None => Ok(None),
        }
    }

    pub(crate) fn put_record<T: Serialize>(
        &self,
        table: TableDefinition<&[u8], &[u8]>,
        entity_type: &'static str,
        key: &Id,
        value: &T,
    ) -> Result<()> {
        let bytes = codec::encode(entity_type, value)?;
        let mut t = self.txn.open_table(table)?;
        t.insert(key.as_bytes(), bytes.as_slice())?;
        Ok(())
    }

    /// True if `table` has an entry at `key`, without decoding it.
    pub(crate) fn contains_key(&self, table: TableDefinition<&[u8], &[u8]>, key: &Id) -> Result<bool> {
        let t = self.txn.open_table(table)?;
        Ok(t.get(key.as_bytes())?.is_some())
    }

    pub(crate) fn get_set(&self, table: TableDefinition<&[u8], &[u8]>, key: &Id) -> Result<HashSet<Id>> {
        Ok(self
            .get_record::<HashSet<Id>>(table, "id-set", key)?
            .unwrap_or_default())
    }

    pub(crate) fn put_set(&self, table: TableDefinition<&[u8], &[u8]>, key: &Id, set: &HashSet<Id>) -> Result<()> {
        self.put_record(table, "id-set", key, set)
    }

    pub(crate) fn get_map<V: DeserializeOwned>(
        &self,
        table: TableDefinition<&[u8], &[u8]>,
        entity_type: &'static str,
        key: &Id,
    ) -> Result<HashMap<Id, V>> {
        Ok(self
            .get_record::<HashMap<Id, V>>(table, entity_type, key)?
            .unwrap_or_default())
    }

    pub(crate) fn put_map<V: Serialize>(
        &self,
        table: TableDefinition<&[u8], &[u8]>,
        entity_type: &'static str,
        key: &Id,
        map: &HashMap<Id, V>,
    ) -> Result<()> {
        self.put_record(table, entity_type, key, map)
    }
}

/// Log (rather than fail) a reference to a record that could not be found.
/// Used on read paths, which are total per SPEC_FULL.md §7.
pub(crate) fn warn_dangling_reference(entity_type: &'static str, id: &Id) {
    warn!(entity_type, %id, "dangling reference skipped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn open_temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.redb");
        let config = EngineConfig::new(path);
        let store = Store::open(&config).unwrap();
        (dir, store)
    }

    #[test]
    fn test_open_creates_all_tables() {
        let (_dir, store) = open_temp_store();
        store
            .read(|view| {
                for table in ALL_TABLES {
                    view.txn.open_table(*table)?;
                }
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_closed_store_rejects_operations() {
        let (_dir, store) = open_temp_store();
        store.close();
        let err = store.read(|_| Ok(())).unwrap_err();
        assert!(matches!(err, Error::StoreClosed));
    }

    #[test]
    fn test_write_aborts_on_error() {
        let (_dir, store) = open_temp_store();
        let id = Id::new();
        let result: Result<()> = store.write(|view| {
            let mut set = HashSet::new();
            set.insert(Id::new());
            view.put_set(USER_LIKES, &id, &set)?;
            Err(Error::internal("simulated failure"))
        });
        assert!(result.is_err());

        let set = store.read(|view| view.get_set(USER_LIKES, &id)).unwrap();
        assert!(set.is_empty(), "aborted write must not persist");
    }
}
