use std::path::Path;

use chrono::Utc;
use redb::{
    Database,
    MultimapTableDefinition,
    ReadableDatabase,
    ReadableTable,
    Table,
    TableDefinition,
};
use tracing::{debug, info};

use crate::{component::Component, error::Result};

pub(crate) const COMPONENTS: TableDefinition<u64, &[u8]> =
    TableDefinition::new("components");

/// Equivalence set id -> member ids. Mirrors the `equiv_set` field of every
/// record so set membership can be looked up without a scan.
pub(crate) const EQUIV_MEMBERS: MultimapTableDefinition<u64, u64> =
    MultimapTableDefinition::new("equiv_members");

/// Result of [`ComponentDb::edit_record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The mutator returned `false`; nothing was written.
    Aborted,
    /// The mutator changed the record id.
    IdModified,
    /// The mutated record is identical to the stored one.
    NoChange,
    /// The record was written; carries the record as stored.
    Committed(Component),
}

impl EditOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }

    /// Reason shown to the user when the edit was not stored.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Aborted | Self::Committed(_) => "",
            Self::IdModified => "ID was modified",
            Self::NoChange => "No change",
        }
    }
}

/// Durable component storage.
///
/// Every mutation runs its whole read-modify-write inside a single redb
/// write transaction. redb admits one writer at a time, so edits and set
/// operations are serialized against each other; readers see the last
/// committed snapshot.
pub struct ComponentDb {
    pub(crate) db: Database,
}

impl ComponentDb {
    /// Open or create a component database at the given path.
    ///
    /// # Examples
    ///
    /// ```
    /// # let tmp = tempfile::tempdir().unwrap();
    /// use stuffstore::ComponentDb;
    ///
    /// let db = ComponentDb::open(&tmp.path().join("components.redb")).unwrap();
    /// assert!(db.find_by_id(1).unwrap().is_none());
    /// ```
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path)?;

        // Ensure all tables exist by opening them in a write transaction.
        let txn = db.begin_write()?;
        txn.open_table(COMPONENTS)?;
        txn.open_multimap_table(EQUIV_MEMBERS)?;
        txn.commit()?;

        Ok(Self { db })
    }

    /// Look up a component. `None` if the id was never stored.
    pub fn find_by_id(&self, id: u64) -> Result<Option<Component>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(COMPONENTS)?;
        let component = read_record(&table, id)?;
        Ok(component)
    }

    /// Edit the record with the given id, creating it if it does not exist.
    ///
    /// `mutate` receives a copy of the stored record (or an empty one for a
    /// new id) and returns whether the change should be committed. The
    /// store keeps ownership of `equiv_set` and the timestamps: whatever the
    /// mutator does to them is discarded. Use the set operations to move a
    /// component between equivalence sets.
    pub fn edit_record<F>(&self, id: u64, mutate: F) -> Result<EditOutcome>
    where
        F: FnOnce(&mut Component) -> bool,
    {
        let txn = self.db.begin_write()?;
        let outcome = {
            let mut table = txn.open_table(COMPONENTS)?;
            let stored = read_record(&table, id)?;
            let is_new = stored.is_none();
            let before = stored.unwrap_or_else(|| Component::new(id));

            let mut record = before.clone();
            if !mutate(&mut record) {
                EditOutcome::Aborted
            } else if record.id != id {
                EditOutcome::IdModified
            } else {
                record.equiv_set = before.equiv_set;
                record.created = before.created;
                record.updated = before.updated;

                if record == before {
                    EditOutcome::NoChange
                } else {
                    let now = Utc::now();
                    if is_new {
                        record.created = Some(now);
                    }
                    record.updated = Some(now);
                    write_record(&mut table, &record)?;
                    if is_new {
                        let mut members =
                            txn.open_multimap_table(EQUIV_MEMBERS)?;
                        members.insert(record.equiv_set, id)?;
                    }
                    EditOutcome::Committed(record)
                }
            }
        };

        if let EditOutcome::Committed(record) = &outcome {
            txn.commit()?;
            info!(
                "STORE {}",
                serde_json::to_string(record).unwrap_or_default()
            );
        } else {
            txn.abort()?;
            debug!(id, reason = outcome.message(), "edit not stored");
        }
        Ok(outcome)
    }

    /// Visit all components in ascending id order until `visit` returns
    /// `false`. The traversal reads one consistent snapshot.
    pub fn iterate_all<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&Component) -> bool,
    {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(COMPONENTS)?;
        for entry in table.iter()? {
            let (_id, bytes) = entry?;
            let component = Component::from_bytes(bytes.value())?;
            if !visit(&component) {
                break;
            }
        }
        Ok(())
    }

    /// Ids of all stored components, ascending.
    pub fn list_ids(&self) -> Result<Vec<u64>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(COMPONENTS)?;
        let mut result = Vec::new();
        for entry in table.iter()? {
            let (k, _v) = entry?;
            result.push(k.value());
        }
        Ok(result)
    }
}

impl std::fmt::Debug for ComponentDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDb").finish_non_exhaustive()
    }
}

pub(crate) fn read_record<T>(table: &T, id: u64) -> Result<Option<Component>>
where
    T: ReadableTable<u64, &'static [u8]>,
{
    match table.get(id)? {
        Some(guard) => Ok(Some(Component::from_bytes(guard.value())?)),
        None => Ok(None),
    }
}

pub(crate) fn write_record(
    table: &mut Table<'_, u64, &'static [u8]>,
    record: &Component,
) -> Result<()> {
    let bytes = record.to_bytes()?;
    table.insert(record.id, bytes.as_slice())?;
    Ok(())
}
