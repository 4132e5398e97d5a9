use std::path::Path;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    component::Component,
    component_db::{ComponentDb, EditOutcome},
    error::Result,
    search_index::{SearchIndex, SearchOutcome},
};

/// Result of [`Catalog::edit`]: whether the record was stored, and if not,
/// why (empty when the mutator itself declined).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditResult {
    pub committed: bool,
    pub message: String,
}

/// The component catalog: the record store plus the search index built
/// from it.
///
/// The index is populated from the store when the catalog is opened and
/// refreshed after every successful write made through the catalog.
/// Writes hold `writes` from the store transaction until the index is
/// refreshed, so the index applies them in commit order.
#[derive(Debug)]
pub struct Catalog {
    db: ComponentDb,
    index: SearchIndex,
    writes: Mutex<()>,
}

impl Catalog {
    /// Open the store at `path` and build the search index from it.
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_db(ComponentDb::open(path)?)
    }

    pub fn from_db(db: ComponentDb) -> Result<Self> {
        let index = SearchIndex::new();
        db.iterate_all(|component| {
            index.upsert(component);
            true
        })?;
        info!("prepopulated full text search with {} items", index.len());
        Ok(Self {
            db,
            index,
            writes: Mutex::new(()),
        })
    }

    pub fn db(&self) -> &ComponentDb {
        &self.db
    }

    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    pub fn find(&self, id: u64) -> Result<Option<Component>> {
        self.db.find_by_id(id)
    }

    /// Edit a component through `mutate`, see
    /// [`ComponentDb::edit_record`]. Storage failures are reported in the
    /// result rather than as an error.
    pub fn edit<F>(&self, id: u64, mutate: F) -> EditResult
    where
        F: FnOnce(&mut Component) -> bool,
    {
        let _write = self.writes.lock();
        match self.db.edit_record(id, mutate) {
            Ok(outcome) => {
                if let EditOutcome::Committed(record) = &outcome {
                    self.index.upsert(record);
                }
                EditResult {
                    committed: outcome.is_committed(),
                    message: outcome.message().to_string(),
                }
            }
            Err(e) => {
                warn!(id, error = %e, "storing component failed");
                EditResult {
                    committed: false,
                    message: e.to_string(),
                }
            }
        }
    }

    /// Move `id` into `target_set`. Returns whether any membership changed.
    pub fn join_set(&self, id: u64, target_set: u64) -> Result<bool> {
        let _write = self.writes.lock();
        let changed = self.db.join_set(id, target_set)?;
        self.refresh(&changed);
        Ok(!changed.is_empty())
    }

    /// Make `id` a singleton set. Returns whether any membership changed.
    pub fn leave_set(&self, id: u64) -> Result<bool> {
        let _write = self.writes.lock();
        let changed = self.db.leave_set(id)?;
        self.refresh(&changed);
        Ok(!changed.is_empty())
    }

    pub fn matching_equivalence_set(&self, id: u64) -> Result<Vec<Component>> {
        self.db.matching_equiv_set_for_component(id)
    }

    pub fn search(&self, raw_query: &str) -> SearchOutcome {
        self.index.search(raw_query)
    }

    pub fn iterate_all<F>(&self, visit: F) -> Result<()>
    where
        F: FnMut(&Component) -> bool,
    {
        self.db.iterate_all(visit)
    }

    fn refresh(&self, changed: &[Component]) {
        for record in changed {
            self.index.upsert(record);
        }
    }
}
