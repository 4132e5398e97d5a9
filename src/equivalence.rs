//! Equivalence sets: groups of components that are the same physical part.
//!
//! A set is identified by its canonical id, the smallest member id, which is
//! stored in every member's `equiv_set` field. The `equiv_members`
//! multimap mirrors that field so the members of a set can be found
//! directly. Both are only ever changed together, inside one write
//! transaction.

use std::collections::BTreeSet;

use redb::{
    MultimapTable,
    ReadableDatabase,
    ReadableMultimapTable,
    ReadableTable,
    Table,
};
use tracing::debug;

use crate::{
    component::Component,
    component_db::{
        COMPONENTS,
        ComponentDb,
        EQUIV_MEMBERS,
        read_record,
        write_record,
    },
    error::Result,
};

type Components<'txn> = Table<'txn, u64, &'static [u8]>;
type Members<'txn> = MultimapTable<'txn, u64, u64>;

impl ComponentDb {
    /// Move component `id` into the set `target_set`.
    ///
    /// The component first leaves whatever set it is in. The merged set is
    /// then canonicalized to its smallest member id. Returns the records
    /// whose `equiv_set` changed; empty if `id` does not exist.
    ///
    /// Joining a set id that has no members leaves the component on its own.
    pub fn join_set(&self, id: u64, target_set: u64) -> Result<Vec<Component>> {
        let txn = self.db.begin_write()?;
        let changed = {
            let mut components = txn.open_table(COMPONENTS)?;
            let mut members = txn.open_multimap_table(EQUIV_MEMBERS)?;

            if read_record(&components, id)?.is_none() {
                Vec::new()
            } else {
                let mut changed =
                    leave(&mut components, &mut members, id)?;

                let mut merged = set_members(&members, target_set)?;
                if !merged.is_empty() {
                    merged.insert(id);
                    let relabeled =
                        relabel(&mut components, &mut members, &merged)?;
                    for record in relabeled {
                        upsert_changed(&mut changed, record);
                    }
                }
                changed
            }
        };
        txn.commit()?;

        debug!(id, target_set, changed = changed.len(), "join set");
        Ok(changed)
    }

    /// Take component `id` out of its set, making it a singleton again.
    ///
    /// If `id` was the canonical member, the remaining members are
    /// re-canonicalized to the next-smallest id. Returns the records whose
    /// `equiv_set` changed; empty if `id` was already alone or does not
    /// exist.
    pub fn leave_set(&self, id: u64) -> Result<Vec<Component>> {
        let txn = self.db.begin_write()?;
        let changed = {
            let mut components = txn.open_table(COMPONENTS)?;
            let mut members = txn.open_multimap_table(EQUIV_MEMBERS)?;
            leave(&mut components, &mut members, id)?
        };
        txn.commit()?;

        debug!(id, changed = changed.len(), "leave set");
        Ok(changed)
    }

    /// All components in the same set as any component that has the same
    /// category and value (ignoring case) as `id`, ordered by
    /// `(equiv_set, id)`.
    ///
    /// A component without category or value matches only itself, so the
    /// result is then just its own set. Unknown ids yield an empty list.
    pub fn matching_equiv_set_for_component(
        &self,
        id: u64,
    ) -> Result<Vec<Component>> {
        let txn = self.db.begin_read()?;
        let components = txn.open_table(COMPONENTS)?;
        let members = txn.open_multimap_table(EQUIV_MEMBERS)?;

        let Some(origin) = read_record(&components, id)? else {
            return Ok(Vec::new());
        };

        let mut sets = BTreeSet::from([origin.equiv_set]);
        if !origin.category.is_empty() && !origin.value.is_empty() {
            for entry in components.iter()? {
                let (_id, bytes) = entry?;
                let candidate = Component::from_bytes(bytes.value())?;
                if origin.same_part_as(&candidate) {
                    sets.insert(candidate.equiv_set);
                }
            }
        }

        let mut result = Vec::new();
        for set in sets {
            for member in set_members(&members, set)? {
                if let Some(record) = read_record(&components, member)? {
                    result.push(record);
                }
            }
        }
        result.sort_by_key(|c| (c.equiv_set, c.id));
        Ok(result)
    }
}

/// Member ids of `set`, ascending.
fn set_members<T>(members: &T, set: u64) -> Result<BTreeSet<u64>>
where
    T: ReadableMultimapTable<u64, u64>,
{
    let mut result = BTreeSet::new();
    for member in members.get(set)? {
        result.insert(member?.value());
    }
    Ok(result)
}

fn leave(
    components: &mut Components<'_>,
    members: &mut Members<'_>,
    id: u64,
) -> Result<Vec<Component>> {
    let Some(record) = read_record(&*components, id)? else {
        return Ok(Vec::new());
    };
    let set = record.equiv_set;

    let mut remaining = set_members(&*members, set)?;
    remaining.remove(&id);
    if set == id && remaining.is_empty() {
        return Ok(Vec::new());
    }

    let mut changed = relabel(components, members, &BTreeSet::from([id]))?;
    if !remaining.is_empty() {
        changed.extend(relabel(components, members, &remaining)?);
    }
    Ok(changed)
}

/// Make `group` one set whose canonical id is its smallest member.
/// Returns the records that actually changed.
fn relabel(
    components: &mut Components<'_>,
    members: &mut Members<'_>,
    group: &BTreeSet<u64>,
) -> Result<Vec<Component>> {
    let Some(&canonical) = group.first() else {
        return Ok(Vec::new());
    };

    let mut changed = Vec::new();
    for &id in group {
        let Some(mut record) = read_record(&*components, id)? else {
            continue;
        };
        if record.equiv_set == canonical {
            continue;
        }
        members.remove(record.equiv_set, id)?;
        members.insert(canonical, id)?;
        record.equiv_set = canonical;
        write_record(components, &record)?;
        changed.push(record);
    }
    Ok(changed)
}

fn upsert_changed(changed: &mut Vec<Component>, record: Component) {
    match changed.iter_mut().find(|c| c.id == record.id) {
        Some(existing) => *existing = record,
        None => changed.push(record),
    }
}
