use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;

use crate::{
    component::Component,
    query::{self, preprocess_term, tokenize},
    scoring::SearchFields,
};

/// A component together with its normalized searchable fields.
#[derive(Debug, Clone)]
struct IndexedComponent {
    original: Arc<Component>,
    fields: SearchFields,
}

/// Outcome of [`SearchIndex::search`].
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// The query as the user typed it.
    pub original_query: String,
    /// The query after rewriting, useful to show why something matched.
    pub rewritten_query: String,
    /// Matching components, best first.
    pub results: Vec<Arc<Component>>,
}

/// In-memory full-text index over all components.
///
/// Holds its own copy of every component and is kept up to date by
/// [`upsert`](Self::upsert) after each successful store write. Searches
/// share a read lock; upserts take the write lock.
#[derive(Debug, Default)]
pub struct SearchIndex {
    components: RwLock<HashMap<u64, IndexedComponent>>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `component.id`.
    pub fn upsert(&self, component: &Component) {
        let entry = IndexedComponent {
            original: Arc::new(component.clone()),
            fields: SearchFields::new(component),
        };
        self.components.write().insert(component.id, entry);
    }

    /// The indexed copy of a component.
    pub fn get(&self, id: u64) -> Option<Arc<Component>> {
        self.components
            .read()
            .get(&id)
            .map(|entry| Arc::clone(&entry.original))
    }

    pub fn len(&self) -> usize {
        self.components.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.read().is_empty()
    }

    /// Search all components.
    ///
    /// Only components with a positive score are returned, ordered by score,
    /// then components that have a value (alphabetically by value), then
    /// those that have a description, then by id.
    ///
    /// # Examples
    ///
    /// ```
    /// use stuffstore::{Component, SearchIndex};
    ///
    /// let index = SearchIndex::new();
    /// let mut c = Component::new(1);
    /// c.category = "Resistor".into();
    /// c.value = "10k".into();
    /// index.upsert(&c);
    ///
    /// let outcome = index.search("10k Ohm");
    /// assert_eq!(outcome.results.len(), 1);
    /// assert!(outcome.rewritten_query.contains("resistor"));
    /// ```
    pub fn search(&self, raw_query: &str) -> SearchOutcome {
        let rewritten = query::rewrite(raw_query, |id| self.to_query(id));
        debug!(query = raw_query, rewritten = %rewritten, "rewrote query");

        let normalized = preprocess_term(&rewritten);
        let tokens = tokenize(&normalized);

        let mut scored: Vec<(f32, Arc<Component>)> = {
            let components = self.components.read();
            components
                .values()
                .filter_map(|entry| {
                    let score = entry.fields.match_score(&tokens);
                    (score > 0.0).then(|| (score, Arc::clone(&entry.original)))
                })
                .collect()
        };
        scored.sort_by(|(a_score, a), (b_score, b)| {
            b_score.total_cmp(a_score).then_with(|| result_order(a, b))
        });

        SearchOutcome {
            original_query: raw_query.to_string(),
            rewritten_query: rewritten,
            results: scored.into_iter().map(|(_, c)| c).collect(),
        }
    }

    /// Render a component's searchable words as an OR expression, e.g.
    /// `(resistor|10k|0805)`, for finding similar components. Empty
    /// string if the id is not indexed.
    pub fn to_query(&self, id: u64) -> String {
        self.components
            .read()
            .get(&id)
            .map(|entry| fields_to_query(&entry.fields))
            .unwrap_or_default()
    }
}

fn fields_to_query(fields: &SearchFields) -> String {
    let words: Vec<&str> = [
        &fields.category,
        &fields.description,
        &fields.notes,
        &fields.value,
        &fields.footprint,
    ]
    .into_iter()
    .flat_map(|field| field.split_whitespace())
    .collect();
    format!("({})", words.join("|"))
}

/// Tie-break for components with equal score.
fn result_order(a: &Component, b: &Component) -> Ordering {
    if a.value != b.value {
        // Having a value beats having none; otherwise alphabetical.
        return match (a.value.is_empty(), b.value.is_empty()) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            _ => a.value.cmp(&b.value),
        };
    }
    if a.description != b.description {
        match (a.description.is_empty(), b.description.is_empty()) {
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }
    }
    a.id.cmp(&b.id)
}
