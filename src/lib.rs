//! stuffstore - a catalog of physical components kept in numbered drawers.
//!
//! Components are stored in a [redb](https://github.com/cberner/redb)
//! database and mirrored into an in-memory index that understands loose
//! queries such as `10k Ohm`, `0.1uF`, `lm358 | ne5532` or `like:42`.
//! Components describing the same physical part can be grouped into
//! equivalence sets.
//!
//! # Quick start
//!
//! ```no_run
//! use stuffstore::{Catalog, DataDir};
//!
//! let data_dir = DataDir::resolve(None).unwrap();
//! let catalog = Catalog::open(&data_dir.components_db()).unwrap();
//!
//! catalog.edit(42, |c| {
//!     c.category = "Resistor".into();
//!     c.value = "10k".into();
//!     true
//! });
//!
//! for c in &catalog.search("10k ohm").results {
//!     println!("#{} {} {}", c.id, c.category, c.value);
//! }
//! ```

pub mod catalog;
pub mod cleanup;
pub mod cli;
pub mod component;
pub mod component_db;
pub mod data_dir;
pub mod equivalence;
pub mod error;
pub mod query;
pub mod scoring;
pub mod search;
pub mod search_index;
pub mod status;

pub use catalog::{Catalog, EditResult};
pub use component::{Component, DrawerSize};
pub use component_db::{ComponentDb, EditOutcome};
pub use data_dir::DataDir;
pub use error::{Error, Result};
pub use search_index::{SearchIndex, SearchOutcome};
