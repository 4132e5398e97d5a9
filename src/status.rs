//! How complete the catalog entries are, drawer by drawer.

use serde::Serialize;

use crate::{catalog::Catalog, component::Component, error::Result};

/// Highest id (exclusive) covered by status overviews.
pub const MAX_STATUS_ID: u64 = 2100;

pub const DEFAULT_STATUS_LIMIT: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Missing,
    Poor,
    Fair,
    Good,
    Empty,
    Mystery,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Missing => "missing",
            Self::Poor => "poor",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Empty => "empty",
            Self::Mystery => "mystery",
        };
        f.write_str(name)
    }
}

/// Status of one id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusItem {
    pub number: u64,
    pub status: Status,
    /// 2 at every hundred, 1 at every ten, else 0.
    #[serde(skip_serializing_if = "is_zero")]
    pub separator: u8,
}

fn is_zero(n: &u8) -> bool {
    *n == 0
}

/// Classify how well a component is described.
///
/// Category, value and description each count; simple parts such as
/// resistors and capacitors are fully described by their value.
pub fn classify(component: Option<&Component>) -> Status {
    let Some(c) = component else {
        return Status::Missing;
    };

    let simple_part = matches!(c.category.as_str(), "Resistor" | "Capacitor (C)")
        && !c.value.is_empty();
    let filled = [
        !c.category.is_empty(),
        !c.value.is_empty(),
        !c.description.is_empty() || simple_part,
    ]
    .into_iter()
    .filter(|&f| f)
    .count();

    let value = c.value.to_lowercase();
    let category = c.category.to_lowercase();
    if category.contains("mystery") || c.value.contains('?') {
        Status::Mystery
    } else if value.contains("empty") || category.contains("empty") {
        Status::Empty
    } else {
        match filled {
            0 => Status::Missing,
            1 => Status::Poor,
            2 => Status::Fair,
            _ => Status::Good,
        }
    }
}

/// Status of the ids `offset..offset + limit`.
///
/// Ranges reaching past [`MAX_STATUS_ID`] fall back to the full range.
pub fn status_range(
    catalog: &Catalog,
    offset: u64,
    limit: u64,
) -> Result<Vec<StatusItem>> {
    let (offset, limit) = match offset.checked_add(limit) {
        Some(end) if end <= MAX_STATUS_ID => (offset, limit),
        _ => (0, MAX_STATUS_ID),
    };

    (offset..offset + limit)
        .map(|id| {
            let component = catalog.find(id)?;
            Ok(StatusItem {
                number: id,
                status: classify(component.as_ref()),
                separator: separator(id),
            })
        })
        .collect()
}

fn separator(id: u64) -> u8 {
    match id {
        0 => 0,
        id if id % 100 == 0 => 2,
        id if id % 10 == 0 => 1,
        _ => 0,
    }
}
