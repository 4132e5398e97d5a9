use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Physical drawer a component is kept in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum DrawerSize {
    #[default]
    Small,
    Medium,
    Large,
}

impl From<DrawerSize> for u8 {
    fn from(size: DrawerSize) -> Self {
        match size {
            DrawerSize::Small => 0,
            DrawerSize::Medium => 1,
            DrawerSize::Large => 2,
        }
    }
}

impl TryFrom<u8> for DrawerSize {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Small),
            1 => Ok(Self::Medium),
            2 => Ok(Self::Large),
            other => Err(format!("invalid drawer size {other}")),
        }
    }
}

/// One catalogued physical item.
///
/// Free-text fields use the empty string for "unset". `equiv_set` and the
/// two timestamps are owned by the store: edits through
/// [`ComponentDb::edit_record`](crate::component_db::ComponentDb::edit_record)
/// cannot change them.
///
/// # Examples
///
/// ```
/// use stuffstore::Component;
///
/// let c = Component::new(42);
/// assert_eq!(c.equiv_set, 42);
/// assert!(c.value.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: u64,
    /// Smallest id among all components sharing this component's set.
    pub equiv_set: u64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub footprint: String,
    #[serde(default)]
    pub datasheet_url: String,
    /// Free-form for now, e.g. `"< 50"`.
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub drawer_size: DrawerSize,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
}

impl Component {
    /// An empty, never persisted record that forms its own singleton set.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            equiv_set: id,
            category: String::new(),
            value: String::new(),
            description: String::new(),
            notes: String::new(),
            footprint: String::new(),
            datasheet_url: String::new(),
            quantity: String::new(),
            drawer_size: DrawerSize::default(),
            created: None,
            updated: None,
        }
    }

    /// Serialize for storage in the component table.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize a record read from the component table.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Whether `other` names the same part, i.e. has the same category and
    /// value ignoring case. Records without a category or value never match.
    pub fn same_part_as(&self, other: &Component) -> bool {
        if self.category.is_empty() || self.value.is_empty() {
            return false;
        }
        self.category.to_lowercase() == other.category.to_lowercase()
            && self.value.to_lowercase() == other.value.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_component_is_its_own_set() {
        let c = Component::new(7);
        assert_eq!(c.id, 7);
        assert_eq!(c.equiv_set, 7);
        assert_eq!(c.drawer_size, DrawerSize::Small);
        assert!(c.created.is_none());
    }

    #[test]
    fn bytes_preserve_all_fields() {
        let mut c = Component::new(3);
        c.category = "Resistor".into();
        c.value = "10k".into();
        c.drawer_size = DrawerSize::Large;
        c.created = Some(Utc::now());

        let restored = Component::from_bytes(&c.to_bytes().unwrap()).unwrap();
        assert_eq!(restored, c);
    }

    #[test]
    fn drawer_size_is_stored_as_number() {
        let mut c = Component::new(1);
        c.drawer_size = DrawerSize::Medium;
        let json: serde_json::Value =
            serde_json::from_slice(&c.to_bytes().unwrap()).unwrap();
        assert_eq!(json["drawer_size"], 1);
    }

    #[test]
    fn invalid_drawer_size_is_rejected() {
        let err = Component::from_bytes(
            br#"{"id":1,"equiv_set":1,"drawer_size":9}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn missing_text_fields_default_to_empty() {
        let c = Component::from_bytes(br#"{"id":5,"equiv_set":5}"#).unwrap();
        assert_eq!(c, Component::new(5));
    }

    #[test]
    fn same_part_ignores_case() {
        let mut a = Component::new(1);
        a.category = "Resist".into();
        a.value = "10k".into();
        let mut b = Component::new(2);
        b.category = "resist".into();
        b.value = "10K".into();
        assert!(a.same_part_as(&b));

        b.value = "4.7k".into();
        assert!(!a.same_part_as(&b));
    }

    #[test]
    fn blank_identity_matches_nothing() {
        let a = Component::new(1);
        let b = Component::new(2);
        assert!(!a.same_part_as(&b));
    }
}
