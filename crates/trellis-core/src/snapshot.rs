//! Persisted shape of the address book
//!
//! Only the contacts and the parent -> children mapping are written. The
//! parent index and the membership index are rebuilt on load.

use serde::{Deserialize, Serialize};

use crate::contact::{Contact, ContactId};
use crate::hierarchy::ChildrenMap;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to rehydrate the model at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBookSnapshot {
    pub version: u32,

    #[serde(default)]
    pub contacts: Vec<ContactRecord>,

    /// Each super-tag with its direct sub-tags
    #[serde(default)]
    pub tag_hierarchy: ChildrenMap,
}

impl Default for AddressBookSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            contacts: Vec::new(),
            tag_hierarchy: ChildrenMap::new(),
        }
    }
}

/// A contact together with its store key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: ContactId,

    #[serde(flatten)]
    pub contact: Contact,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::Tag;
    use std::collections::BTreeSet;

    #[test]
    fn test_json_shape() {
        let mut snapshot = AddressBookSnapshot::default();
        snapshot.contacts.push(ContactRecord {
            id: ContactId::new(2),
            contact: Contact::new("Irfan").with_tags([Tag::new("cs1231s").unwrap()]),
        });
        snapshot.tag_hierarchy.insert(
            Tag::new("nus").unwrap(),
            BTreeSet::from([Tag::new("computing").unwrap()]),
        );

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "version": 1,
                "contacts": [{ "id": 2, "name": "Irfan", "tags": ["cs1231s"] }],
                "tag_hierarchy": { "nus": ["computing"] }
            })
        );
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let snapshot: AddressBookSnapshot = serde_json::from_str(r#"{"version": 1}"#).unwrap();
        assert!(snapshot.contacts.is_empty());
        assert!(snapshot.tag_hierarchy.is_empty());
    }
}
