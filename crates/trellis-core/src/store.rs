//! Contact arena
//!
//! Contacts are stored under stable [`ContactId`] keys and the membership
//! index is updated inside every mutating call. Nothing outside this module can
//! reach the index mutators, so the index never disagrees with the contacts.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::contact::{Contact, ContactId};
use crate::error::{CoreError, CoreResult};
use crate::membership::TagMembershipIndex;
use crate::tag::Tag;

/// Owner of all contacts and of the tag membership index
#[derive(Debug, Default, Clone)]
pub struct ContactStore {
    contacts: BTreeMap<ContactId, Contact>,
    index: TagMembershipIndex,
    next_id: u64,
}

impl ContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted `(id, contact)` pairs.
    ///
    /// Records must pass the same checks as [`add`](Self::add): no empty
    /// names and no two contacts that are the same person. The membership
    /// index is derived from each contact's own tags. New ids continue after
    /// the largest loaded id.
    pub fn from_records(records: impl IntoIterator<Item = (ContactId, Contact)>) -> CoreResult<Self> {
        let mut contacts = BTreeMap::new();
        let mut names = BTreeSet::new();
        for (id, contact) in records {
            let name = contact.name.trim().to_ascii_lowercase();
            if name.is_empty() {
                return Err(CoreError::corrupt_snapshot(format!(
                    "contact {} has an empty name",
                    id
                )));
            }
            if !names.insert(name) {
                return Err(CoreError::corrupt_snapshot(format!(
                    "contact name '{}' appears more than once",
                    contact.name.trim()
                )));
            }
            if contacts.insert(id, contact).is_some() {
                return Err(CoreError::corrupt_snapshot(format!(
                    "contact id {} appears more than once",
                    id
                )));
            }
        }

        let next_id = match contacts.keys().next_back() {
            Some(last) => last.get().checked_add(1).ok_or_else(|| {
                CoreError::corrupt_snapshot(format!("contact id {} is out of range", last))
            })?,
            None => 0,
        };
        let index = TagMembershipIndex::from_contacts(contacts.iter().map(|(id, c)| (*id, c)));

        Ok(Self {
            contacts,
            index,
            next_id,
        })
    }

    pub fn get(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.get(&id)
    }

    pub fn contains(&self, id: ContactId) -> bool {
        self.contacts.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContactId, &Contact)> {
        self.contacts.iter().map(|(id, c)| (*id, c))
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Read-only view of the membership index
    pub fn index(&self) -> &TagMembershipIndex {
        &self.index
    }

    /// Insert a new contact and index its tags
    pub fn add(&mut self, contact: Contact) -> CoreResult<ContactId> {
        self.validate(&contact, None)?;

        let id = ContactId::new(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or(CoreError::ContactIdsExhausted)?;

        self.index.on_contact_added(id, &contact);
        self.contacts.insert(id, contact);
        debug!(%id, "added contact");
        Ok(id)
    }

    /// Replace the value stored under `id`, returning the previous value
    pub fn replace(&mut self, id: ContactId, contact: Contact) -> CoreResult<Contact> {
        self.validate(&contact, Some(id))?;

        let slot = self
            .contacts
            .get_mut(&id)
            .ok_or(CoreError::ContactNotFound(id))?;
        self.index.on_contact_replaced(id, slot, &contact);
        let old = std::mem::replace(slot, contact);
        debug!(%id, "replaced contact");
        Ok(old)
    }

    /// Remove a contact and its index entries
    pub fn remove(&mut self, id: ContactId) -> Option<Contact> {
        let contact = self.contacts.remove(&id)?;
        self.index.on_contact_removed(id, &contact);
        debug!(%id, "removed contact");
        Some(contact)
    }

    /// Add `tag` to a contact. Returns `false` if it was already present.
    pub fn add_tag(&mut self, id: ContactId, tag: &Tag) -> CoreResult<bool> {
        let current = self.get(id).ok_or(CoreError::ContactNotFound(id))?;
        if current.has_tag(tag) {
            return Ok(false);
        }
        let mut updated = current.clone();
        updated.tags.insert(tag.clone());
        self.replace(id, updated)?;
        Ok(true)
    }

    /// Remove `tag` from a contact. Returns `false` if it was not present.
    pub fn remove_tag(&mut self, id: ContactId, tag: &Tag) -> CoreResult<bool> {
        let current = self.get(id).ok_or(CoreError::ContactNotFound(id))?;
        if !current.has_tag(tag) {
            return Ok(false);
        }
        let mut updated = current.clone();
        updated.tags.remove(tag);
        self.replace(id, updated)?;
        Ok(true)
    }

    /// Strip `tag` from every contact that carries it directly.
    /// Returns the affected contacts.
    pub(crate) fn strip_tag(&mut self, tag: &Tag) -> Vec<ContactId> {
        let ids: Vec<ContactId> = self.index.members_of(tag).iter().copied().collect();
        for id in &ids {
            if let Some(contact) = self.contacts.get_mut(id) {
                let old = contact.clone();
                contact.tags.remove(tag);
                self.index.on_contact_replaced(*id, &old, contact);
            }
        }
        ids
    }

    /// Remove every contact that carries `tag` directly
    pub(crate) fn remove_members(&mut self, tag: &Tag) -> Vec<(ContactId, Contact)> {
        let ids: Vec<ContactId> = self.index.members_of(tag).iter().copied().collect();
        ids.into_iter()
            .filter_map(|id| self.remove(id).map(|contact| (id, contact)))
            .collect()
    }

    /// Verify that the index matches the contacts exactly
    pub fn check_index(&self) -> Result<(), String> {
        let rebuilt = TagMembershipIndex::from_contacts(self.iter());
        if rebuilt == self.index {
            Ok(())
        } else {
            Err("membership index disagrees with contact tags".to_string())
        }
    }

    fn validate(&self, contact: &Contact, replacing: Option<ContactId>) -> CoreResult<()> {
        if contact.name.trim().is_empty() {
            return Err(CoreError::InvalidContact(
                "contact name cannot be empty".to_string(),
            ));
        }
        let clash = self
            .iter()
            .any(|(id, existing)| Some(id) != replacing && existing.is_same_person(contact));
        if clash {
            return Err(CoreError::DuplicateContact(contact.name.trim().to_string()));
        }
        Ok(())
    }
}
