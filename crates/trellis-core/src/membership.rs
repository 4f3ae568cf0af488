//! Reverse index from tag to the contacts that carry it directly
//!
//! The index is derived data. The contact store remains the source of truth
//! and is the only caller of the mutating hooks, which keeps a contact listed
//! under a tag exactly when that tag is in the contact's own tag set.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::contact::{Contact, ContactId};
use crate::tag::Tag;

static NO_MEMBERS: BTreeSet<ContactId> = BTreeSet::new();

/// Multimap `tag -> contacts directly tagged with it`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagMembershipIndex {
    members: BTreeMap<Tag, BTreeSet<ContactId>>,
}

impl TagMembershipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from existing contacts
    pub fn from_contacts<'a>(contacts: impl IntoIterator<Item = (ContactId, &'a Contact)>) -> Self {
        let mut index = Self::new();
        for (id, contact) in contacts {
            index.on_contact_added(id, contact);
        }
        index
    }

    /// Contacts carrying `tag` directly. Hierarchy descendants are not included.
    pub fn members_of(&self, tag: &Tag) -> &BTreeSet<ContactId> {
        self.members.get(tag).unwrap_or(&NO_MEMBERS)
    }

    pub fn has_members(&self, tag: &Tag) -> bool {
        self.members.contains_key(tag)
    }

    pub fn contains(&self, tag: &Tag, id: ContactId) -> bool {
        self.members_of(tag).contains(&id)
    }

    /// Every tag carried by at least one contact
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.members.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn on_contact_added(&mut self, id: ContactId, contact: &Contact) {
        for tag in &contact.tags {
            self.insert(tag, id);
        }
    }

    pub(crate) fn on_contact_removed(&mut self, id: ContactId, contact: &Contact) {
        for tag in &contact.tags {
            self.remove(tag, id);
        }
    }

    /// Swap `old` for `new` under the same id.
    ///
    /// Only the tag-set difference is touched, so a tag carried by both values
    /// never loses the contact, not even transiently.
    pub(crate) fn on_contact_replaced(&mut self, id: ContactId, old: &Contact, new: &Contact) {
        for tag in old.tags.difference(&new.tags) {
            self.remove(tag, id);
        }
        for tag in new.tags.difference(&old.tags) {
            self.insert(tag, id);
        }
    }

    fn insert(&mut self, tag: &Tag, id: ContactId) {
        trace!(%tag, %id, "index insert");
        self.members.entry(tag.clone()).or_default().insert(id);
    }

    fn remove(&mut self, tag: &Tag, id: ContactId) {
        if let Some(ids) = self.members.get_mut(tag) {
            ids.remove(&id);
            if ids.is_empty() {
                self.members.remove(tag);
            }
        }
    }
}
