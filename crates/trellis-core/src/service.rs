//! Tag integration service
//!
//! [`TagIntegrationService`] owns the tag hierarchy and the contact store. It
//! is the only place where an operation touches both, which is what keeps the
//! membership index consistent across deletions.
//!
//! Two deletion policies are offered:
//!
//! - **reconnect** ([`delete_tag`](TagIntegrationService::delete_tag)): the
//!   tag's parents are linked directly to its children, so nothing below the
//!   tag loses its place in the hierarchy.
//! - **cascade** ([`delete_tag_recursive`](TagIntegrationService::delete_tag_recursive)):
//!   the tag and every descendant are removed together.
//!
//! Each policy comes in a variant that deletes the directly tagged contacts
//! instead of only stripping the tag from them. None of the deletions can
//! fail, and deleting a tag nobody knows about leaves the model unchanged.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::contact::{Contact, ContactId};
use crate::error::CoreResult;
use crate::hierarchy::TagHierarchy;
use crate::snapshot::{AddressBookSnapshot, ContactRecord, SNAPSHOT_VERSION};
use crate::store::ContactStore;
use crate::tag::{ChildSelector, Tag};

/// Outcome of a tag deletion, for reporting back to the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDeletion {
    /// Tags removed, each one after all of its own descendants
    pub removed_tags: Vec<Tag>,

    /// Parent -> child edges created to bridge the removed tag
    pub reconnected_edges: Vec<(Tag, Tag)>,

    /// Contacts that lost one or more of the removed tags
    pub detagged_contacts: BTreeSet<ContactId>,

    /// Contacts deleted outright
    pub deleted_contacts: Vec<(ContactId, Contact)>,
}

/// Hierarchy-aware operations over tags and contacts
#[derive(Debug, Default, Clone)]
pub struct TagIntegrationService {
    hierarchy: TagHierarchy,
    contacts: ContactStore,
}

impl TagIntegrationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(hierarchy: TagHierarchy, contacts: ContactStore) -> Self {
        Self {
            hierarchy,
            contacts,
        }
    }

    /// Rehydrate from a persisted snapshot
    pub fn from_snapshot(snapshot: AddressBookSnapshot) -> CoreResult<Self> {
        let hierarchy = TagHierarchy::from_children_map(&snapshot.tag_hierarchy)?;
        let contacts = ContactStore::from_records(
            snapshot
                .contacts
                .into_iter()
                .map(|record| (record.id, record.contact)),
        )?;

        debug!(
            contacts = contacts.len(),
            edges = hierarchy.edge_count(),
            "loaded address book snapshot"
        );
        Ok(Self::from_parts(hierarchy, contacts))
    }

    pub fn to_snapshot(&self) -> AddressBookSnapshot {
        AddressBookSnapshot {
            version: SNAPSHOT_VERSION,
            contacts: self
                .contacts
                .iter()
                .map(|(id, contact)| ContactRecord {
                    id,
                    contact: contact.clone(),
                })
                .collect(),
            tag_hierarchy: self.hierarchy.to_children_map(),
        }
    }

    pub fn hierarchy(&self) -> &TagHierarchy {
        &self.hierarchy
    }

    pub fn contacts(&self) -> &ContactStore {
        &self.contacts
    }

    // ------------------------------------------------------------------
    // Pass-through mutations
    // ------------------------------------------------------------------

    pub fn add_edge(&mut self, parent: &Tag, child: &Tag) -> CoreResult<()> {
        self.hierarchy.add_edge(parent, child)
    }

    pub fn remove_edge(&mut self, parent: &Tag, selector: &ChildSelector) -> Vec<Tag> {
        self.hierarchy.remove_edge(parent, selector)
    }

    pub fn add_contact(&mut self, contact: Contact) -> CoreResult<ContactId> {
        self.contacts.add(contact)
    }

    pub fn update_contact(&mut self, id: ContactId, contact: Contact) -> CoreResult<Contact> {
        self.contacts.replace(id, contact)
    }

    pub fn remove_contact(&mut self, id: ContactId) -> Option<Contact> {
        self.contacts.remove(id)
    }

    pub fn tag_contact(&mut self, id: ContactId, tag: &Tag) -> CoreResult<bool> {
        self.contacts.add_tag(id, tag)
    }

    pub fn untag_contact(&mut self, id: ContactId, tag: &Tag) -> CoreResult<bool> {
        self.contacts.remove_tag(id, tag)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// A tag exists when it has a direct member or a hierarchy edge
    pub fn tag_exists(&self, tag: &Tag) -> bool {
        self.contacts.index().has_members(tag) || self.hierarchy.contains(tag)
    }

    /// Every known tag, from either the hierarchy or a contact
    pub fn all_tags(&self) -> BTreeSet<Tag> {
        self.hierarchy
            .tags()
            .into_iter()
            .chain(self.contacts.index().tags())
            .cloned()
            .collect()
    }

    /// Contacts carrying `tag` directly
    pub fn members_of(&self, tag: &Tag) -> &BTreeSet<ContactId> {
        self.contacts.index().members_of(tag)
    }

    /// Direct members of `tag` and of every descendant tag, each counted once
    pub fn all_persons_under_tag(&self, tag: &Tag) -> BTreeSet<ContactId> {
        let index = self.contacts.index();
        let mut persons: BTreeSet<ContactId> = index.members_of(tag).clone();
        for descendant in self.hierarchy.descendants(tag) {
            persons.extend(index.members_of(&descendant).iter().copied());
        }
        persons
    }

    /// [`all_persons_under_tag`](Self::all_persons_under_tag) resolved to contacts
    pub fn contacts_under_tag(&self, tag: &Tag) -> Vec<(ContactId, &Contact)> {
        self.all_persons_under_tag(tag)
            .into_iter()
            .filter_map(|id| self.contacts.get(id).map(|contact| (id, contact)))
            .collect()
    }

    // ------------------------------------------------------------------
    // Deletions
    // ------------------------------------------------------------------

    /// Delete `tag`, stripping it from its direct members and linking its
    /// parents straight to its children.
    pub fn delete_tag(&mut self, tag: &Tag) -> TagDeletion {
        self.warn_if_unknown(tag);
        let detagged = self.contacts.strip_tag(tag);
        let reconnected = self.hierarchy.remove_reconnecting(tag);

        let report = TagDeletion {
            removed_tags: vec![tag.clone()],
            reconnected_edges: reconnected,
            detagged_contacts: detagged.into_iter().collect(),
            deleted_contacts: Vec::new(),
        };
        info!(
            %tag,
            detagged = report.detagged_contacts.len(),
            reconnected = report.reconnected_edges.len(),
            "deleted tag"
        );
        self.debug_check();
        report
    }

    /// Delete `tag` and all of its descendants, stripping each of them from
    /// their direct members. Parents outside the subtree just lose their edge.
    pub fn delete_tag_recursive(&mut self, tag: &Tag) -> TagDeletion {
        self.warn_if_unknown(tag);
        let order = self.hierarchy.subtree_post_order(tag);

        let mut detagged = BTreeSet::new();
        for member in &order {
            detagged.extend(self.contacts.strip_tag(member));
        }
        let removed = self.hierarchy.remove_subtree(tag);

        let report = TagDeletion {
            removed_tags: removed,
            reconnected_edges: Vec::new(),
            detagged_contacts: detagged,
            deleted_contacts: Vec::new(),
        };
        info!(
            %tag,
            removed = report.removed_tags.len(),
            detagged = report.detagged_contacts.len(),
            "deleted tag subtree"
        );
        self.debug_check();
        report
    }

    /// Like [`delete_tag`](Self::delete_tag), but the directly tagged contacts
    /// are deleted instead of detagged.
    pub fn delete_tag_and_direct_contacts(&mut self, tag: &Tag) -> TagDeletion {
        self.warn_if_unknown(tag);
        let deleted = self.contacts.remove_members(tag);
        let reconnected = self.hierarchy.remove_reconnecting(tag);

        let report = TagDeletion {
            removed_tags: vec![tag.clone()],
            reconnected_edges: reconnected,
            detagged_contacts: BTreeSet::new(),
            deleted_contacts: deleted,
        };
        info!(
            %tag,
            deleted = report.deleted_contacts.len(),
            reconnected = report.reconnected_edges.len(),
            "deleted tag and its contacts"
        );
        self.debug_check();
        report
    }

    /// Like [`delete_tag_recursive`](Self::delete_tag_recursive), but every
    /// contact directly tagged anywhere in the subtree is deleted.
    pub fn delete_tag_and_direct_contacts_recursive(&mut self, tag: &Tag) -> TagDeletion {
        self.warn_if_unknown(tag);
        let order = self.hierarchy.subtree_post_order(tag);

        let mut deleted = Vec::new();
        for member in &order {
            deleted.extend(self.contacts.remove_members(member));
        }
        let removed = self.hierarchy.remove_subtree(tag);

        let report = TagDeletion {
            removed_tags: removed,
            reconnected_edges: Vec::new(),
            detagged_contacts: BTreeSet::new(),
            deleted_contacts: deleted,
        };
        info!(
            %tag,
            removed = report.removed_tags.len(),
            deleted = report.deleted_contacts.len(),
            "deleted tag subtree and its contacts"
        );
        self.debug_check();
        report
    }

    /// Verify hierarchy and membership invariants together
    pub fn check_invariants(&self) -> Result<(), String> {
        self.hierarchy.check_invariants()?;
        self.contacts.check_index()
    }

    fn warn_if_unknown(&self, tag: &Tag) {
        if !self.tag_exists(tag) {
            warn!(%tag, "deleting a tag that is not in use, nothing to remove");
        }
    }

    fn debug_check(&self) {
        debug_assert!(
            self.check_invariants().is_ok(),
            "model invariant violated: {:?}",
            self.check_invariants()
        );
    }
}
