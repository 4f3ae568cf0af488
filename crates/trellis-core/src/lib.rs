//! # Trellis Core
//!
//! In-memory model of the trellis address book: contacts, the tags they carry,
//! and the hierarchy those tags form.
//!
//! ## Components
//!
//! - [`TagHierarchy`]: multi-parent DAG of super-tag -> sub-tag edges with
//!   cycle rejection on every insertion
//! - [`TagMembershipIndex`]: which contacts carry each tag directly
//! - [`ContactStore`]: contact arena that keeps the membership index in sync
//! - [`TagIntegrationService`]: recursive membership queries and the
//!   reconnect / cascade tag deletions
//!
//! Persistence is abstracted behind [`SnapshotStore`]; this crate never touches
//! the filesystem.

pub mod contact;
pub mod error;
pub mod hierarchy;
pub mod membership;
pub mod service;
pub mod snapshot;
pub mod storage;
pub mod store;
pub mod tag;

pub use contact::{Contact, ContactId};
pub use error::{CoreError, CoreResult};
pub use hierarchy::{ChildrenMap, TagHierarchy};
pub use membership::TagMembershipIndex;
pub use service::{TagDeletion, TagIntegrationService};
pub use snapshot::{AddressBookSnapshot, ContactRecord, SNAPSHOT_VERSION};
pub use storage::{SnapshotStore, StorageError, StorageResult};
pub use store::ContactStore;
pub use tag::{ChildSelector, Tag, WILDCARD};
