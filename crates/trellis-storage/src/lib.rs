//! JSON file storage for address book snapshots

mod json;

pub use json::JsonSnapshotStore;
