//! # Trellis Configuration
//!
//! Loads the `trl` configuration file. Every field has a default, so a missing
//! file or a partial file are both valid.
//!
//! ```toml
//! [storage]
//! data_file = "~/contacts/addressbook.json"
//! pretty_json = true
//!
//! [logging]
//! level = "debug"
//! ```

#![warn(missing_docs)]

mod config;

pub use config::*;
