//! Library side of the `trl` binary
//!
//! Commands operate on an in-memory [`trellis_core::TagIntegrationService`]
//! and return an [`commands::Outcome`]; loading and saving the snapshot is
//! left to `main`.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod output;
