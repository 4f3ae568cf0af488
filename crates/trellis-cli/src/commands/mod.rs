//! Command handlers
//!
//! Handlers do the caller-level validation (does the tag exist, is the edge
//! already there, is the contact already tagged) before touching the model,
//! so a rejected command never leaves partial changes behind.

pub mod contact;
pub mod tag;

use anyhow::{ensure, Context, Result};
use trellis_core::{Contact, ContactId, Tag, TagIntegrationService};

use crate::cli::Commands;

/// Result of a command: what to print and whether the model must be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub message: String,
    pub mutated: bool,
}

impl Outcome {
    pub fn changed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            mutated: true,
        }
    }

    pub fn unchanged(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            mutated: false,
        }
    }
}

pub fn execute(command: Commands, service: &mut TagIntegrationService) -> Result<Outcome> {
    match command {
        Commands::Contact(cmd) => contact::execute(cmd, service),
        Commands::Tag(cmd) => tag::execute(cmd, service),
    }
}

pub(crate) fn parse_tag(raw: &str) -> Result<Tag> {
    Ok(Tag::new(raw)?)
}

pub(crate) fn parse_tags(raw: &[String]) -> Result<Vec<Tag>> {
    raw.iter().map(|t| parse_tag(t)).collect()
}

pub(crate) fn require_tag(service: &TagIntegrationService, tag: &Tag) -> Result<()> {
    ensure!(service.tag_exists(tag), "Tag '{}' does not exist", tag);
    Ok(())
}

pub(crate) fn require_contact(
    service: &TagIntegrationService,
    id: u64,
) -> Result<(ContactId, &Contact)> {
    let id = ContactId::new(id);
    let contact = service
        .contacts()
        .get(id)
        .with_context(|| format!("Contact {} does not exist", id))?;
    Ok((id, contact))
}
