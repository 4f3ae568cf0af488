use std::collections::BTreeSet;

use anyhow::{bail, Result};
use trellis_core::{Contact, ContactId, Tag, TagIntegrationService};

use super::{parse_tag, parse_tags, require_contact, require_tag, Outcome};
use crate::cli::{ContactCommands, ContactFields};
use crate::output;

pub fn execute(command: ContactCommands, service: &mut TagIntegrationService) -> Result<Outcome> {
    match command {
        ContactCommands::Add { name, fields, tags } => {
            let tags = parse_tags(&tags)?;
            let contact = apply_fields(Contact::new(name.trim()), fields).with_tags(tags);
            let name = contact.name.clone();
            let id = service.add_contact(contact)?;
            Ok(Outcome::changed(format!("New contact added: {} {}", id, name)))
        }

        ContactCommands::Edit {
            id,
            name,
            fields,
            tags,
            clear_tags,
        } => {
            let (id, current) = require_contact(service, id)?;
            let current = current.clone();

            let mut updated = apply_fields(current.clone(), fields);
            if let Some(name) = name {
                updated.name = name.trim().to_string();
            }
            if !tags.is_empty() {
                updated.tags = parse_tags(&tags)?.into_iter().collect();
            }
            if clear_tags {
                updated.tags.clear();
            }
            if updated == current {
                bail!("Nothing to change: provide at least one different field");
            }

            let name = updated.name.clone();
            service.update_contact(id, updated)?;
            Ok(Outcome::changed(format!("Edited contact: {} {}", id, name)))
        }

        ContactCommands::Delete { id } => {
            let (id, _) = require_contact(service, id)?;
            let Some(contact) = service.remove_contact(id) else {
                bail!("Contact {} does not exist", id);
            };
            Ok(Outcome::changed(format!("Deleted contact: {} {}", id, contact.name)))
        }

        ContactCommands::List { tag, recursive } => {
            let ids: Vec<ContactId> = match tag {
                Some(raw) => {
                    let tag = parse_tag(&raw)?;
                    require_tag(service, &tag)?;
                    if recursive {
                        service.all_persons_under_tag(&tag).into_iter().collect()
                    } else {
                        service.members_of(&tag).iter().copied().collect()
                    }
                }
                None => service.contacts().iter().map(|(id, _)| id).collect(),
            };
            let rows: Vec<_> = ids
                .into_iter()
                .filter_map(|id| service.contacts().get(id).map(|c| (id, c)))
                .collect();
            Ok(Outcome::unchanged(output::contacts_table(&rows)))
        }

        ContactCommands::Tag { id, tags } => {
            let (id, _) = require_contact(service, id)?;
            let tags: BTreeSet<Tag> = parse_tags(&tags)?.into_iter().collect();
            for tag in &tags {
                if service.contacts().index().contains(tag, id) {
                    bail!("Contact {} already has tag '{}'", id, tag);
                }
            }
            for tag in &tags {
                service.tag_contact(id, tag)?;
            }
            Ok(Outcome::changed(output::tag_list(
                &format!("Tagged contact {}", id),
                &tags,
                "",
            )))
        }

        ContactCommands::Untag { id, tags } => {
            let (id, _) = require_contact(service, id)?;
            let tags: BTreeSet<Tag> = parse_tags(&tags)?.into_iter().collect();
            for tag in &tags {
                if !service.contacts().index().contains(tag, id) {
                    bail!("Contact {} does not have tag '{}'", id, tag);
                }
            }
            for tag in &tags {
                service.untag_contact(id, tag)?;
            }
            Ok(Outcome::changed(output::tag_list(
                &format!("Untagged contact {}", id),
                &tags,
                "",
            )))
        }
    }
}

fn apply_fields(mut contact: Contact, fields: ContactFields) -> Contact {
    if let Some(phone) = fields.phone {
        contact = contact.with_phone(phone);
    }
    if let Some(email) = fields.email {
        contact = contact.with_email(email);
    }
    if let Some(address) = fields.address {
        contact = contact.with_address(address);
    }
    contact
}
