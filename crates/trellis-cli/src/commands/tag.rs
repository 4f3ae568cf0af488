use anyhow::{bail, ensure, Result};
use trellis_core::{ChildSelector, TagIntegrationService};

use super::{parse_tag, require_tag, Outcome};
use crate::cli::TagCommands;
use crate::output;

pub fn execute(command: TagCommands, service: &mut TagIntegrationService) -> Result<Outcome> {
    match command {
        TagCommands::Link { parent, child } => {
            let parent = parse_tag(&parent)?;
            let child = parse_tag(&child)?;
            ensure!(
                !service.hierarchy().has_edge(&parent, &child),
                "'{}' is already a sub-tag of '{}'",
                child,
                parent
            );
            service.add_edge(&parent, &child)?;
            Ok(Outcome::changed(format!(
                "Linked '{}' under '{}'",
                child, parent
            )))
        }

        TagCommands::Unlink { parent, child } => {
            let parent = parse_tag(&parent)?;
            let selector = ChildSelector::parse(&child)?;
            match &selector {
                ChildSelector::One(child) if !service.hierarchy().has_edge(&parent, child) => {
                    bail!("'{}' is not a sub-tag of '{}'", child, parent)
                }
                ChildSelector::All if !service.hierarchy().is_super_tag(&parent) => {
                    bail!("'{}' has no sub-tags", parent)
                }
                _ => {}
            }
            let removed = service.remove_edge(&parent, &selector);
            Ok(Outcome::changed(output::tag_list(
                &format!("Unlinked from '{}'", parent),
                &removed,
                "",
            )))
        }

        TagCommands::Children { tag } => {
            let tag = parse_tag(&tag)?;
            require_tag(service, &tag)?;
            Ok(Outcome::unchanged(output::tag_list(
                &format!("Sub-tags of '{}'", tag),
                service.hierarchy().children(&tag),
                &format!("'{}' has no sub-tags", tag),
            )))
        }

        TagCommands::Parents { tag } => {
            let tag = parse_tag(&tag)?;
            require_tag(service, &tag)?;
            Ok(Outcome::unchanged(output::tag_list(
                &format!("Super-tags of '{}'", tag),
                service.hierarchy().parents(&tag),
                &format!("'{}' has no super-tags", tag),
            )))
        }

        TagCommands::Descendants { tag } => {
            let tag = parse_tag(&tag)?;
            require_tag(service, &tag)?;
            let descendants = service.hierarchy().descendants(&tag);
            Ok(Outcome::unchanged(output::tag_list(
                &format!("Tags under '{}'", tag),
                &descendants,
                &format!("'{}' has no sub-tags", tag),
            )))
        }

        TagCommands::Members { tag, recursive } => {
            let tag = parse_tag(&tag)?;
            require_tag(service, &tag)?;
            let rows = if recursive {
                service.contacts_under_tag(&tag)
            } else {
                service
                    .members_of(&tag)
                    .iter()
                    .filter_map(|id| service.contacts().get(*id).map(|c| (*id, c)))
                    .collect()
            };
            Ok(Outcome::unchanged(output::contacts_table(&rows)))
        }

        TagCommands::Supertags => Ok(Outcome::unchanged(output::tag_list(
            "Super-tags",
            service.hierarchy().super_tags(),
            "No super-tags found.",
        ))),

        TagCommands::List => Ok(Outcome::unchanged(output::tags_table(service))),

        TagCommands::Delete {
            tag,
            recursive,
            with_contacts,
        } => {
            let tag = parse_tag(&tag)?;
            if !service.tag_exists(&tag) {
                bail!("Tag '{}' does not exist", tag);
            }
            let report = match (recursive, with_contacts) {
                (false, false) => service.delete_tag(&tag),
                (true, false) => service.delete_tag_recursive(&tag),
                (false, true) => service.delete_tag_and_direct_contacts(&tag),
                (true, true) => service.delete_tag_and_direct_contacts_recursive(&tag),
            };
            Ok(Outcome::changed(output::deletion_summary(&tag, &report)))
        }
    }
}
