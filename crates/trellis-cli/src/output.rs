//! Plain-text rendering of command results

use comfy_table::{presets::UTF8_FULL, Table};
use trellis_core::{Contact, ContactId, Tag, TagDeletion, TagIntegrationService};

/// Render contacts as a table, or a short notice if there are none
pub fn contacts_table(rows: &[(ContactId, &Contact)]) -> String {
    if rows.is_empty() {
        return "No contacts found.".to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Id", "Name", "Phone", "Email", "Address", "Tags"]);

    for (id, contact) in rows {
        table.add_row(vec![
            id.get().to_string(),
            contact.name.clone(),
            contact.phone.clone().unwrap_or_default(),
            contact.email.clone().unwrap_or_default(),
            contact.address.clone().unwrap_or_default(),
            join_tags(&contact.tags),
        ]);
    }
    format!("{}\n{} contact(s) listed.", table, rows.len())
}

/// Render every known tag with its direct member count and sub-tags
pub fn tags_table(service: &TagIntegrationService) -> String {
    let tags = service.all_tags();
    if tags.is_empty() {
        return "No tags found.".to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Tag", "Members", "Sub-tags"]);

    for tag in &tags {
        let name = if service.hierarchy().is_super_tag(tag) {
            format!("{} (super-tag)", tag)
        } else {
            tag.to_string()
        };
        table.add_row(vec![
            name,
            service.members_of(tag).len().to_string(),
            join_tags(service.hierarchy().children(tag)),
        ]);
    }
    table.to_string()
}

/// `label: a, b, c` or `empty` when there are no tags
pub fn tag_list<'a>(label: &str, tags: impl IntoIterator<Item = &'a Tag>, empty: &str) -> String {
    let joined = join_tags(tags);
    if joined.is_empty() {
        empty.to_string()
    } else {
        format!("{}: {}", label, joined)
    }
}

/// Summarise a tag deletion for the user
pub fn deletion_summary(tag: &Tag, report: &TagDeletion) -> String {
    let mut lines = Vec::new();

    if report.removed_tags.len() > 1 {
        lines.push(format!(
            "Deleted tag '{}' and its sub-tags: {}",
            tag,
            join_tags(report.removed_tags.iter().filter(|t| *t != tag))
        ));
    } else {
        lines.push(format!("Deleted tag '{}'", tag));
    }

    if !report.reconnected_edges.is_empty() {
        let edges: Vec<String> = report
            .reconnected_edges
            .iter()
            .map(|(parent, child)| format!("{} -> {}", parent, child))
            .collect();
        lines.push(format!("Reconnected: {}", edges.join(", ")));
    }
    if !report.detagged_contacts.is_empty() {
        lines.push(format!(
            "Removed from {} contact(s)",
            report.detagged_contacts.len()
        ));
    }
    if !report.deleted_contacts.is_empty() {
        let names: Vec<&str> = report
            .deleted_contacts
            .iter()
            .map(|(_, contact)| contact.name.as_str())
            .collect();
        lines.push(format!(
            "Deleted {} contact(s): {}",
            names.len(),
            names.join(", ")
        ));
    }
    lines.join("\n")
}

fn join_tags<'a>(tags: impl IntoIterator<Item = &'a Tag>) -> String {
    tags.into_iter()
        .map(Tag::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> Tag {
        Tag::new(name).unwrap()
    }

    #[test]
    fn test_empty_contacts() {
        assert_eq!(contacts_table(&[]), "No contacts found.");
    }

    #[test]
    fn test_contacts_table_lists_tags() {
        let contact = Contact::new("Alex Yeoh").with_tags([tag("friends"), tag("cs1231s")]);
        let out = contacts_table(&[(ContactId::new(0), &contact)]);
        assert!(out.contains("Alex Yeoh"));
        assert!(out.contains("cs1231s, friends"));
        assert!(out.ends_with("1 contact(s) listed."));
    }

    #[test]
    fn test_tag_list() {
        let tags = [tag("computing"), tag("science")];
        assert_eq!(
            tag_list("Sub-tags of 'nus'", &tags, "none"),
            "Sub-tags of 'nus': computing, science"
        );
        assert_eq!(tag_list("x", &[], "none"), "none");
    }

    #[test]
    fn test_deletion_summary_mentions_reconnections() {
        let report = TagDeletion {
            removed_tags: vec![tag("sciencecomp")],
            reconnected_edges: vec![(tag("computing"), tag("cs1231s"))],
            ..Default::default()
        };
        let out = deletion_summary(&tag("sciencecomp"), &report);
        assert_eq!(
            out,
            "Deleted tag 'sciencecomp'\nReconnected: computing -> cs1231s"
        );
    }

    #[test]
    fn test_deletion_summary_lists_subtree_and_contacts() {
        let report = TagDeletion {
            removed_tags: vec![tag("cs1231s"), tag("computing")],
            deleted_contacts: vec![(ContactId::new(3), Contact::new("Roy"))],
            ..Default::default()
        };
        let out = deletion_summary(&tag("computing"), &report);
        assert!(out.starts_with("Deleted tag 'computing' and its sub-tags: cs1231s"));
        assert!(out.ends_with("Deleted 1 contact(s): Roy"));
    }
}
