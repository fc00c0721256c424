//! Query-time search and grouping over a built catalog.
//!
//! Nothing here is stored: the catalog keeps raw playlist groups, and browse
//! groups are derived on every query from the source name plus the coarse
//! category. Group ordering is part of the contract: sources alphabetically,
//! the General fallback last within each source, then the full group name.

use std::collections::HashMap;

use crate::categories::Category;
use crate::models::Channel;

/// One expandable group in the browse list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelGroup {
    /// `"{source} - {category}"`
    pub name: String,
    pub channels: Vec<Channel>,
}

/// Case-insensitive substring filter over name, raw group and source label.
/// An empty search matches everything.
pub fn filter_channels(channels: &[Channel], search: &str) -> Vec<Channel> {
    if search.is_empty() {
        return channels.to_vec();
    }
    let needle = search.to_lowercase();
    channels
        .iter()
        .filter(|c| {
            c.name.to_lowercase().contains(&needle)
                || c.group.to_lowercase().contains(&needle)
                || c.source_name.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Group channels by `"{source} - {category}"` and sort the groups.
///
/// Channel order inside a group follows catalog order. Groups sort by source
/// name, then General after every named category of the same source, then
/// alphabetically by full group name.
pub fn group_channels(channels: &[Channel]) -> Vec<ChannelGroup> {
    struct Entry {
        source: String,
        is_general: bool,
        name: String,
        channels: Vec<Channel>,
    }

    let mut slot_by_name: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<Entry> = Vec::new();

    for channel in channels {
        let category = Category::classify(&channel.group);
        let name = format!("{} - {}", channel.source_name, category);
        match slot_by_name.get(&name) {
            Some(&slot) => entries[slot].channels.push(channel.clone()),
            None => {
                slot_by_name.insert(name.clone(), entries.len());
                entries.push(Entry {
                    source: channel.source_name.clone(),
                    is_general: category.is_general(),
                    name,
                    channels: vec![channel.clone()],
                });
            }
        }
    }

    entries.sort_by(|a, b| {
        a.source
            .cmp(&b.source)
            .then(a.is_general.cmp(&b.is_general))
            .then(a.name.cmp(&b.name))
    });

    entries
        .into_iter()
        .map(|e| ChannelGroup {
            name: e.name,
            channels: e.channels,
        })
        .collect()
}
