//! Publication-state and status-field filters.
//!
//! Both filters are pure: they take the item list by value and return the kept subset in
//! the input order.

use serde_json::Value;

use crate::contract::Item;

/// An item is live when it has been published and is neither a draft nor archived.
///
/// Absent draft/archived flags do not exclude; only an explicit `true` does.
pub fn is_published(item: &Item) -> bool {
    item.last_published.is_some() && item.is_draft != Some(true) && item.is_archived != Some(true)
}

pub fn filter_published(items: Vec<Item>) -> Vec<Item> {
    items.into_iter().filter(is_published).collect()
}

/// Opt-out check for one item against the named status field.
///
/// Only an explicit boolean `false` excludes. Missing field data, a missing field, `null`,
/// `""`, `true` and any other value all keep the item.
pub fn passes_status_field(item: &Item, field_name: &str) -> bool {
    let Some(field_data) = &item.field_data else {
        return true;
    };
    !matches!(field_data.get(field_name), Some(Value::Bool(false)))
}

/// Narrows `items` by the status field. A blank field name disables the filter.
pub fn filter_by_status_field(items: Vec<Item>, field_name: &str) -> Vec<Item> {
    if field_name.trim().is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| passes_status_field(item, field_name))
        .collect()
}
