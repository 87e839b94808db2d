//! Turning filtered items into flat search records.
//!
//! Every top-level string value is reduced to plain text: script/style blocks are dropped,
//! remaining tags become spaces, six common entities are decoded and whitespace collapsed.
//! Nested values (arrays, objects) are copied as they are.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::contract::{Item, Record};

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script>").expect("script pattern"));
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b.*?</style>").expect("style pattern"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\x{FEFF}]+").expect("whitespace pattern"));

// Decoded in this order, one pass each.
const ENTITIES: [(&str, &str); 6] = [
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#039;", "'"),
];

/// Reduce an HTML fragment to plain text. Never fails; unterminated tags are left in place.
pub fn strip_to_plain_text(html: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(html, "");
    let text = STYLE_BLOCK.replace_all(&text, "");
    let mut text = TAG.replace_all(&text, " ").into_owned();

    for (entity, replacement) in ENTITIES {
        if text.contains(entity) {
            text = text.replace(entity, replacement);
        }
    }

    WHITESPACE
        .replace_all(&text, " ")
        .trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
        .to_string()
}

/// Strip a single field value. Only strings are touched.
pub fn strip_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(strip_to_plain_text(&s)),
        other => other,
    }
}

/// Build the record for one item.
///
/// `objectID` is always the item id. Field data keys follow in source order, then the
/// metadata keys that are present on the item.
pub fn to_record(item: &Item) -> Record {
    let mut attributes = serde_json::Map::new();

    if let Some(field_data) = &item.field_data {
        for (key, value) in field_data {
            if key == "objectID" {
                continue;
            }
            attributes.insert(key.clone(), strip_value(value.clone()));
        }
    }

    let timestamps = [
        ("createdOn", &item.created_on),
        ("updatedOn", &item.updated_on),
        ("publishedOn", &item.published_on),
    ];
    for (key, value) in timestamps {
        if let Some(value) = value {
            attributes.insert(key.to_string(), Value::String(value.clone()));
        }
    }

    let flags = [("isDraft", item.is_draft), ("isArchived", item.is_archived)];
    for (key, value) in flags {
        if let Some(value) = value {
            attributes.insert(key.to_string(), Value::Bool(value));
        }
    }

    Record {
        object_id: item.id.clone(),
        attributes,
    }
}

pub fn transform_items(items: &[Item]) -> Vec<Record> {
    items.iter().map(to_record).collect()
}
