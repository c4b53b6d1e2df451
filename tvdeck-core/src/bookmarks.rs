// Reading browser bookmark exports (Chrome/Chromium `Bookmarks` JSON)

use crate::error::{DeckError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sub-roots every export is searched in, in this order.
pub const CONVENTIONAL_ROOTS: [&str; 3] = ["bookmark_bar", "other", "synced"];

/// Folder the deck shows unless configured otherwise.
pub const DEFAULT_FOLDER: &str = "TV";

/// Document fed through the pipeline by the "sample" command.
pub const SAMPLE_DOCUMENT: &str = r#"{
  "roots": {
    "bookmark_bar": {
      "children": [
        {
          "name": "TV",
          "type": "folder",
          "children": [
            { "name": "Stream 1", "type": "url", "url": "https://example.com" },
            { "name": "Stream 2", "type": "url", "url": "https://example.org" },
            { "name": "Stream 3", "type": "url", "url": "https://example.net" }
          ]
        }
      ]
    }
  }
}"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkNode {
    Folder(Folder),
    Link(Link),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Folder {
    pub name: String,
    pub children: Vec<BookmarkNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    pub name: String,
    pub url: String,
}

/// A bookmarked link as shown on a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub title: String,
    pub url: String,
}

/// Parsed export: the sub-roots in search order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkDocument {
    pub roots: Vec<(String, Folder)>,
}

/// Parse an export. Accepts `{ "roots": { ... } }` or the roots object
/// itself. Missing fields never fail; only malformed JSON does.
pub fn parse_document(text: &str) -> Result<BookmarkDocument> {
    let value: Value = serde_json::from_str(text).map_err(|e| DeckError::Parse(e.to_string()))?;

    let Value::Object(top) = value else {
        return Err(DeckError::Parse("top level is not an object".to_string()));
    };

    let roots = match top.get("roots") {
        Some(Value::Object(roots)) => roots,
        _ => &top,
    };

    Ok(BookmarkDocument {
        roots: collect_roots(roots),
    })
}

fn collect_roots(roots: &Map<String, Value>) -> Vec<(String, Folder)> {
    let mut collected = Vec::new();

    for key in CONVENTIONAL_ROOTS {
        if let Some(value @ Value::Object(_)) = roots.get(key) {
            collected.push((key.to_string(), folder_from_value(value)));
        }
    }

    // Any other object-valued key is treated as an extra sub-root.
    for (key, value) in roots {
        if CONVENTIONAL_ROOTS.contains(&key.as_str()) || !value.is_object() {
            continue;
        }
        collected.push((key.clone(), folder_from_value(value)));
    }

    collected
}

fn string_field(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Build a folder from any JSON value, ignoring its `type`.
fn folder_from_value(value: &Value) -> Folder {
    let children = value
        .get("children")
        .and_then(Value::as_array)
        .map(|children| children.iter().filter_map(node_from_value).collect())
        .unwrap_or_default();

    Folder {
        name: string_field(value, "name"),
        children,
    }
}

fn node_from_value(value: &Value) -> Option<BookmarkNode> {
    match value.get("type").and_then(Value::as_str)? {
        "folder" => Some(BookmarkNode::Folder(folder_from_value(value))),
        "url" => Some(BookmarkNode::Link(Link {
            name: string_field(value, "name"),
            url: string_field(value, "url"),
        })),
        _ => None,
    }
}

/// First folder named exactly `name`, searching each sub-root depth-first in
/// document order.
pub fn find_named_folder<'a>(document: &'a BookmarkDocument, name: &str) -> Option<&'a Folder> {
    document
        .roots
        .iter()
        .find_map(|(_, root)| find_in_folder(root, name))
}

fn find_in_folder<'a>(folder: &'a Folder, name: &str) -> Option<&'a Folder> {
    if folder.name == name {
        return Some(folder);
    }

    folder.children.iter().find_map(|child| match child {
        BookmarkNode::Folder(sub) => find_in_folder(sub, name),
        BookmarkNode::Link(_) => None,
    })
}

/// Every link under `folder`: its direct links first, then each subfolder's
/// links in order.
pub fn flatten_links(folder: &Folder) -> Vec<LinkEntry> {
    let mut links = Vec::new();
    collect_links(folder, &mut links);
    links
}

fn collect_links(folder: &Folder, links: &mut Vec<LinkEntry>) {
    for child in &folder.children {
        if let BookmarkNode::Link(link) = child {
            links.push(LinkEntry {
                title: link.name.clone(),
                url: link.url.clone(),
            });
        }
    }

    for child in &folder.children {
        if let BookmarkNode::Folder(sub) = child {
            collect_links(sub, links);
        }
    }
}

/// Parse, locate the folder and flatten it in one go.
pub fn extract_folder_links(text: &str, folder_name: &str) -> Result<Vec<LinkEntry>> {
    let document = parse_document(text)?;
    let folder = find_named_folder(&document, folder_name)
        .ok_or_else(|| DeckError::FolderNotFound(folder_name.to_string()))?;
    Ok(flatten_links(folder))
}
