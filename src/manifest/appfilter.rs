//! Icon entries extracted from `appfilter.xml` and `drawable.xml`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::xml::{XmlElement, XmlError, XmlNode};
use crate::storage::validate_icon_id;

/// One launcher component themed by an icon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRef {
    pub component: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
}

impl ComponentRef {
    /// Split `ComponentInfo{package/activity}` into its parts
    pub fn parse(raw: &str) -> Self {
        let inner = raw
            .strip_prefix("ComponentInfo{")
            .and_then(|rest| rest.strip_suffix('}'));
        let (package, activity) = match inner.and_then(|inner| inner.split_once('/')) {
            Some((package, activity)) => {
                let activity = match activity.strip_prefix('.') {
                    Some(relative) => format!("{package}.{relative}"),
                    None => activity.to_string(),
                };
                (Some(package.to_string()), Some(activity))
            }
            None => (None, None),
        };
        Self {
            component: raw.to_string(),
            package,
            activity,
        }
    }
}

/// Everything the manifests say about one icon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconEntry {
    pub name: String,
    pub components: Vec<ComponentRef>,
    pub categories: Vec<String>,
}

/// Group `<item component=".." drawable=".."/>` records by drawable
///
/// The display name is the `name` attribute when present, otherwise the
/// comment heading the item's group, otherwise the drawable itself. A comment
/// heads the run of items that follows it until the drawable changes.
pub fn extract_icons(root: &XmlElement) -> Result<BTreeMap<String, IconEntry>, XmlError> {
    let mut icons: BTreeMap<String, IconEntry> = BTreeMap::new();
    let mut last_comment: Option<&str> = None;
    let mut comment_owner: Option<&str> = None;

    for child in &root.children {
        let item = match child {
            XmlNode::Comment(comment) if !comment.is_empty() => {
                last_comment = Some(comment.as_str());
                comment_owner = None;
                continue;
            }
            XmlNode::Element(element) if element.name == "item" => element,
            _ => continue,
        };

        let Some(drawable) = item.attr("drawable").map(str::trim).filter(|d| !d.is_empty())
        else {
            continue;
        };
        validate_icon_id(drawable)
            .map_err(|_| XmlError::Invalid(format!("drawable {drawable:?} is not a valid icon id")))?;

        match comment_owner {
            Some(owner) if owner != drawable => last_comment = None,
            Some(_) => {}
            None => comment_owner = Some(drawable),
        }

        let name = item
            .attr("name")
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .or(last_comment);

        let entry = icons.entry(drawable.to_string()).or_insert_with(|| IconEntry {
            name: drawable.to_string(),
            components: Vec::new(),
            categories: Vec::new(),
        });
        if let Some(name) = name {
            if entry.name == drawable {
                entry.name = name.to_string();
            }
        }
        if let Some(component) = item.attr("component").filter(|c| !c.is_empty()) {
            let component = ComponentRef::parse(component);
            if !entry.components.contains(&component) {
                entry.components.push(component);
            }
        }
    }

    Ok(icons)
}

/// Attach `drawable.xml` categories to icons already extracted
///
/// Every `<item drawable=".."/>` belongs to the nearest preceding
/// `<category title=".."/>`. Icons unknown to the icon map are ignored.
pub fn apply_categories(root: &XmlElement, icons: &mut BTreeMap<String, IconEntry>) {
    let mut current: Option<&str> = None;

    for child in &root.children {
        let XmlNode::Element(element) = child else {
            continue;
        };
        match element.name.as_str() {
            "category" => current = element.attr("title").filter(|t| !t.is_empty()),
            "item" => {
                let (Some(category), Some(drawable)) = (current, element.attr("drawable")) else {
                    continue;
                };
                if let Some(entry) = icons.get_mut(drawable) {
                    if !entry.categories.iter().any(|c| c == category) {
                        entry.categories.push(category.to_string());
                    }
                }
            }
            _ => {}
        }
    }
}
