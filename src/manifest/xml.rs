//! Minimal XML tree built from the pest grammar in `xml.pest`

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

#[derive(Parser)]
#[grammar = "manifest/xml.pest"]
struct XmlParser;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    #[error("{0}")]
    Syntax(String),

    #[error("closing tag </{close}> does not match <{open}>")]
    MismatchedTag { open: String, close: String },

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Value of an attribute, ignoring any namespace prefix on the stored name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name || key.rsplit(':').next() == Some(name))
            .map(|(_, value)| value.as_str())
    }

    /// Concatenated text content of the direct children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                XmlNode::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Parse a document and return its root element
pub fn parse_document(input: &str) -> Result<XmlElement, XmlError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let document = XmlParser::parse(Rule::document, input)
        .map_err(|e| XmlError::Syntax(e.to_string()))?
        .next()
        .ok_or_else(|| XmlError::Syntax("empty document".to_string()))?;

    document
        .into_inner()
        .find(|pair| pair.as_rule() == Rule::element)
        .ok_or_else(|| XmlError::Syntax("document has no root element".to_string()))
        .and_then(build_element)
}

fn build_element(pair: Pair<'_, Rule>) -> Result<XmlElement, XmlError> {
    let mut inner = pair.into_inner();
    let name = inner
        .next()
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| XmlError::Syntax("element without a name".to_string()))?;

    let mut element = XmlElement {
        name,
        ..Default::default()
    };

    for pair in inner {
        match pair.as_rule() {
            Rule::attribute => {
                let mut parts = pair.into_inner();
                let key = parts.next().map(|p| p.as_str()).unwrap_or_default();
                let raw = parts
                    .next()
                    .and_then(|value| value.into_inner().next())
                    .map(|p| p.as_str())
                    .unwrap_or_default();
                element
                    .attributes
                    .push((key.to_string(), decode_entities(raw)));
            }
            Rule::element => element
                .children
                .push(XmlNode::Element(build_element(pair)?)),
            Rule::text => {
                let text = decode_entities(pair.as_str().trim());
                if !text.is_empty() {
                    element.children.push(XmlNode::Text(text));
                }
            }
            Rule::cdata => {
                let text = pair.into_inner().next().map(|p| p.as_str()).unwrap_or_default();
                element.children.push(XmlNode::Text(text.to_string()));
            }
            Rule::comment => {
                let text = pair.into_inner().next().map(|p| p.as_str()).unwrap_or_default();
                element
                    .children
                    .push(XmlNode::Comment(text.trim().to_string()));
            }
            Rule::close_tag => {
                let close = pair.into_inner().next().map(|p| p.as_str()).unwrap_or_default();
                if close != element.name {
                    return Err(XmlError::MismatchedTag {
                        open: element.name,
                        close: close.to_string(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(element)
}

/// Replace the predefined and numeric character references
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        let Some(end) = after.find(';') else {
            out.push_str(after);
            return out;
        };
        let entity = &after[1..end];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => out.push(c),
            None => out.push_str(&after[..=end]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_document() {
        let doc = r#"<?xml version="1.0" encoding="utf-8"?>
<!-- generated -->
<resources>
    <version>1</version>
    <!-- Camera -->
    <item component="ComponentInfo{com.cam/com.cam.Main}" drawable='camera' />
</resources>
"#;
        let root = parse_document(doc).unwrap();
        assert_eq!(root.name, "resources");
        assert_eq!(root.children.len(), 3);

        let XmlNode::Element(version) = &root.children[0] else {
            panic!("expected element");
        };
        assert_eq!(version.text(), "1");
        assert_eq!(root.children[1], XmlNode::Comment("Camera".to_string()));

        let XmlNode::Element(item) = &root.children[2] else {
            panic!("expected element");
        };
        assert_eq!(item.attr("drawable"), Some("camera"));
        assert_eq!(
            item.attr("component"),
            Some("ComponentInfo{com.cam/com.cam.Main}")
        );
    }

    #[test]
    fn test_namespaced_attribute_lookup() {
        let root = parse_document(r#"<item android:drawable="clock"/>"#).unwrap();
        assert_eq!(root.attr("drawable"), Some("clock"));
        assert_eq!(root.attr("android:drawable"), Some("clock"));
    }

    #[test]
    fn test_mismatched_tag() {
        let err = parse_document("<resources><item></resources>").unwrap_err();
        assert!(matches!(err, XmlError::MismatchedTag { .. } | XmlError::Syntax(_)));

        let err = parse_document("<resources></item>").unwrap_err();
        assert_eq!(
            err,
            XmlError::MismatchedTag {
                open: "resources".to_string(),
                close: "item".to_string()
            }
        );
    }

    #[test]
    fn test_truncated_document_is_syntax_error() {
        assert!(matches!(
            parse_document("<resources><item drawable=\"a\""),
            Err(XmlError::Syntax(_))
        ));
        assert!(matches!(parse_document(""), Err(XmlError::Syntax(_))));
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode_entities("&lt;b&gt; &#65;&#x42;"), "<b> AB");
        assert_eq!(decode_entities("&unknown; & done"), "&unknown; & done");
        assert_eq!(decode_entities("plain"), "plain");
    }

    #[test]
    fn test_cdata_is_text() {
        let root = parse_document("<note><![CDATA[a < b]]></note>").unwrap();
        assert_eq!(root.text(), "a < b");
    }
}
