//! Template document loading and serialization.
//!
//! A golden template is parsed once into an owned [`XmlElement`] tree and
//! held read-only for the lifetime of a batch. Generated documents are
//! serialized back with [`render`], which writes a standard XML declaration
//! and two-space indentation; the element set, ordering and attributes come
//! straight from the tree, so output is structurally isomorphic to whatever
//! tree it is given.

use crate::error::TemplateError;
use crate::tree::{XmlElement, XmlNode};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::path::Path;

/// A parsed golden template.
///
/// Immutable once loaded; the classifier reads it and the mutator clones it
/// per generated document.
#[derive(Debug, Clone)]
pub struct TemplateDocument {
    root: XmlElement,
}

impl TemplateDocument {
    /// Parse a template from an XML string.
    pub fn parse(xml: &str) -> Result<Self, TemplateError> {
        let root = parse_tree(xml)?;
        Ok(Self { root })
    }

    /// Load and parse a template file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TemplateError> {
        let xml = std::fs::read_to_string(path)?;
        Self::parse(&xml)
    }

    /// The template root element.
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Clone the tree for one generation pass.
    pub fn clone_root(&self) -> XmlElement {
        self.root.clone()
    }
}

fn parse_tree(xml: &str) -> Result<XmlElement, TemplateError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                stack.push(element_from_start(&e)?);
            }
            Event::Empty(e) => {
                let element = element_from_start(&e)?;
                attach(&mut stack, &mut root, XmlNode::Element(element))?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| TemplateError::Malformed("unexpected closing tag".into()))?;
                attach(&mut stack, &mut root, XmlNode::Element(element))?;
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                if !text.is_empty() {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::Text(text.into_owned()));
                    }
                }
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::Text(text));
                }
            }
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if !stack.is_empty() {
        return Err(TemplateError::Malformed("unclosed element".into()));
    }
    root.ok_or_else(|| TemplateError::Malformed("document has no root element".into()))
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement, TemplateError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = XmlElement::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| TemplateError::Malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut Vec<XmlElement>,
    root: &mut Option<XmlElement>,
    node: XmlNode,
) -> Result<(), TemplateError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None => match node {
            XmlNode::Element(element) if root.is_none() => {
                *root = Some(element);
                Ok(())
            }
            _ => Err(TemplateError::Malformed(
                "content outside the root element".into(),
            )),
        },
    }
}

/// Serialize a tree as a standalone XML document.
pub fn render(root: &XmlElement) -> Result<Vec<u8>, TemplateError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, root)?;
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    element: &XmlElement,
) -> Result<(), quick_xml::Error> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            XmlNode::Element(e) => write_element(writer, e)?,
            XmlNode::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::same_structure;

    const SMALL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<REF_I12 xmlns="urn:hl7-org:v2xml">
  <MSH>
    <MSH.10>abc-123</MSH.10>
  </MSH>
  <PID>
    <PID.8>F</PID.8>
    <PID.5>
      <XPN.1>SMITH &amp; SONS</XPN.1>
    </PID.5>
  </PID>
</REF_I12>"#;

    #[test]
    fn test_parse_shape_and_text() {
        let doc = TemplateDocument::parse(SMALL).unwrap();
        let root = doc.root();
        assert_eq!(root.local_name(), "REF_I12");
        assert_eq!(
            root.attributes,
            vec![("xmlns".to_string(), "urn:hl7-org:v2xml".to_string())]
        );

        let (_, pid) = root.child("PID").unwrap();
        let (_, sex) = pid.child("PID.8").unwrap();
        assert_eq!(sex.text(), "F");

        // Entities are unescaped on read.
        let (_, name) = pid.child("PID.5").unwrap();
        let (_, fam) = name.child("XPN.1").unwrap();
        assert_eq!(fam.text(), "SMITH & SONS");
    }

    #[test]
    fn test_render_roundtrip_is_isomorphic() {
        let doc = TemplateDocument::parse(SMALL).unwrap();
        let bytes = render(doc.root()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        // Escaping is restored on write.
        assert!(text.contains("SMITH &amp; SONS"));

        let reparsed = TemplateDocument::parse(&text).unwrap();
        assert!(same_structure(doc.root(), reparsed.root()));
        assert_eq!(doc.root(), reparsed.root());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(TemplateDocument::parse("not xml at all").is_err());
        assert!(TemplateDocument::parse("<a><b></a>").is_err());
    }

    #[test]
    fn test_render_deterministic() {
        let doc = TemplateDocument::parse(SMALL).unwrap();
        assert_eq!(render(doc.root()).unwrap(), render(doc.root()).unwrap());
    }
}
