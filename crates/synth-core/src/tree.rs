//! Owned XML tree used for template documents.
//!
//! The tree is an ordered tagged-variant structure: every node is either an
//! element (name, attributes, children) or a text run. Templates are parsed
//! into this tree once and cloned per generated document, so the types here
//! are plain owned data with no lifetimes.

use std::fmt;

/// A single node in the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// An element with a name, attributes and ordered children.
    Element(XmlElement),
    /// A text run between element tags.
    Text(String),
}

/// An element node.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    /// Element name as written in the document (prefix included if any).
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children: Vec<XmlNode>,
}

/// Strip a namespace prefix from an element name.
pub fn local_name(name: &str) -> &str {
    match name.rsplit_once(':') {
        Some((_, local)) => local,
        None => name,
    }
}

impl XmlElement {
    /// Create an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Local (prefix-stripped) name of this element.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Concatenated text content of the direct text children.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            if let XmlNode::Text(t) = child {
                out.push_str(t);
            }
        }
        out
    }

    /// Replace the text content of this element.
    ///
    /// Only valid for leaf elements (no element children); the mutator
    /// enforces that before calling.
    pub fn set_text(&mut self, text: &str) {
        self.children.retain(|c| matches!(c, XmlNode::Element(_)));
        if !text.is_empty() {
            self.children.insert(0, XmlNode::Text(text.to_string()));
        }
    }

    /// Whether this element has no element children.
    pub fn is_leaf(&self) -> bool {
        !self
            .children
            .iter()
            .any(|c| matches!(c, XmlNode::Element(_)))
    }

    /// Child elements with their child indices, in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = (usize, &XmlElement)> {
        self.children.iter().enumerate().filter_map(|(i, c)| match c {
            XmlNode::Element(e) => Some((i, e)),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element with the given local name, with its child index.
    pub fn child(&self, local: &str) -> Option<(usize, &XmlElement)> {
        self.child_elements().find(|(_, e)| e.local_name() == local)
    }

    /// All child elements with the given local name, with their child indices.
    pub fn children_named<'a>(&'a self, local: &'a str) -> Vec<(usize, &'a XmlElement)> {
        self.child_elements()
            .filter(|(_, e)| e.local_name() == local)
            .collect()
    }
}

/// Path from a root element to a descendant, as child indices.
///
/// Paths are recorded against the template during classification and
/// resolved against structurally identical clones during mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The root path (the root element itself).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Extend this path by one child index.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Concatenate a path recorded relative to the node this path points at.
    pub fn join(&self, relative: &NodePath) -> Self {
        let mut indices = self.0.clone();
        indices.extend_from_slice(&relative.0);
        Self(indices)
    }

    /// Resolve the path against a root element.
    pub fn resolve<'a>(&self, root: &'a XmlElement) -> Option<&'a XmlElement> {
        let mut current = root;
        for &index in &self.0 {
            match current.children.get(index) {
                Some(XmlNode::Element(e)) => current = e,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Resolve the path against a mutable root element.
    pub fn resolve_mut<'a>(&self, root: &'a mut XmlElement) -> Option<&'a mut XmlElement> {
        let mut current = root;
        for &index in &self.0 {
            match current.children.get_mut(index) {
                Some(XmlNode::Element(e)) => current = e,
                _ => return None,
            }
        }
        Some(current)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for index in &self.0 {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

/// Find all descendant elements with the given local name, in document order.
///
/// The returned paths are relative to `root`.
pub fn find_descendants<'a>(root: &'a XmlElement, local: &str) -> Vec<(NodePath, &'a XmlElement)> {
    let mut found = Vec::new();
    collect_descendants(root, &NodePath::root(), local, &mut found);
    found
}

fn collect_descendants<'a>(
    element: &'a XmlElement,
    path: &NodePath,
    local: &str,
    found: &mut Vec<(NodePath, &'a XmlElement)>,
) {
    for (index, child) in element.child_elements() {
        let child_path = path.child(index);
        if child.local_name() == local {
            found.push((child_path.clone(), child));
        }
        collect_descendants(child, &child_path, local, found);
    }
}

/// First descendant element with the given local name, in document order.
pub fn find_first<'a>(root: &'a XmlElement, local: &str) -> Option<(NodePath, &'a XmlElement)> {
    find_descendants(root, local).into_iter().next()
}

/// Whether two trees have identical structure: same element names,
/// attributes, child counts and ordering. Text content is ignored.
pub fn same_structure(a: &XmlElement, b: &XmlElement) -> bool {
    if a.name != b.name || a.attributes != b.attributes {
        return false;
    }
    let a_children: Vec<_> = a.child_elements().map(|(_, e)| e).collect();
    let b_children: Vec<_> = b.child_elements().map(|(_, e)| e).collect();
    if a_children.len() != b_children.len() {
        return false;
    }
    a_children
        .iter()
        .zip(b_children.iter())
        .all(|(x, y)| same_structure(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, text: &str) -> XmlNode {
        let mut e = XmlElement::new(name);
        e.set_text(text);
        XmlNode::Element(e)
    }

    fn sample_tree() -> XmlElement {
        let mut pid = XmlElement::new("PID");
        pid.children.push(leaf("PID.8", "F"));
        let mut name = XmlElement::new("PID.5");
        name.children.push(leaf("XPN.1", "MURPHY"));
        name.children.push(leaf("XPN.2", "Aoife"));
        pid.children.push(XmlNode::Element(name));
        let mut root = XmlElement::new("REF_I12");
        root.attributes
            .push(("xmlns".to_string(), "urn:hl7-org:v2xml".to_string()));
        root.children.push(XmlNode::Element(pid));
        root
    }

    #[test]
    fn test_local_name_strips_prefix() {
        assert_eq!(local_name("hl7:PID.5"), "PID.5");
        assert_eq!(local_name("PID.5"), "PID.5");
    }

    #[test]
    fn test_text_and_set_text() {
        let root = sample_tree();
        let (_, pid) = root.child("PID").unwrap();
        let (_, sex) = pid.child("PID.8").unwrap();
        assert_eq!(sex.text(), "F");

        let mut sex = sex.clone();
        sex.set_text("M");
        assert_eq!(sex.text(), "M");

        sex.set_text("");
        assert_eq!(sex.text(), "");
        assert!(sex.children.is_empty());
    }

    #[test]
    fn test_path_resolution() {
        let root = sample_tree();
        let (pid_idx, pid) = root.child("PID").unwrap();
        let (name_idx, _) = pid.child("PID.5").unwrap();
        let path = NodePath::root().child(pid_idx).child(name_idx);

        let resolved = path.resolve(&root).unwrap();
        assert_eq!(resolved.local_name(), "PID.5");

        let mut clone = root.clone();
        let resolved = path.resolve_mut(&mut clone).unwrap();
        resolved.set_text("x");
        assert_ne!(clone, root);
    }

    #[test]
    fn test_path_resolution_fails_on_diverged_tree() {
        let root = sample_tree();
        let path = NodePath::root().child(0).child(5);
        assert!(path.resolve(&root).is_none());
    }

    #[test]
    fn test_find_descendants() {
        let root = sample_tree();
        let found = find_descendants(&root, "XPN.1");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1.text(), "MURPHY");
        // The recorded path resolves back to the same node.
        assert_eq!(found[0].0.resolve(&root).unwrap().text(), "MURPHY");
    }

    #[test]
    fn test_same_structure_ignores_text() {
        let a = sample_tree();
        let mut b = sample_tree();
        let (pid_idx, _) = b.child("PID").unwrap();
        if let XmlNode::Element(pid) = &mut b.children[pid_idx] {
            let (sex_idx, _) = pid.child("PID.8").unwrap();
            if let XmlNode::Element(sex) = &mut pid.children[sex_idx] {
                sex.set_text("M");
            }
        }
        assert!(same_structure(&a, &b));

        // Dropping an element breaks isomorphism.
        if let XmlNode::Element(pid) = &mut b.children[pid_idx] {
            pid.children.pop();
        }
        assert!(!same_structure(&a, &b));
    }
}
