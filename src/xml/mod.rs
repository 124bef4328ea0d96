//! Package XML parsing.
//!
//! Converts Automation Studio XML files into a generic [`XmlDocument`] tree.
//! Elements are keyed by tag name in first-appearance order. A tag that
//! occurs once is a [`XmlChild::Single`], one that repeats is a
//! [`XmlChild::List`], and the dialect's list-valued paths (see
//! [`FORCED_LIST_PATHS`]) are always lists, even when empty. This removes the
//! one-element-versus-many ambiguity for the paths that matter.
//!
//! The `<?AutomationStudio ...?>` processing instruction in front of the
//! root element is extracted into a [`VersionHeader`].

mod writer;

use std::sync::LazyLock;

use regex::Regex;
use semver::Version;
use thiserror::Error;

use crate::toolchain::version::coerce_version;

pub use writer::write_document;

/// Target of the processing instruction carrying the version header.
pub const HEADER_PI_TARGET: &str = "AutomationStudio";

/// Dotted tag paths (starting at the root element) that always produce lists.
pub const FORCED_LIST_PATHS: &[&str] = &[
    "Package.Objects.Object",
    "Physical.Objects.Object",
    "Configuration.Objects.Object",
    "Cpu.Objects.Object",
    "Program.Files.File",
    "Library.Files.File",
    "DataObject.Files.File",
    "Library.Dependencies.Dependency",
];

static PI_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][\w.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'?]+))"#)
        .expect("PI attribute pattern is valid")
});

/// Error while parsing package XML.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("malformed XML: {0}")]
    Syntax(#[from] roxmltree::Error),

    #[error("document has no root element")]
    NoRootElement,
}

/// Version triple declared in the processing-instruction header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionHeader {
    /// Full version of the producing IDE (`Version`)
    pub version: Option<String>,
    /// IDE version the project is worked on with (`WorkingVersion`)
    pub working_version: Option<String>,
    /// File format version (`FileVersion`)
    pub file_version: Option<String>,
}

impl VersionHeader {
    /// Parse the attribute list of an `AutomationStudio` processing
    /// instruction. Values may be quoted or bare.
    pub fn parse(value: &str) -> Self {
        let mut header = VersionHeader::default();
        for caps in PI_ATTRIBUTE.captures_iter(value) {
            let val = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().to_string());
            match &caps[1] {
                "Version" => header.version = val,
                "WorkingVersion" => header.working_version = val,
                "FileVersion" => header.file_version = val,
                _ => {}
            }
        }
        header
    }

    /// Whether no version attribute was declared.
    pub fn is_empty(&self) -> bool {
        self.version.is_none() && self.working_version.is_none() && self.file_version.is_none()
    }

    /// `Version` coerced to a semantic version.
    pub fn version(&self) -> Option<Version> {
        self.version.as_deref().and_then(coerce_version)
    }

    /// `WorkingVersion` coerced to a semantic version.
    pub fn working_version(&self) -> Option<Version> {
        self.working_version.as_deref().and_then(coerce_version)
    }

    /// `FileVersion` coerced to a semantic version.
    pub fn file_version(&self) -> Option<Version> {
        self.file_version.as_deref().and_then(coerce_version)
    }
}

/// Child entry of an element, keyed by tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlChild {
    Single(XmlElement),
    List(Vec<XmlElement>),
}

impl XmlChild {
    /// All elements of this entry as a slice.
    pub fn as_slice(&self) -> &[XmlElement] {
        match self {
            XmlChild::Single(element) => std::slice::from_ref(element),
            XmlChild::List(elements) => elements,
        }
    }
}

/// A generic XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Local tag name
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Trimmed direct text content, `None` when blank
    pub text: Option<String>,
    /// Direct comment nodes
    pub comments: Vec<String>,
    /// Child elements keyed by tag name, in first-appearance order
    pub children: Vec<(String, XmlChild)>,
}

impl XmlElement {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Look up an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Look up an attribute and interpret it as a boolean flag.
    pub fn attr_flag(&self, name: &str) -> bool {
        self.attr(name)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Direct text content.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// The entry for a tag name.
    pub fn entry(&self, name: &str) -> Option<&XmlChild> {
        self.children
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, child)| child)
    }

    /// First child element with the given tag name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.entry(name).and_then(|c| c.as_slice().first())
    }

    /// All child elements with the given tag name.
    pub fn children_named(&self, name: &str) -> &[XmlElement] {
        self.entry(name).map(XmlChild::as_slice).unwrap_or(&[])
    }

    /// Follow a dotted path of tag names below this element.
    pub fn find(&self, path: &str) -> Option<&XmlElement> {
        path.split('.')
            .filter(|s| !s.is_empty())
            .try_fold(self, |element, name| element.child(name))
    }

    fn push_child(&mut self, child: XmlElement, force_list: bool) {
        let position = self.children.iter().position(|(key, _)| *key == child.name);
        match position {
            None => {
                let name = child.name.clone();
                let entry = if force_list {
                    XmlChild::List(vec![child])
                } else {
                    XmlChild::Single(child)
                };
                self.children.push((name, entry));
            }
            Some(index) => {
                let entry = &mut self.children[index].1;
                if let XmlChild::List(list) = entry {
                    list.push(child);
                    return;
                }
                let previous = std::mem::replace(entry, XmlChild::List(Vec::with_capacity(2)));
                if let (XmlChild::List(list), XmlChild::Single(first)) = (entry, previous) {
                    list.push(first);
                    list.push(child);
                }
            }
        }
    }
}

/// A parsed package XML file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// Processing-instruction version header
    pub header: VersionHeader,
    /// Root element
    pub root: XmlElement,
}

impl XmlDocument {
    /// Root element tag name.
    pub fn root_name(&self) -> &str {
        &self.root.name
    }
}

/// Parse XML text into a generic document.
pub fn parse(text: &str) -> Result<XmlDocument, XmlError> {
    let doc = roxmltree::Document::parse(text)?;

    let mut header = VersionHeader::default();
    let mut root = None;
    for node in doc.root().children() {
        if let Some(pi) = node.pi() {
            if pi.target == HEADER_PI_TARGET && root.is_none() {
                header = VersionHeader::parse(pi.value.unwrap_or_default());
            }
        } else if node.is_element() {
            root = Some(node);
            break;
        }
    }

    let root = root.ok_or(XmlError::NoRootElement)?;
    let name = root.tag_name().name().to_string();
    let root = convert_element(root, &name);
    Ok(XmlDocument { header, root })
}

fn convert_element(node: roxmltree::Node<'_, '_>, path: &str) -> XmlElement {
    let mut element = XmlElement::new(node.tag_name().name());

    element.attributes = node
        .attributes()
        .map(|a| (a.name().to_string(), a.value().to_string()))
        .collect();

    let mut text = String::new();
    for child in node.children() {
        if child.is_element() {
            let child_path = format!("{}.{}", path, child.tag_name().name());
            let force_list = FORCED_LIST_PATHS.contains(&child_path.as_str());
            let converted = convert_element(child, &child_path);
            element.push_child(converted, force_list);
        } else if child.is_comment() {
            if let Some(comment) = child.text() {
                element.comments.push(comment.trim().to_string());
            }
        } else if child.is_text() {
            if let Some(t) = child.text() {
                text.push_str(t);
            }
        }
    }

    let text = text.trim();
    if !text.is_empty() {
        element.text = Some(text.to_string());
    }

    // Forced lists with zero matching elements still show up, empty.
    let prefix = format!("{}.", path);
    for forced in FORCED_LIST_PATHS {
        if let Some(rest) = forced.strip_prefix(&prefix) {
            if !rest.contains('.') && element.entry(rest).is_none() {
                element.children.push((rest.to_string(), XmlChild::List(Vec::new())));
            }
        }
    }

    element
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<?AutomationStudio Version="4.9.3.144" WorkingVersion="4.9" FileVersion="4.9"?>
<Program SubType="ANSIC" xmlns="http://br-automation.co.at/AS/Program">
  <!-- generated -->
  <Files>
    <File Description="Cyclic part">Cyclic.c</File>
  </Files>
</Program>"#;

    #[test]
    fn test_parse_header_and_attributes() {
        let doc = parse(PROGRAM).unwrap();
        assert_eq!(doc.root_name(), "Program");
        assert_eq!(doc.root.attr("SubType"), Some("ANSIC"));
        assert_eq!(doc.header.version.as_deref(), Some("4.9.3.144"));
        assert_eq!(doc.header.working_version(), Some(Version::new(4, 9, 0)));
        assert_eq!(doc.header.file_version.as_deref(), Some("4.9"));
        assert_eq!(doc.root.comments, vec!["generated".to_string()]);
    }

    #[test]
    fn test_single_file_is_forced_to_list() {
        let doc = parse(PROGRAM).unwrap();
        let files = doc.root.child("Files").unwrap();
        assert!(matches!(files.entry("File"), Some(XmlChild::List(l)) if l.len() == 1));
        let file = &files.children_named("File")[0];
        assert_eq!(file.text(), Some("Cyclic.c"));
        assert_eq!(file.attr("Description"), Some("Cyclic part"));
    }

    #[test]
    fn test_empty_container_has_empty_list() {
        let doc = parse("<Package><Objects /></Package>").unwrap();
        let objects = doc.root.child("Objects").unwrap();
        assert!(matches!(objects.entry("Object"), Some(XmlChild::List(l)) if l.is_empty()));
        assert!(doc.header.is_empty());
    }

    #[test]
    fn test_unforced_paths_follow_occurrence_count() {
        let doc = parse("<Root><A>1</A><B /><A>2</A></Root>").unwrap();
        assert!(matches!(doc.root.entry("B"), Some(XmlChild::Single(_))));
        let a: Vec<_> = doc.root.children_named("A").iter().map(|e| e.text()).collect();
        assert_eq!(a, vec![Some("1"), Some("2")]);
        assert_eq!(doc.root.children[0].0, "A");
    }

    #[test]
    fn test_find_nested_path() {
        let doc = parse(
            r#"<Cpu><Configuration ModuleId="X20CP1586"><Build GccVersion="6.3.0" /></Configuration></Cpu>"#,
        )
        .unwrap();
        let build = doc.root.find("Configuration.Build").unwrap();
        assert_eq!(build.attr("GccVersion"), Some("6.3.0"));
        assert!(doc.root.find("Configuration.Missing").is_none());
    }

    #[test]
    fn test_bare_header_values() {
        let header = VersionHeader::parse("Version=3.0.90.18 FileVersion='3.0'");
        assert_eq!(header.version.as_deref(), Some("3.0.90.18"));
        assert_eq!(header.file_version.as_deref(), Some("3.0"));
        assert_eq!(header.version(), Some(Version::new(3, 0, 90)));
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(matches!(parse("<Package><Objects></Package>"), Err(XmlError::Syntax(_))));
        assert!(parse("").is_err());
    }

    #[test]
    fn test_attr_flag() {
        let doc = parse(r#"<Object Reference="True" Private="no">x</Object>"#).unwrap();
        assert!(doc.root.attr_flag("Reference"));
        assert!(!doc.root.attr_flag("Private"));
        assert!(!doc.root.attr_flag("Missing"));
    }
}
