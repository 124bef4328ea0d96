//! Serializer for [`XmlDocument`]s.
//!
//! Output uses the Automation Studio conventions: CRLF line endings,
//! two-space indentation, `<Tag />` for empty elements and the version
//! header as a processing instruction after the XML declaration.

use std::fmt::Write;

use super::{VersionHeader, XmlChild, XmlDocument, XmlElement, HEADER_PI_TARGET};

const EOL: &str = "\r\n";
const INDENT: &str = "  ";

/// Serialize a document to a string.
pub fn write_document(doc: &XmlDocument) -> String {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    out.push_str(EOL);

    if !doc.header.is_empty() {
        write_header(&mut out, &doc.header);
        out.push_str(EOL);
    }

    write_element(&mut out, &doc.root, 0);
    out
}

fn write_header(out: &mut String, header: &VersionHeader) {
    out.push_str("<?");
    out.push_str(HEADER_PI_TARGET);
    let fields = [
        ("Version", &header.version),
        ("WorkingVersion", &header.working_version),
        ("FileVersion", &header.file_version),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            let _ = write!(out, " {}=\"{}\"", name, escape(value, true));
        }
    }
    out.push_str("?>");
}

fn write_element(out: &mut String, element: &XmlElement, depth: usize) {
    let indent = INDENT.repeat(depth);
    out.push_str(&indent);
    out.push('<');
    out.push_str(&element.name);
    for (name, value) in &element.attributes {
        let _ = write!(out, " {}=\"{}\"", name, escape(value, true));
    }

    let has_children = element
        .children
        .iter()
        .any(|(_, child)| !child.as_slice().is_empty());

    if !has_children && element.comments.is_empty() {
        match &element.text {
            Some(text) => {
                let _ = write!(out, ">{}</{}>", escape(text, false), element.name);
            }
            None => out.push_str(" />"),
        }
        out.push_str(EOL);
        return;
    }

    out.push('>');
    out.push_str(EOL);

    let inner = INDENT.repeat(depth + 1);
    for comment in &element.comments {
        let _ = write!(out, "{}<!-- {} -->{}", inner, comment, EOL);
    }
    if let Some(text) = &element.text {
        let _ = write!(out, "{}{}{}", inner, escape(text, false), EOL);
    }
    for (_, child) in &element.children {
        let elements: &[XmlElement] = match child {
            XmlChild::Single(e) => std::slice::from_ref(e),
            XmlChild::List(list) => list,
        };
        for e in elements {
            write_element(out, e, depth + 1);
        }
    }

    let _ = write!(out, "{}</{}>{}", indent, element.name, EOL);
}

fn escape(value: &str, attribute: bool) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if attribute => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
