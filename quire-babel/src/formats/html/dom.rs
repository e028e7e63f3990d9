//! Shared DOM plumbing on top of `markup5ever_rcdom`.
//!
//! The renderer, the Markdown serializer and the live document all speak the
//! same `Handle` tree, so node construction, inspection and serialization live
//! here once.

use crate::error::FormatError;
use crate::ir::nodes::InlineContent;
use html5ever::tendril::TendrilSink;
use html5ever::{
    ns, parse_document, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute,
    LocalName, QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::default::Default;
use std::rc::Rc;

/// Tags treated as block containers by the serializer and the live document.
pub const BLOCK_TAGS: &[&str] = &[
    "p",
    "div",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "ul",
    "ol",
    "li",
    "blockquote",
    "pre",
];

/// Create an HTML element with attributes
pub fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
pub fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Copy an element's name and attributes without its children.
///
/// Non-element nodes are copied whole (text keeps its contents).
pub fn shallow_clone(node: &Handle) -> Handle {
    match &node.data {
        NodeData::Element {
            name,
            attrs,
            template_contents,
            mathml_annotation_xml_integration_point,
        } => Rc::new(Node {
            parent: Cell::new(None),
            children: RefCell::new(Vec::new()),
            data: NodeData::Element {
                name: name.clone(),
                attrs: RefCell::new(attrs.borrow().clone()),
                template_contents: RefCell::new(template_contents.borrow().clone()),
                mathml_annotation_xml_integration_point: *mathml_annotation_xml_integration_point,
            },
        }),
        NodeData::Text { contents } => create_text(&contents.borrow()),
        _ => create_text(""),
    }
}

pub fn append(parent: &Handle, child: Handle) {
    parent.children.borrow_mut().push(child);
}

/// Local tag name of an element node.
pub fn tag_name(node: &Node) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

pub fn is_block(node: &Node) -> bool {
    tag_name(node).is_some_and(|tag| BLOCK_TAGS.contains(&tag))
}

/// Value of an attribute, if present.
pub fn attr(node: &Node, key: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attribute| &*attribute.name.local == key)
            .map(|attribute| attribute.value.to_string()),
        _ => None,
    }
}

pub fn set_attr(node: &Node, key: &str, value: Option<&str>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let mut attrs = attrs.borrow_mut();
        attrs.retain(|attribute| &*attribute.name.local != key);
        if let Some(value) = value {
            attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(key)),
                value: value.to_string().into(),
            });
        }
    }
}

pub fn is_checkbox(node: &Node) -> bool {
    tag_name(node) == Some("input")
        && attr(node, "type").is_some_and(|kind| kind.eq_ignore_ascii_case("checkbox"))
}

/// First checkbox input at or below `node`.
pub fn find_checkbox(node: &Handle) -> Option<Handle> {
    if is_checkbox(node) {
        return Some(node.clone());
    }
    node.children.borrow().iter().find_map(find_checkbox)
}

pub fn is_checked(checkbox: &Node) -> bool {
    attr(checkbox, "checked").is_some()
}

/// Concatenated text of every descendant text node.
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        collect_text(child, out);
    }
}

/// Whether a node is a text node holding only whitespace.
pub fn is_blank_text(node: &Node) -> bool {
    match &node.data {
        NodeData::Text { contents } => contents.borrow().trim().is_empty(),
        _ => false,
    }
}

/// Append inline IR content as HTML nodes.
pub fn append_inline(parent: &Handle, inline: &InlineContent) {
    match inline {
        InlineContent::Text(text) => append(parent, create_text(text)),
        InlineContent::Bold(children) => {
            let strong = create_element("strong", vec![]);
            for child in children {
                append_inline(&strong, child);
            }
            append(parent, strong);
        }
        InlineContent::Italic(children) => {
            let em = create_element("em", vec![]);
            for child in children {
                append_inline(&em, child);
            }
            append(parent, em);
        }
        InlineContent::Code(code_text) => {
            let code = create_element("code", vec![]);
            append(&code, create_text(code_text));
            append(parent, code);
        }
    }
}

/// Parse an HTML fragment and return its `<body>` element.
///
/// The returned body is detached from the parsed document.
pub fn parse_fragment(source: &str) -> Handle {
    let dom = parse_document(RcDom::default(), Default::default()).one(source);
    let parsed = find_element(&dom.document, "body").unwrap_or_else(|| dom.document.clone());
    // Dropping the RcDom empties every node still reachable from its document
    let body = create_element("body", vec![]);
    *body.children.borrow_mut() = std::mem::take(&mut *parsed.children.borrow_mut());
    body
}

fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
    if tag_name(node) == Some(tag) {
        return Some(node.clone());
    }
    node.children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}

/// Serialize the children of a container (just the inner content)
pub fn serialize_children(container: &Handle) -> Result<String, FormatError> {
    let mut output = Vec::new();

    // IncludeNode serializes each child element together with its subtree
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    for child in container.children.borrow().iter() {
        let serializable = SerializableHandle::from(child.clone());
        serialize(&mut output, &serializable, opts.clone()).map_err(|e| {
            FormatError::SerializationError(format!("HTML serialization failed: {e}"))
        })?;
    }

    String::from_utf8(output)
        .map_err(|e| FormatError::SerializationError(format!("UTF-8 conversion failed: {e}")))
}
