//! Typed namespaced XML tree.
//!
//! Element and attribute names are resolved to [`QualifiedName`]s once, while
//! parsing, using the `xmlns` declarations in scope. Children are grouped by
//! name in document order; text and CDATA content is concatenated.

use std::collections::BTreeMap;

use licensedata_core::Shape;
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};

use crate::ParseError;
use crate::names::QualifiedName;
use crate::namespaces::{Namespaces, declared_prefix};

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: QualifiedName,
    pub attributes: BTreeMap<QualifiedName, String>,
    pub children: BTreeMap<QualifiedName, Vec<Element>>,
    /// Text content; `None` when the element holds only whitespace.
    pub text: Option<String>,
}

/// A parsed document together with the declarations on its root element.
#[derive(Debug, Clone)]
pub struct Document {
    pub root: Element,
    pub namespaces: Namespaces,
}

impl Element {
    pub fn new(name: QualifiedName) -> Self {
        Self {
            name,
            attributes: BTreeMap::new(),
            children: BTreeMap::new(),
            text: None,
        }
    }

    /// All children named `key`, in document order.
    pub fn children(&self, key: &QualifiedName) -> &[Element] {
        self.children.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Children named `key`, classified as absent, single or many.
    pub fn shape(&self, key: &QualifiedName) -> Shape<&Element> {
        Shape::from_vec(self.children(key).iter().collect())
    }

    pub fn attribute(&self, key: &QualifiedName) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// True for elements that carry nothing but text.
    pub fn is_plain(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty()
    }
}

/// Parse raw markup into a [`Document`].
pub fn parse_document(raw: &str) -> Result<Document, ParseError> {
    let mut reader = Reader::from_str(raw);
    let mut builder = TreeBuilder::default();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| xml_error(&reader, e.to_string()))?;
        match event {
            Event::Start(start) => {
                let frame = builder.open(&reader, &start)?;
                builder.stack.push(frame);
            }
            Event::Empty(start) => {
                let frame = builder.open(&reader, &start)?;
                builder.close(frame)?;
            }
            Event::End(_) => {
                let frame = builder
                    .stack
                    .pop()
                    .ok_or_else(|| xml_error(&reader, "unbalanced end tag".into()))?;
                builder.close(frame)?;
            }
            Event::Text(text) => {
                let decoded = text
                    .decode()
                    .map_err(|e| xml_error(&reader, e.to_string()))?;
                builder.push_text(&decoded);
            }
            Event::CData(data) => {
                builder.push_text(&String::from_utf8_lossy(&data.into_inner()));
            }
            Event::GeneralRef(reference) => {
                let resolved = resolve_reference(&reference);
                builder.push_text(&resolved);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !builder.stack.is_empty() {
        return Err(xml_error(&reader, "unclosed element at end of input".into()));
    }
    let root = builder.root.ok_or(ParseError::NoRoot)?;
    Ok(Document {
        root,
        namespaces: builder.root_namespaces,
    })
}

struct Frame {
    element: Element,
    text: String,
    declares: bool,
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Frame>,
    scopes: Vec<Namespaces>,
    root: Option<Element>,
    root_namespaces: Namespaces,
}

impl TreeBuilder {
    fn open(&mut self, reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<Frame, ParseError> {
        let mut declarations = Vec::new();
        let mut raw_attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| xml_error(reader, e.to_string()))?;
            let key = utf8(reader, attribute.key.as_ref())?.to_string();
            let value = attribute
                .decode_and_unescape_value(reader.decoder())
                .map_err(|e| xml_error(reader, e.to_string()))?
                .into_owned();
            if declared_prefix(&key).is_some() {
                declarations.push((key, value));
            } else {
                raw_attributes.push((key, value));
            }
        }

        let declares = !declarations.is_empty();
        if declares {
            let mut scope = self.scopes.last().cloned().unwrap_or_default();
            scope.extend(declarations.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            self.scopes.push(scope);
        }
        let is_root = self.stack.is_empty() && self.root.is_none();
        let empty = Namespaces::default();
        let scope = self.scopes.last().unwrap_or(&empty);

        let raw_name = utf8(reader, start.name().into_inner())?;
        let mut element = Element::new(scope.resolve(raw_name, false));
        for (key, value) in raw_attributes {
            element.attributes.insert(scope.resolve(&key, true), value);
        }

        if is_root {
            self.root_namespaces = scope.clone();
        }

        Ok(Frame {
            element,
            text: String::new(),
            declares,
        })
    }

    fn close(&mut self, frame: Frame) -> Result<(), ParseError> {
        let Frame {
            mut element,
            text,
            declares,
        } = frame;
        if declares {
            self.scopes.pop();
        }
        if !text.trim().is_empty() {
            element.text = Some(text);
        }

        match self.stack.last_mut() {
            Some(parent) => {
                parent
                    .element
                    .children
                    .entry(element.name.clone())
                    .or_default()
                    .push(element);
                Ok(())
            }
            None if self.root.is_some() => Err(ParseError::MultipleRoots),
            None => {
                self.root = Some(element);
                Ok(())
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        // Text outside the root element (whitespace, stray characters) is not content.
        if let Some(frame) = self.stack.last_mut() {
            frame.text.push_str(text);
        }
    }
}

fn resolve_reference(reference: &BytesRef<'_>) -> String {
    if let Ok(Some(ch)) = reference.resolve_char_ref() {
        return ch.to_string();
    }
    let name = String::from_utf8_lossy(reference).into_owned();
    match resolve_predefined_entity(&name) {
        Some(resolved) => resolved.to_string(),
        None => format!("&{name};"),
    }
}

fn utf8<'a>(reader: &Reader<&[u8]>, bytes: &'a [u8]) -> Result<&'a str, ParseError> {
    std::str::from_utf8(bytes).map_err(|e| xml_error(reader, e.to_string()))
}

fn xml_error(reader: &Reader<&[u8]>, message: String) -> ParseError {
    ParseError::Xml {
        position: reader.buffer_position(),
        message,
    }
}
