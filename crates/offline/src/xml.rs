//! Minimal mutable XML tree.
//!
//! Enough DOM to edit server configuration files: ordered attributes,
//! element/text/comment children, and a writer that re-indents with four
//! spaces. Whitespace-only text is dropped when parsing, so a load/save cycle
//! normalizes formatting but keeps content.

use crate::error::{Error, Result};
use model::ModelValue;
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Nested element.
    Element(Element),
    /// Character data, unescaped.
    Text(String),
    /// Comment body.
    Comment(String),
}

impl Node {
    fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// An XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Qualified name.
    pub name: String,
    attributes: Vec<(String, String)>,
    /// Children in document order.
    pub children: Vec<Node>,
}

impl Element {
    /// An element without attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder form of [`set_attribute`](Self::set_attribute).
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder form of [`set_text`](Self::set_text).
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    /// Value of an attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Set an attribute from a payload value; `None` removes it.
    ///
    /// An explicit `false`, `0` or empty string is written.
    pub fn set_attribute_value(&mut self, name: &str, value: Option<&ModelValue>) {
        match value {
            Some(value) => self.set_attribute(name, value.to_string()),
            None => self.remove_attribute(name),
        }
    }

    /// Remove an attribute if present.
    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.retain(|(key, _)| key != name);
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// First child element named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// First child element named `name`, mutably.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.find_child_mut(|element| element.name == name)
    }

    /// All child elements named `name`.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |element| element.name == name)
    }

    /// First child element matching `predicate`.
    pub fn find_child(&self, predicate: impl Fn(&Element) -> bool) -> Option<&Element> {
        self.elements().find(|element| predicate(element))
    }

    /// First child element matching `predicate`, mutably.
    pub fn find_child_mut(&mut self, predicate: impl Fn(&Element) -> bool) -> Option<&mut Element> {
        self.children
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .find(|element| predicate(element))
    }

    /// Append a child element.
    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Insert `child` before the first child element whose name is in
    /// `before`; append if there is none.
    pub fn insert_before(&mut self, child: Element, before: &[&str]) {
        let position = self.children.iter().position(|node| {
            node.as_element()
                .is_some_and(|element| before.contains(&element.name.as_str()))
        });
        match position {
            Some(index) => self.children.insert(index, Node::Element(child)),
            None => self.push(child),
        }
    }

    /// The first child element named `name`, created with
    /// [`insert_before`](Self::insert_before) semantics when absent.
    pub fn child_or_insert(&mut self, name: &str, before: &[&str]) -> Result<&mut Element> {
        if self.child(name).is_none() {
            log::debug!("creating <{name}> under <{}>", self.name);
            self.insert_before(Element::new(name), before);
        }
        self.child_mut(name)
            .ok_or_else(|| Error::Structure(format!("<{name}> missing after insert")))
    }

    /// Replace the first child element matching `predicate` in place.
    /// Returns `false`, leaving the tree untouched, when nothing matches.
    pub fn replace_child(&mut self, predicate: impl Fn(&Element) -> bool, child: Element) -> bool {
        let position = self
            .children
            .iter()
            .position(|node| node.as_element().is_some_and(&predicate));
        match position {
            Some(index) => {
                self.children[index] = Node::Element(child);
                true
            }
            None => false,
        }
    }

    /// Remove every child element matching `predicate`. Returns how many
    /// were removed.
    pub fn remove_children_where(&mut self, predicate: impl Fn(&Element) -> bool) -> usize {
        let before = self.children.len();
        self.children
            .retain(|node| !node.as_element().is_some_and(&predicate));
        before - self.children.len()
    }

    /// Concatenated text content of direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let mut element = Self::new(String::from_utf8_lossy(start.name().as_ref()));
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value()?.into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            return emit(writer, Event::Empty(start));
        }

        emit(writer, Event::Start(start))?;
        for child in &self.children {
            match child {
                Node::Element(element) => element.write(writer)?,
                Node::Text(text) => emit(writer, Event::Text(BytesText::new(text)))?,
                Node::Comment(comment) => {
                    emit(writer, Event::Comment(BytesText::from_escaped(comment.as_str())))?;
                }
            }
        }
        emit(writer, Event::End(BytesEnd::new(self.name.as_str())))
    }
}

/// `<?xml ...?>` prolog.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Declaration {
    version: String,
    encoding: Option<String>,
}

/// A parsed configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    declaration: Option<Declaration>,
    /// Document element.
    pub root: Element,
}

impl Document {
    /// A document with a standard prolog and the given root.
    pub fn new(root: Element) -> Self {
        Self {
            declaration: Some(Declaration {
                version: "1.0".into(),
                encoding: Some("UTF-8".into()),
            }),
            root,
        }
    }

    /// Parse XML text.
    pub fn parse(input: &str) -> Result<Self> {
        let mut reader = Reader::from_str(input);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut declaration = None;
        let mut open: Vec<Element> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Decl(decl)) => {
                    let version = String::from_utf8_lossy(&decl.version()?).into_owned();
                    let encoding = match decl.encoding() {
                        Some(encoding) => Some(String::from_utf8_lossy(&encoding?).into_owned()),
                        None => None,
                    };
                    declaration = Some(Declaration { version, encoding });
                }
                Ok(Event::Start(e)) => open.push(Element::from_start(&e)?),
                Ok(Event::Empty(e)) => close(&mut open, &mut root, Element::from_start(&e)?)?,
                Ok(Event::End(_)) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| Error::Parse("unbalanced end tag".into()))?;
                    close(&mut open, &mut root, element)?;
                }
                Ok(Event::Text(e)) => {
                    if let Some(parent) = open.last_mut() {
                        parent.children.push(Node::Text(e.unescape()?.into_owned()));
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(parent) = open.last_mut() {
                        parent
                            .children
                            .push(Node::Text(String::from_utf8_lossy(&e).into_owned()));
                    }
                }
                Ok(Event::Comment(e)) => {
                    if let Some(parent) = open.last_mut() {
                        parent
                            .children
                            .push(Node::Comment(String::from_utf8_lossy(&e).into_owned()));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => {
                    return Err(Error::Parse(format!(
                        "at position {}: {err}",
                        reader.buffer_position()
                    )));
                }
            }
            buf.clear();
        }

        if !open.is_empty() {
            return Err(Error::Parse(format!("unclosed element <{}>", open[0].name)));
        }
        let root = root.ok_or_else(|| Error::Parse("document has no root element".into()))?;
        Ok(Self { declaration, root })
    }

    /// Serialize with four-space indentation and a trailing newline.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
        if let Some(declaration) = &self.declaration {
            let decl = BytesDecl::new(
                &declaration.version,
                declaration.encoding.as_deref(),
                None,
            );
            emit(&mut writer, Event::Decl(decl))?;
        }
        self.root.write(&mut writer)?;

        let mut xml =
            String::from_utf8(writer.into_inner()).map_err(|err| Error::Write(err.to_string()))?;
        xml.push('\n');
        Ok(xml)
    }

    /// The `xmlns` of the root element.
    pub fn namespace(&self) -> Option<&str> {
        self.root.attribute("xmlns")
    }
}

fn close(open: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match open.last_mut() {
        Some(parent) => parent.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(Error::Parse(format!(
                "second root element <{}>",
                element.name
            )));
        }
    }
    Ok(())
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|err| Error::Write(err.to_string()))
}
