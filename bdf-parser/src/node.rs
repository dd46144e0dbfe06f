//! A small element tree built from quick-xml events.
//!
//! BDF headers are short, so they are read into a tree first and then
//! walked in document order. Element and attribute names are stored by
//! their local part, which drops prefixes such as `xlink:` and `xsi:`.

use crate::error::{ParserError, Result};
use bdf_core::{Literal, ProjectPath, ProjectPathError, from_literals};
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use std::str::FromStr;

/// One XML element.
#[derive(Debug, Clone, Default)]
pub(crate) struct Node {
    pub name: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<Node>,
}

/// Parses a document and returns its root element.
pub(crate) fn parse_document(xml: &str) -> Result<Node> {
    // Whitespace is kept so that text around entity references survives.
    // `Node::text` trims.
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => stack.push(Node::from_start(e)?),
            Ok(Event::Empty(ref e)) => {
                let node = Node::from_start(e)?;
                close(&mut stack, &mut root, node)?;
            }
            Ok(Event::End(_)) => {
                if let Some(node) = stack.pop() {
                    close(&mut stack, &mut root, node)?;
                }
            }
            Ok(Event::Text(ref t)) => {
                if let Some(node) = stack.last_mut() {
                    let raw = std::str::from_utf8(t)?;
                    node.text.push_str(&unescape(raw)?);
                }
            }
            Ok(Event::GeneralRef(ref r)) => {
                if let Some(node) = stack.last_mut() {
                    let name = std::str::from_utf8(r)?;
                    node.text.push_str(&unescape(&format!("&{name};"))?);
                }
            }
            Ok(Event::CData(ref t)) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(std::str::from_utf8(t)?);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParserError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(ParserError::invalid_structure(format!(
            "element '{}' is not closed",
            open.name
        )));
    }
    root.ok_or_else(|| ParserError::invalid_structure("no root element found"))
}

fn close(stack: &mut [Node], root: &mut Option<Node>, node: Node) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => {
            return Err(ParserError::invalid_structure(format!(
                "more than one root element ('{}')",
                node.name
            )));
        }
    }
    Ok(())
}

impl Node {
    fn from_start(e: &BytesStart<'_>) -> Result<Self> {
        let name = std::str::from_utf8(e.local_name().as_ref())?.to_string();
        let mut attrs = Vec::new();
        for attr in e.attributes().flatten() {
            let key = std::str::from_utf8(attr.key.local_name().as_ref())?.to_string();
            let raw = std::str::from_utf8(&attr.value)?;
            attrs.push((key, unescape(raw)?.into_owned()));
        }
        Ok(Self {
            name,
            attrs,
            text: String::new(),
            children: Vec::new(),
        })
    }

    /// Fails unless this element has the given name.
    pub fn expect_name(&self, expected: &str) -> Result<()> {
        if self.name == expected {
            Ok(())
        } else {
            Err(ParserError::MissingElement {
                expected: expected.to_string(),
                found: Some(self.name.clone()),
                context: "document".to_string(),
            })
        }
    }

    /// Value of an attribute, matched by local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Value of an attribute that must be present.
    pub fn required_attr(&self, name: &str) -> Result<&str> {
        self.attr(name)
            .ok_or_else(|| ParserError::missing_attr(&self.name, name))
    }

    /// Text content, trimmed.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Parses the text content as a number.
    pub fn number<T: FromStr>(&self) -> Result<T> {
        let text = self.text();
        text.parse()
            .map_err(|_| ParserError::invalid_value(&self.name, text, "a number"))
    }

    /// Parses an attribute as a number.
    pub fn number_attr<T: FromStr>(&self, name: &str) -> Result<T> {
        let value = self.required_attr(name)?;
        value.parse().map_err(|_| {
            ParserError::invalid_value(format!("{}@{name}", self.name), value, "a number")
        })
    }

    /// Parses an optional boolean attribute.
    pub fn bool_attr(&self, name: &str) -> Result<Option<bool>> {
        match self.attr(name) {
            None => Ok(None),
            Some("true" | "1") => Ok(Some(true)),
            Some("false" | "0") => Ok(Some(false)),
            Some(value) => Err(ParserError::invalid_value(
                format!("{}@{name}", self.name),
                value,
                "'true' or 'false'",
            )),
        }
    }

    /// Parses the text content as a literal.
    pub fn literal<T: Literal>(&self) -> Result<T> {
        let text = self.text();
        T::from_literal(text).ok_or_else(|| ParserError::unknown_literal(text, &self.name))
    }

    /// Parses an attribute as a literal.
    pub fn literal_attr<T: Literal>(&self, name: &str) -> Result<T> {
        let value = self.required_attr(name)?;
        T::from_literal(value).ok_or_else(|| ParserError::unknown_literal(value, &self.name))
    }

    /// Parses an attribute as a space separated list of literals.
    pub fn literals_attr<T: Literal>(&self, name: &str) -> Result<Vec<T>> {
        let value = self.required_attr(name)?;
        from_literals(value).map_err(|token| ParserError::unknown_literal(token, &self.name))
    }

    /// Parses the `projectPath` attribute with the given arity.
    pub fn project_path(&self, arity: usize) -> Result<(ProjectPath, &str)> {
        let raw = self.required_attr("projectPath")?;
        let path = ProjectPath::parse(raw, arity).map_err(|err| match err {
            ProjectPathError::ComponentOverflow { component } => {
                ParserError::ProjectPathOverflow {
                    raw: raw.to_string(),
                    component,
                }
            }
            ProjectPathError::Malformed | ProjectPathError::WrongArity { .. } => {
                ParserError::BadProjectPath {
                    raw: raw.to_string(),
                    expected_arity: arity,
                }
            }
        })?;
        Ok((path, raw))
    }

    /// Cursor over the children, in document order.
    pub fn children(&self) -> Children<'_> {
        Children {
            nodes: &self.children,
            pos: 0,
            parent: &self.name,
        }
    }
}

/// Walks the children of an element, enforcing their order.
pub(crate) struct Children<'n> {
    nodes: &'n [Node],
    pos: usize,
    parent: &'n str,
}

impl<'n> Children<'n> {
    fn peek(&self) -> Option<&'n Node> {
        self.nodes.get(self.pos)
    }

    /// Returns `true` if the next child is named `name`.
    pub fn peek_is(&self, name: &str) -> bool {
        self.peek().is_some_and(|node| node.name == name)
    }

    /// Consumes the next child if it has the given name.
    pub fn optional(&mut self, name: &str) -> Option<&'n Node> {
        let node = self.peek().filter(|node| node.name == name)?;
        self.pos += 1;
        Some(node)
    }

    /// Consumes the next child, which must have the given name.
    pub fn expect(&mut self, name: &str) -> Result<&'n Node> {
        self.optional(name).ok_or_else(|| self.missing(name))
    }

    /// Consumes the next child, which must have one of the given names.
    pub fn expect_one_of(&mut self, names: &[&str]) -> Result<&'n Node> {
        match self.peek() {
            Some(node) if names.contains(&node.name.as_str()) => {
                self.pos += 1;
                Ok(node)
            }
            _ => Err(self.missing(&names.join("' or '"))),
        }
    }

    fn missing(&self, expected: &str) -> ParserError {
        ParserError::MissingElement {
            expected: expected.to_string(),
            found: self.peek().map(|node| node.name.clone()),
            context: self.parent.to_string(),
        }
    }

    /// Fails if any child is left.
    pub fn finish(self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(node) => Err(ParserError::UnexpectedElement {
                element: node.name.clone(),
                context: self.parent.to_string(),
            }),
        }
    }
}
