//! Doc-comment XML model.
//!
//! Documentation comments embed a small XML subset (`<summary>`,
//! `<param name="…">`, `<see cref="…"/>`, text runs, CDATA). The translator
//! re-walks this structure to rebuild the target doc comment, so the model
//! is parsed rather than treated as flat text.
//!
//! The grammar is tiny and fixed, so the parser is a short recursive
//! descent over the comment body; malformed content is reported as an error
//! the caller degrades from (the surrounding translator falls back to raw
//! text), never a panic.

use std::fmt;

/// An attribute on a doc-XML element.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DocXmlAttribute {
    pub name: String,
    pub value: String,
}

impl DocXmlAttribute {
    /// Whether this is a code-reference attribute (`cref`), whose value may
    /// contain generic notation needing target-language rewriting.
    #[inline]
    pub fn is_cref(&self) -> bool {
        self.name == "cref"
    }

    /// Whether this is a plain name reference (`name`, `paramref`-style).
    #[inline]
    pub fn is_name(&self) -> bool {
        self.name == "name"
    }
}

/// An element with attributes and children.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DocXmlElement {
    pub name: String,
    pub attributes: Vec<DocXmlAttribute>,
    pub children: Vec<DocXmlNode>,
    pub self_closing: bool,
}

/// One node of doc-comment XML content.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DocXmlNode {
    Element(DocXmlElement),
    Text(String),
    CData(String),
}

impl DocXmlNode {
    /// Text runs are the only node kind that can carry the exterior marker
    /// implicitly; everything else needs bridging when adjacent.
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, DocXmlNode::Text(_))
    }
}

/// Doc-XML parse failure.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DocXmlError {
    /// Input ended inside an element, attribute, or CDATA section.
    UnexpectedEnd,
    /// Structurally malformed content at a byte position within the body.
    Malformed { position: usize, reason: &'static str },
}

impl fmt::Display for DocXmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocXmlError::UnexpectedEnd => write!(f, "doc comment XML ended unexpectedly"),
            DocXmlError::Malformed { position, reason } => {
                write!(f, "malformed doc comment XML at byte {position}: {reason}")
            }
        }
    }
}

impl std::error::Error for DocXmlError {}

/// Parse the body of a documentation comment (exterior markers already
/// stripped) into doc-XML nodes.
pub fn parse_doc_comment(body: &str) -> Result<Vec<DocXmlNode>, DocXmlError> {
    let mut parser = Parser {
        bytes: body.as_bytes(),
        pos: 0,
    };
    let nodes = parser.parse_nodes(None)?;
    Ok(nodes)
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.bytes[self.pos..].starts_with(prefix.as_bytes())
    }

    fn malformed(&self, reason: &'static str) -> DocXmlError {
        DocXmlError::Malformed {
            position: self.pos,
            reason,
        }
    }

    fn text_until(&mut self, stop: u8) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == stop {
                break;
            }
            self.pos += 1;
        }
        // Byte-boundary slicing is safe: we only stop on ASCII bytes.
        std::str::from_utf8(&self.bytes[start..self.pos]).unwrap_or("")
    }

    /// Parse sibling nodes until end of input or the matching close tag of
    /// `enclosing`.
    fn parse_nodes(&mut self, enclosing: Option<&str>) -> Result<Vec<DocXmlNode>, DocXmlError> {
        let mut nodes = Vec::new();
        loop {
            if self.pos >= self.bytes.len() {
                if enclosing.is_some() {
                    return Err(DocXmlError::UnexpectedEnd);
                }
                return Ok(nodes);
            }
            if self.starts_with("</") {
                let Some(name) = enclosing else {
                    return Err(self.malformed("close tag without open tag"));
                };
                self.expect_close_tag(name)?;
                return Ok(nodes);
            }
            if self.starts_with("<![CDATA[") {
                nodes.push(self.parse_cdata()?);
            } else if self.peek() == Some(b'<') {
                nodes.push(DocXmlNode::Element(self.parse_element()?));
            } else {
                let text = self.text_until(b'<');
                if !text.is_empty() {
                    nodes.push(DocXmlNode::Text(text.to_owned()));
                }
            }
        }
    }

    fn parse_cdata(&mut self) -> Result<DocXmlNode, DocXmlError> {
        self.pos += "<![CDATA[".len();
        let start = self.pos;
        while self.pos < self.bytes.len() {
            if self.starts_with("]]>") {
                let content = std::str::from_utf8(&self.bytes[start..self.pos]).unwrap_or("");
                self.pos += "]]>".len();
                return Ok(DocXmlNode::CData(content.to_owned()));
            }
            self.pos += 1;
        }
        Err(DocXmlError::UnexpectedEnd)
    }

    fn parse_element(&mut self) -> Result<DocXmlElement, DocXmlError> {
        self.pos += 1; // '<'
        let name = self.parse_name()?;
        let mut attributes = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(DocXmlError::UnexpectedEnd),
                Some(b'/') => {
                    self.pos += 1;
                    if self.peek() != Some(b'>') {
                        return Err(self.malformed("expected '>' after '/'"));
                    }
                    self.pos += 1;
                    return Ok(DocXmlElement {
                        name,
                        attributes,
                        children: Vec::new(),
                        self_closing: true,
                    });
                }
                Some(b'>') => {
                    self.pos += 1;
                    let children = self.parse_nodes(Some(&name))?;
                    return Ok(DocXmlElement {
                        name,
                        attributes,
                        children,
                        self_closing: false,
                    });
                }
                Some(_) => attributes.push(self.parse_attribute()?),
            }
        }
    }

    fn expect_close_tag(&mut self, name: &str) -> Result<(), DocXmlError> {
        self.pos += 2; // "</"
        let close_name = self.parse_name()?;
        if close_name != name {
            return Err(self.malformed("mismatched close tag"));
        }
        self.skip_whitespace();
        if self.peek() != Some(b'>') {
            return Err(self.malformed("expected '>' in close tag"));
        }
        self.pos += 1;
        Ok(())
    }

    fn parse_name(&mut self) -> Result<String, DocXmlError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b':' || b == b'.' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(self.malformed("expected a name"));
        }
        Ok(std::str::from_utf8(&self.bytes[start..self.pos])
            .unwrap_or("")
            .to_owned())
    }

    fn parse_attribute(&mut self) -> Result<DocXmlAttribute, DocXmlError> {
        let name = self.parse_name()?;
        self.skip_whitespace();
        if self.peek() != Some(b'=') {
            return Err(self.malformed("expected '=' in attribute"));
        }
        self.pos += 1;
        self.skip_whitespace();
        let quote = match self.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            Some(_) => return Err(self.malformed("expected quoted attribute value")),
            None => return Err(DocXmlError::UnexpectedEnd),
        };
        self.pos += 1;
        let value = self.text_until(quote).to_owned();
        if self.peek() != Some(quote) {
            return Err(DocXmlError::UnexpectedEnd);
        }
        self.pos += 1;
        Ok(DocXmlAttribute { name, value })
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }
}
