use xmlparser::{ElementEnd, StrSpan, Token, Tokenizer};

use crate::document::Document;
use crate::domesque::{Domesque, Node};
use crate::entity::parse_entities;
use crate::error::Error;
use crate::id::{NameId, NamespaceId};
use crate::value::{Attributes, Comment, Prefixes, ProcessingInstruction, Tag, Text, Value};

/// Options that control how markup is turned into a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseOptions {
    /// Drop text nodes that contain only whitespace, unless
    /// `xml:space="preserve"` is in effect. Defaults to `true`.
    pub remove_blank_text: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            remove_blank_text: true,
        }
    }
}

struct PendingTag<'a> {
    prefix: &'a str,
    local: &'a str,
    prefixes: Prefixes,
    attributes: Vec<(&'a str, &'a str, String)>,
    space: Option<bool>,
}

struct DocumentBuilder<'a, 'd> {
    dom: &'d mut Domesque,
    options: &'d ParseOptions,
    document: Node,
    current: Node,
    pending: Option<PendingTag<'a>>,
    open: Vec<(&'a str, &'a str)>,
    preserve_space: Vec<bool>,
    text: String,
}

impl<'a, 'd> DocumentBuilder<'a, 'd> {
    fn new(dom: &'d mut Domesque, options: &'d ParseOptions, document: Node) -> Self {
        DocumentBuilder {
            dom,
            options,
            document,
            current: document,
            pending: None,
            open: Vec::new(),
            preserve_space: vec![false],
            text: String::new(),
        }
    }

    fn append(&mut self, value: Value) -> Node {
        let node = self.dom.new_node(value);
        self.current.get().append(node.get(), self.dom.arena_mut());
        node
    }

    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        if self.current == self.document {
            return;
        }
        let preserve = self.preserve_space.last().copied().unwrap_or(false);
        if self.options.remove_blank_text
            && !preserve
            && text.chars().all(|c| c.is_ascii_whitespace())
        {
            return;
        }
        self.append(Value::Text(Text::new(text)));
    }

    fn element_start(&mut self, prefix: &'a str, local: &'a str) {
        self.flush_text();
        self.pending = Some(PendingTag {
            prefix,
            local,
            prefixes: Prefixes::new(),
            attributes: Vec::new(),
            space: None,
        });
    }

    fn attribute(&mut self, prefix: &'a str, local: &'a str, value: &'a str) -> Result<(), Error> {
        let value = parse_entities(value)?.into_owned();
        let Some(pending) = self.pending.as_mut() else {
            return Ok(());
        };
        if prefix == "xmlns" {
            let prefix_id = self.dom.add_prefix(local);
            let namespace_id = self.dom.add_namespace(&value);
            pending.prefixes.insert(prefix_id, namespace_id);
        } else if prefix.is_empty() && local == "xmlns" {
            let namespace_id = self.dom.add_namespace(&value);
            pending.prefixes.insert(self.dom.empty_prefix_id, namespace_id);
        } else {
            if prefix == "xml" && local == "space" {
                pending.space = Some(value == "preserve");
            }
            pending.attributes.push((prefix, local, value));
        }
        Ok(())
    }

    fn resolve_prefix(&self, prefixes: &Prefixes, prefix: &str) -> Result<NamespaceId, Error> {
        if prefix == "xml" {
            return Ok(self.dom.xml_namespace_id);
        }
        let Some(prefix_id) = self.dom.prefix(prefix) else {
            return Err(Error::UnknownPrefix(prefix.to_string()));
        };
        let namespace_id = prefixes.get(&prefix_id).copied().or_else(|| {
            self.dom
                .tag(self.current)
                .and_then(|_| self.dom.namespace_for_prefix(self.current, prefix_id))
        });
        match namespace_id {
            Some(namespace_id) if namespace_id != self.dom.no_namespace_id => Ok(namespace_id),
            _ if prefix.is_empty() => Ok(self.dom.no_namespace_id),
            _ => Err(Error::UnknownPrefix(prefix.to_string())),
        }
    }

    fn open_tag(&mut self, empty: bool) -> Result<(), Error> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        if self.current == self.document
            && self.dom.children(self.document).any(|n| self.dom.is_tag(n))
        {
            return Err(Error::InvalidOperation(
                "document has more than one root element".into(),
            ));
        }
        let namespace_id = self.resolve_prefix(&pending.prefixes, pending.prefix)?;
        let name_id = self.dom.add_name_ns(pending.local, namespace_id);
        let mut attributes = Attributes::new();
        for (prefix, local, value) in pending.attributes {
            let name_id: NameId = if prefix.is_empty() {
                self.dom.add_name(local)
            } else {
                let namespace_id = self.resolve_prefix(&pending.prefixes, prefix)?;
                self.dom.add_name_ns(local, namespace_id)
            };
            if attributes.get(&name_id).is_some() {
                return Err(Error::DuplicateAttribute(self.dom.clark_name(name_id)));
            }
            attributes.insert(name_id, value);
        }
        let mut tag = Tag::new(name_id);
        tag.prefixes = pending.prefixes;
        tag.attributes = attributes;
        let node = self.append(Value::Tag(tag));
        if !empty {
            let inherited = self.preserve_space.last().copied().unwrap_or(false);
            self.preserve_space.push(pending.space.unwrap_or(inherited));
            self.open.push((pending.prefix, pending.local));
            self.current = node;
        }
        Ok(())
    }

    fn close_tag(&mut self, prefix: &'a str, local: &'a str) -> Result<(), Error> {
        self.flush_text();
        let Some((open_prefix, open_local)) = self.open.pop() else {
            return Err(Error::InvalidCloseTag(String::new(), qname(prefix, local)));
        };
        if open_prefix != prefix || open_local != local {
            return Err(Error::InvalidCloseTag(
                qname(open_prefix, open_local),
                qname(prefix, local),
            ));
        }
        self.preserve_space.pop();
        self.current = self.dom.raw_parent(self.current).unwrap_or(self.document);
        Ok(())
    }

    fn leaf(&mut self, value: Value) {
        self.flush_text();
        self.append(value);
    }

    fn finish(mut self) -> Result<(), Error> {
        self.flush_text();
        if let Some((prefix, local)) = self.open.pop() {
            return Err(Error::UnclosedTag(qname(prefix, local)));
        }
        if !self.dom.children(self.document).any(|n| self.dom.is_tag(n)) {
            return Err(Error::NoElement);
        }
        Ok(())
    }
}

fn qname(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

fn span_str(span: Option<StrSpan>) -> Option<String> {
    span.map(|s| s.as_str().to_string()).filter(|s| !s.is_empty())
}

/// ## Parsing
impl Domesque {
    pub(crate) fn parse_into_document(
        &mut self,
        xml: &str,
        options: &ParseOptions,
        source_url: Option<String>,
    ) -> Result<Document, Error> {
        let document = self.new_document_node(source_url);
        match self.build(xml, options, document) {
            Ok(()) => Ok(Document::new(document)),
            Err(err) => {
                document.get().remove_subtree(self.arena_mut());
                Err(err)
            }
        }
    }

    fn build(&mut self, xml: &str, options: &ParseOptions, document: Node) -> Result<(), Error> {
        let mut builder = DocumentBuilder::new(self, options, document);
        for token in Tokenizer::from(xml) {
            match token? {
                Token::ElementStart { prefix, local, .. } => {
                    builder.element_start(prefix.as_str(), local.as_str());
                }
                Token::Attribute {
                    prefix,
                    local,
                    value,
                    ..
                } => {
                    builder.attribute(prefix.as_str(), local.as_str(), value.as_str())?;
                }
                Token::ElementEnd { end, .. } => match end {
                    ElementEnd::Open => builder.open_tag(false)?,
                    ElementEnd::Empty => builder.open_tag(true)?,
                    ElementEnd::Close(prefix, local) => {
                        builder.close_tag(prefix.as_str(), local.as_str())?
                    }
                },
                Token::Text { text } => {
                    let text = parse_entities(text.as_str())?;
                    builder.text.push_str(&text);
                }
                Token::Cdata { text, .. } => {
                    builder.text.push_str(text.as_str());
                }
                Token::Comment { text, .. } => {
                    builder.leaf(Value::Comment(Comment::new(text.as_str().to_string())));
                }
                Token::ProcessingInstruction {
                    target, content, ..
                } => {
                    builder.leaf(Value::ProcessingInstruction(ProcessingInstruction::new(
                        target.as_str().to_string(),
                        span_str(content),
                    )));
                }
                Token::EntityDeclaration { .. } => return Err(Error::UnsupportedDtd),
                Token::Declaration { .. }
                | Token::DtdStart { .. }
                | Token::EmptyDtd { .. }
                | Token::DtdEnd { .. } => {}
            }
        }
        builder.finish()
    }
}
