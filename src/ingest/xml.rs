// src/ingest/xml.rs
//! Minimal owned element tree built on `quick_xml`'s pull reader.
//!
//! Lookups compare *local names* only (the part after any `prefix:`), so
//! `<rss:item>`, `<item>`, and `<atom:link>` vs `<link>` all resolve without
//! caring which namespace a producer bound to which prefix.

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::FeedError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Qualified name as written in the document (may carry a prefix).
    pub name: String,
    /// Attributes as (qualified key, unescaped value).
    pub attrs: Vec<(String, String)>,
    /// Text and CDATA before the first child.
    pub text: String,
    /// Text and CDATA after this element's end tag, up to the next sibling.
    pub tail: String,
    pub children: Vec<Element>,
}

/// Strip any namespace prefix (`content:encoded` → `encoded`,
/// `{http://www.w3.org/2005/Atom}feed` → `feed`).
pub fn local_name(name: &str) -> &str {
    let name = name.rsplit('}').next().unwrap_or(name);
    name.rsplit(':').next().unwrap_or(name)
}

impl Element {
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
    }

    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| local_name(k) == local)
            .map(|(_, v)| v.as_str())
    }

    /// Trimmed direct text, ignoring anything inside child elements.
    pub fn text(&self) -> String {
        let mut out = self.text.clone();
        for c in &self.children {
            out.push_str(&c.tail);
        }
        out.trim().to_string()
    }

    /// Trimmed text of this element and all descendants, in document order.
    pub fn deep_text(&self) -> String {
        fn walk(el: &Element, out: &mut String) {
            out.push_str(&el.text);
            for c in &el.children {
                walk(c, out);
                out.push_str(&c.tail);
            }
        }
        let mut out = String::new();
        walk(self, &mut out);
        out.trim().to_string()
    }

    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.is(local))
    }

    pub fn child(&self, local: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is(local))
    }

    /// Trimmed text of the first direct child with non-empty text.
    pub fn child_text(&self, local: &str) -> Option<String> {
        self.children_named(local)
            .map(Element::text)
            .find(|t| !t.is_empty())
    }

    /// First descendant (pre-order, excluding `self`) with the given local name.
    pub fn find(&self, local: &str) -> Option<&Element> {
        for c in &self.children {
            if c.is(local) {
                return Some(c);
            }
            if let Some(hit) = c.find(local) {
                return Some(hit);
            }
        }
        None
    }

    /// All descendants (pre-order, excluding `self`) with the given local name.
    pub fn find_all<'a>(&'a self, local: &str) -> Vec<&'a Element> {
        fn walk<'a>(el: &'a Element, local: &str, out: &mut Vec<&'a Element>) {
            for c in &el.children {
                if c.is(local) {
                    out.push(c);
                }
                walk(c, local, out);
            }
        }
        let mut out = Vec::new();
        walk(self, local, &mut out);
        out
    }
}

/// Bytes in the document's declared encoding (UTF-8 when undeclared).
fn decode(decoder: Decoder, bytes: &[u8]) -> String {
    match decoder.decode(bytes) {
        Ok(s) => s.into_owned(),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn open(e: &BytesStart<'_>, decoder: Decoder) -> Result<Element, FeedError> {
    let name = decode(decoder, e.name().as_ref());
    let mut attrs = Vec::new();
    for a in e.attributes() {
        let a = a.map_err(|err| FeedError::MalformedDocument(err.to_string()))?;
        let key = decode(decoder, a.key.as_ref());
        let value = match a.decode_and_unescape_value(decoder) {
            Ok(v) => v.into_owned(),
            Err(_) => html_escape::decode_html_entities(&decode(decoder, &a.value)).into_owned(),
        };
        attrs.push((key, value));
    }
    Ok(Element {
        name,
        attrs,
        ..Default::default()
    })
}

fn attach(
    el: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> Result<(), FeedError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(el);
        return Ok(());
    }
    if root.is_some() {
        return Err(FeedError::MalformedDocument(
            "multiple root elements".to_string(),
        ));
    }
    *root = Some(el);
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> Result<(), FeedError> {
    match stack.last_mut() {
        Some(top) => {
            match top.children.last_mut() {
                Some(prev) => prev.tail.push_str(text),
                None => top.text.push_str(text),
            }
            Ok(())
        }
        None if text
            .trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
            .is_empty() =>
        {
            Ok(())
        }
        None => Err(FeedError::MalformedDocument(
            "text outside of root element".to_string(),
        )),
    }
}

/// Parse raw bytes into an element tree.
///
/// Text, names and attribute values are decoded with the encoding named in
/// the XML declaration. Non-predefined entities (`&nbsp;` and friends, common
/// in hand-rolled feeds) do not fail the parse; such text is decoded as HTML
/// instead.
pub fn parse_document(bytes: &[u8]) -> Result<Element, FeedError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let decoder = reader.decoder();
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => stack.push(open(&e, decoder)?),
            Event::Empty(e) => {
                let el = open(&e, decoder)?;
                attach(el, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let el = stack.pop().ok_or_else(|| {
                    FeedError::MalformedDocument("unexpected closing tag".to_string())
                })?;
                attach(el, &mut stack, &mut root)?;
            }
            Event::Text(t) => {
                let text = match t.unescape() {
                    Ok(s) => s.into_owned(),
                    Err(_) => html_escape::decode_html_entities(&decode(decoder, &t)).into_owned(),
                };
                push_text(&mut stack, &text)?;
            }
            Event::CData(c) => {
                let text = decode(decoder, &c);
                push_text(&mut stack, &text)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(unclosed) = stack.last() {
        return Err(FeedError::MalformedDocument(format!(
            "unclosed element <{}>",
            unclosed.name
        )));
    }
    root.ok_or_else(|| FeedError::MalformedDocument("no root element".to_string()))
}
